//! Clocked wrapper around the scheduler state machine.

use emu_core::{Observable, Synchronizer, Value};
use tracing::{debug, trace};
use vidmem_port::PortRequest;

use crate::scheduler::{
    HostAccess, PortDrive, SchedulerEvent, SchedulerState, StepInputs, outputs, step,
};
use crate::signals::HostBusSignals;
use crate::window::{FramebufferWindow, MemorySize};

/// Event counters since reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Framebuffer write cycles claimed.
    pub claimed: u64,
    /// Claimed cycles the host abandoned before a data strobe.
    pub aborted: u64,
    /// Descriptors captured (one per host write that reached a data strobe).
    pub captured: u64,
    /// Bytes written to video RAM.
    pub commits: u64,
    /// Falling edges spent waiting for a safe slot.
    pub stall_cycles: u64,
}

/// CPU bus snoop and write scheduler.
#[derive(Debug, Clone)]
pub struct WriteScheduler {
    window: FramebufferWindow,
    sync: Synchronizer<HostBusSignals>,
    state: SchedulerState,
    access: HostAccess,
    stats: SchedulerStats,
}

impl WriteScheduler {
    #[must_use]
    pub fn new(size: MemorySize) -> Self {
        Self {
            window: FramebufferWindow::new(size),
            sync: Synchronizer::new(HostBusSignals::idle()),
            state: SchedulerState::Idle,
            access: HostAccess::default(),
            stats: SchedulerStats::default(),
        }
    }

    /// Pixel clock falling edge.
    ///
    /// `raw` is the host bus as it is right now, in the host's clock domain.
    /// `seq` is the sequence counter for the current cycle.
    pub fn falling_edge(&mut self, raw: HostBusSignals, seq: u8) {
        let bus = self.sync.clock(raw);
        let transition = step(
            self.state,
            self.access,
            &StepInputs {
                bus,
                seq,
                window: &self.window,
            },
        );

        if transition.state != self.state {
            trace!(
                from = self.state.name(),
                to = transition.state.name(),
                seq,
                "scheduler transition"
            );
        }

        match transition.event {
            Some(SchedulerEvent::Claimed) => self.stats.claimed += 1,
            Some(SchedulerEvent::Aborted) => {
                self.stats.aborted += 1;
                debug!(address = bus.address, "host cycle aborted before data strobe");
            }
            Some(SchedulerEvent::Captured) => {
                self.stats.captured += 1;
                trace!(
                    offset = transition.access.offset,
                    low = transition.access.low_pending,
                    high = transition.access.high_pending,
                    "host write captured"
                );
            }
            Some(SchedulerEvent::Committed) => self.stats.commits += 1,
            Some(SchedulerEvent::Deferred) => {
                trace!(seq, "no time before next video read, commit deferred");
                self.stats.stall_cycles += 1;
            }
            Some(SchedulerEvent::Released) | None => {}
        }

        self.state = transition.state;
        self.access = transition.access;
    }

    /// What the scheduler drives onto the memory port this cycle.
    #[must_use]
    pub fn drive(&self) -> PortDrive {
        outputs(self.state, &self.access)
    }

    /// Port request for this cycle, if write-enable is asserted.
    #[must_use]
    pub fn request(&self) -> Option<PortRequest> {
        self.drive().request()
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    #[must_use]
    pub fn access(&self) -> HostAccess {
        self.access
    }

    #[must_use]
    pub fn window(&self) -> &FramebufferWindow {
        &self.window
    }

    /// A captured write is waiting for, or using, the port.
    ///
    /// Inspection only: the host is never told.
    #[must_use]
    pub fn busy(&self) -> bool {
        matches!(
            self.state,
            SchedulerState::WaitForSlot | SchedulerState::CommitLow | SchedulerState::CommitHigh
        )
    }

    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Return to Idle with nothing pending. The memory-size code is kept.
    pub fn reset(&mut self) {
        self.sync.reset(HostBusSignals::idle());
        self.state = SchedulerState::Idle;
        self.access = HostAccess::default();
        self.stats = SchedulerStats::default();
    }
}

impl Observable for WriteScheduler {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "state" => Some(self.state.name().into()),
            "busy" => Some(self.busy().into()),
            "offset" => Some(self.access.offset.into()),
            "low_pending" => Some(self.access.low_pending.into()),
            "high_pending" => Some(self.access.high_pending.into()),
            "memory_size" => Some(self.window.memory_size().code().into()),
            "claimed" => Some(self.stats.claimed.into()),
            "aborted" => Some(self.stats.aborted.into()),
            "captured" => Some(self.stats.captured.into()),
            "commits" => Some(self.stats.commits.into()),
            "stall_cycles" => Some(self.stats.stall_cycles.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "state",
            "busy",
            "offset",
            "low_pending",
            "high_pending",
            "memory_size",
            "claimed",
            "aborted",
            "captured",
            "commits",
            "stall_cycles",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u32 = 0x01_8000; // 128K window

    fn scheduler() -> WriteScheduler {
        WriteScheduler::new(MemorySize::ALL[0])
    }

    fn word_write(address: u32, data: u16) -> HostBusSignals {
        HostBusSignals {
            address,
            data,
            address_strobe: true,
            upper_strobe: true,
            lower_strobe: true,
            write: true,
            bus_clock: false,
        }
    }

    #[test]
    fn inputs_pass_through_the_synchronizer() {
        let mut s = scheduler();
        let bus = word_write(BASE, 0x1234);

        s.falling_edge(bus, 1);
        assert_eq!(s.state(), SchedulerState::Idle, "first stage only");
        s.falling_edge(bus, 2);
        assert_eq!(s.state(), SchedulerState::AddressPending);
        s.falling_edge(bus, 3);
        assert_eq!(s.state(), SchedulerState::WaitForSlot);
        assert!(s.busy());
    }

    #[test]
    fn full_write_then_release() {
        let mut s = scheduler();
        let bus = word_write(BASE + 0x10, 0xBEEF);
        let mut writes = Vec::new();

        let mut seq = 0u8;
        for _ in 0..6 {
            if let Some(req) = s.request() {
                writes.push(req);
            }
            s.falling_edge(bus, seq);
            seq += 1;
        }
        assert_eq!(
            writes,
            vec![
                PortRequest::Write {
                    address: 0x0010,
                    data: 0xEF
                },
                PortRequest::Write {
                    address: 0x0011,
                    data: 0xBE
                },
            ]
        );
        assert_eq!(s.state(), SchedulerState::WaitForHostRelease);

        // Strobes still held: stays put; released (after sync delay): Idle.
        s.falling_edge(bus, 6);
        assert_eq!(s.state(), SchedulerState::WaitForHostRelease);
        s.falling_edge(HostBusSignals::idle(), 7);
        s.falling_edge(HostBusSignals::idle(), 0);
        assert_eq!(s.state(), SchedulerState::Idle);
        assert_eq!(s.stats().commits, 2);
        assert_eq!(s.stats().captured, 1);
    }

    #[test]
    fn abort_is_counted_and_leaves_nothing_pending() {
        let mut s = scheduler();
        let as_only = HostBusSignals {
            address: BASE,
            address_strobe: true,
            write: true,
            ..HostBusSignals::idle()
        };
        s.falling_edge(as_only, 1);
        s.falling_edge(as_only, 2);
        assert_eq!(s.state(), SchedulerState::AddressPending);
        s.falling_edge(HostBusSignals::idle(), 3);
        s.falling_edge(HostBusSignals::idle(), 4);
        assert_eq!(s.state(), SchedulerState::Idle);
        assert_eq!(s.stats().aborted, 1);
        assert_eq!(s.request(), None);
    }

    #[test]
    fn new_access_ignored_until_idle() {
        let mut s = scheduler();
        let first = word_write(BASE, 0x1111);
        let second = word_write(BASE + 2, 0x2222);

        // Capture the first write at seq 6 so it has to wait.
        s.falling_edge(first, 4);
        s.falling_edge(first, 5);
        s.falling_edge(first, 6);
        assert_eq!(s.state(), SchedulerState::WaitForSlot);

        // Host misbehaves and starts another access immediately.
        s.falling_edge(second, 7);
        s.falling_edge(second, 0);
        assert_eq!(s.access().offset, 0, "in-flight descriptor is not overwritten");
        assert_eq!(s.access().low, 0x11);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut s = scheduler();
        let bus = word_write(BASE, 0x1234);
        for seq in 0..3 {
            s.falling_edge(bus, seq);
        }
        s.reset();
        assert_eq!(s.state(), SchedulerState::Idle);
        assert_eq!(s.stats(), SchedulerStats::default());
    }

    #[test]
    fn observable_paths() {
        let s = scheduler();
        for path in s.query_paths() {
            assert!(s.query(path).is_some(), "{path}");
        }
        assert_eq!(s.query("state"), Some(Value::Str("Idle")));
    }
}
