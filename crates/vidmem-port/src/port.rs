//! Per-cycle port arbitration.

use std::fmt;

use emu_core::{Observable, Value};

use crate::vram::{ADDRESS_MASK, Vram};

/// What a client asks the port to do this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRequest {
    Read { address: u16 },
    Write { address: u16, data: u8 },
}

/// What the port actually did this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortAccess {
    Idle,
    Read { address: u16, data: u8 },
    Write { address: u16, data: u8 },
}

impl PortAccess {
    /// Level of the active-low read enable during this cycle.
    #[must_use]
    pub fn read_enable_n(&self) -> bool {
        !matches!(self, PortAccess::Read { .. })
    }

    /// Level of the active-low write enable during this cycle.
    #[must_use]
    pub fn write_enable_n(&self) -> bool {
        !matches!(self, PortAccess::Write { .. })
    }
}

/// Both clients drove the port in the same cycle.
///
/// The video request was honoured; the other one was not performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConflict {
    pub performed: PortAccess,
    pub dropped: PortRequest,
}

impl fmt::Display for PortConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shared port conflict: performed {:?}, dropped {:?}",
            self.performed, self.dropped
        )
    }
}

impl std::error::Error for PortConflict {}

/// Access counters, one increment per pixel cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortStats {
    pub reads: u64,
    pub writes: u64,
    pub idle: u64,
    pub conflicts: u64,
}

/// The shared memory port and the RAM behind it.
#[derive(Debug, Default)]
pub struct SharedPort {
    vram: Vram,
    stats: PortStats,
}

impl SharedPort {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take this cycle's slot. The grant is consumed by exactly one access,
    /// so a single cycle cannot read and write.
    pub fn grant(&mut self) -> CycleGrant<'_> {
        CycleGrant { port: self }
    }

    /// Resolve one pixel cycle given what each client is driving.
    ///
    /// `video` is the read generator's request, `cpu` the write scheduler's.
    pub fn cycle(
        &mut self,
        video: Option<PortRequest>,
        cpu: Option<PortRequest>,
    ) -> Result<PortAccess, PortConflict> {
        match (video, cpu) {
            (Some(video), Some(cpu)) => {
                self.stats.conflicts += 1;
                let performed = self.grant().perform(video);
                Err(PortConflict {
                    performed,
                    dropped: cpu,
                })
            }
            (Some(request), None) | (None, Some(request)) => Ok(self.grant().perform(request)),
            (None, None) => {
                self.grant().idle();
                Ok(PortAccess::Idle)
            }
        }
    }

    #[must_use]
    pub fn vram(&self) -> &Vram {
        &self.vram
    }

    /// Direct RAM access for loading test patterns.
    pub fn vram_mut(&mut self) -> &mut Vram {
        &mut self.vram
    }

    #[must_use]
    pub fn stats(&self) -> PortStats {
        self.stats
    }
}

/// Exclusive right to use the port for one cycle.
pub struct CycleGrant<'a> {
    port: &'a mut SharedPort,
}

impl CycleGrant<'_> {
    pub fn read(self, address: u16) -> u8 {
        self.port.stats.reads += 1;
        self.port.vram.peek(address & ADDRESS_MASK)
    }

    pub fn write(self, address: u16, data: u8) {
        self.port.stats.writes += 1;
        self.port.vram.poke(address & ADDRESS_MASK, data);
    }

    pub fn idle(self) {
        self.port.stats.idle += 1;
    }

    /// Carry out `request` and report what happened on the bus.
    pub fn perform(self, request: PortRequest) -> PortAccess {
        match request {
            PortRequest::Read { address } => {
                let address = address & ADDRESS_MASK;
                let data = self.read(address);
                PortAccess::Read { address, data }
            }
            PortRequest::Write { address, data } => {
                let address = address & ADDRESS_MASK;
                self.write(address, data);
                PortAccess::Write { address, data }
            }
        }
    }
}

impl Observable for SharedPort {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("vram.") {
            let addr = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix('$')) {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            return addr.map(|a| Value::U8(self.vram.peek(a)));
        }
        match path {
            "reads" => Some(self.stats.reads.into()),
            "writes" => Some(self.stats.writes.into()),
            "idle" => Some(self.stats.idle.into()),
            "conflicts" => Some(self.stats.conflicts.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["reads", "writes", "idle", "conflicts", "vram.<address>"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_read_is_performed() {
        let mut port = SharedPort::new();
        port.vram_mut().poke(0x0040, 0xA5);

        let access = port.cycle(Some(PortRequest::Read { address: 0x0040 }), None);
        assert_eq!(
            access,
            Ok(PortAccess::Read {
                address: 0x0040,
                data: 0xA5
            })
        );
        assert_eq!(port.stats().reads, 1);
    }

    #[test]
    fn single_write_is_performed() {
        let mut port = SharedPort::new();
        let access = port.cycle(
            None,
            Some(PortRequest::Write {
                address: 0x1235,
                data: 0x12,
            }),
        );
        assert!(matches!(access, Ok(PortAccess::Write { .. })));
        assert_eq!(port.vram().peek(0x1235), 0x12);
        assert_eq!(port.stats().writes, 1);
    }

    #[test]
    fn empty_cycle_is_idle() {
        let mut port = SharedPort::new();
        assert_eq!(port.cycle(None, None), Ok(PortAccess::Idle));
        assert_eq!(port.stats().idle, 1);
    }

    #[test]
    fn conflict_keeps_the_video_read_and_drops_the_write() {
        let mut port = SharedPort::new();
        port.vram_mut().poke(0x0000, 0x77);

        let result = port.cycle(
            Some(PortRequest::Read { address: 0x0000 }),
            Some(PortRequest::Write {
                address: 0x0000,
                data: 0x11,
            }),
        );
        let conflict = result.expect_err("overlapping requests must be reported");
        assert_eq!(
            conflict.performed,
            PortAccess::Read {
                address: 0x0000,
                data: 0x77
            }
        );
        assert_eq!(port.vram().peek(0x0000), 0x77, "write must not land");
        assert_eq!(port.stats().conflicts, 1);
        assert_eq!(port.stats().writes, 0);
    }

    #[test]
    fn enables_are_active_low() {
        let read = PortAccess::Read {
            address: 0,
            data: 0,
        };
        let write = PortAccess::Write {
            address: 0,
            data: 0,
        };
        assert!(!read.read_enable_n() && read.write_enable_n());
        assert!(write.read_enable_n() && !write.write_enable_n());
        assert!(PortAccess::Idle.read_enable_n() && PortAccess::Idle.write_enable_n());
    }

    #[test]
    fn grant_reads_through() {
        let mut port = SharedPort::new();
        port.grant().write(0x0100, 0x3C);
        assert_eq!(port.grant().read(0x0100), 0x3C);
    }

    #[test]
    fn observable_vram_and_counters() {
        let mut port = SharedPort::new();
        port.vram_mut().poke(0x0010, 0x42);
        assert_eq!(port.query("vram.0x0010"), Some(Value::U8(0x42)));
        assert_eq!(port.query("vram.16"), Some(Value::U8(0x42)));
        assert_eq!(port.query("conflicts"), Some(Value::U64(0)));
    }
}
