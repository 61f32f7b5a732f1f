//! Write scheduling state machine.
//!
//! [`step`] is the whole sequential behaviour: given the current state, the
//! in-flight access and this edge's (already synchronized) inputs it returns
//! the next state and access. [`outputs`] is the combinational side: what
//! the scheduler drives onto the memory port while in a given state.

use vidmem_port::PortRequest;

use crate::signals::HostBusSignals;
use crate::window::FramebufferWindow;

/// Latest sequence value at which a two-byte commit may start.
pub const DOUBLE_COMMIT_DEADLINE: u8 = 5;

/// Latest sequence value at which a one-byte commit may start.
pub const SINGLE_COMMIT_DEADLINE: u8 = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    #[default]
    Idle,
    /// Address strobe seen on a framebuffer write; waiting for data strobes.
    AddressPending,
    /// Bytes captured; waiting for a slot that finishes before cycle 0.
    WaitForSlot,
    /// Driving the low byte this cycle.
    CommitLow,
    /// Driving the high byte this cycle.
    CommitHigh,
    /// Descriptor drained; waiting for the host to release its strobes.
    WaitForHostRelease,
}

impl SchedulerState {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::AddressPending => "AddressPending",
            Self::WaitForSlot => "WaitForSlot",
            Self::CommitLow => "CommitLow",
            Self::CommitHigh => "CommitHigh",
            Self::WaitForHostRelease => "WaitForHostRelease",
        }
    }
}

/// The one in-flight host write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostAccess {
    /// 14-bit local word offset.
    pub offset: u16,
    pub low_pending: bool,
    pub high_pending: bool,
    /// D7-D0 as captured.
    pub low: u8,
    /// D15-D8 as captured.
    pub high: u8,
}

impl HostAccess {
    /// Memory address of the low byte (bit 0 clear).
    #[must_use]
    pub const fn base_address(&self) -> u16 {
        (self.offset & 0x3FFF) << 1
    }

    #[must_use]
    pub const fn any_pending(&self) -> bool {
        self.low_pending || self.high_pending
    }
}

/// Inputs sampled on one falling edge.
#[derive(Debug, Clone, Copy)]
pub struct StepInputs<'a> {
    /// Synchronized host bus.
    pub bus: HostBusSignals,
    /// Sequence counter for the current cycle.
    pub seq: u8,
    pub window: &'a FramebufferWindow,
}

/// Something worth counting or tracing happened on this edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// A framebuffer write cycle started.
    Claimed,
    /// The host dropped AS before any data strobe.
    Aborted,
    /// Byte lanes latched.
    Captured,
    /// Too close to the next video read; commit postponed.
    Deferred,
    /// One byte written.
    Committed,
    /// Host released its strobes; ready for the next access.
    Released,
}

/// Result of one [`step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: SchedulerState,
    pub access: HostAccess,
    pub event: Option<SchedulerEvent>,
}

impl Transition {
    const fn to(state: SchedulerState, access: HostAccess, event: Option<SchedulerEvent>) -> Self {
        Self {
            state,
            access,
            event,
        }
    }
}

/// Advance the state machine by one falling edge.
#[must_use]
pub fn step(state: SchedulerState, access: HostAccess, inputs: &StepInputs<'_>) -> Transition {
    use SchedulerState as S;

    let bus = &inputs.bus;
    match state {
        S::Idle => {
            if bus.address_strobe && bus.write && inputs.window.contains(bus.address) {
                Transition::to(
                    S::AddressPending,
                    HostAccess::default(),
                    Some(SchedulerEvent::Claimed),
                )
            } else {
                Transition::to(S::Idle, access, None)
            }
        }

        S::AddressPending => {
            if !bus.address_strobe {
                return Transition::to(S::Idle, HostAccess::default(), Some(SchedulerEvent::Aborted));
            }
            if !bus.data_strobe() {
                return Transition::to(S::AddressPending, access, None);
            }
            let Some(offset) = inputs.window.decode(bus.address) else {
                // Address moved out of the window under AS: nothing to commit.
                return Transition::to(S::Idle, HostAccess::default(), Some(SchedulerEvent::Aborted));
            };
            let captured = HostAccess {
                offset,
                low_pending: bus.lower_strobe,
                high_pending: bus.upper_strobe,
                low: if bus.lower_strobe { bus.lower_byte() } else { 0 },
                high: if bus.upper_strobe { bus.upper_byte() } else { 0 },
            };
            Transition::to(S::WaitForSlot, captured, Some(SchedulerEvent::Captured))
        }

        S::WaitForSlot => match (access.low_pending, access.high_pending) {
            (true, true) if inputs.seq < DOUBLE_COMMIT_DEADLINE => {
                Transition::to(S::CommitLow, access, None)
            }
            (true, false) if inputs.seq < SINGLE_COMMIT_DEADLINE => {
                Transition::to(S::CommitLow, access, None)
            }
            (false, true) if inputs.seq < SINGLE_COMMIT_DEADLINE => {
                Transition::to(S::CommitHigh, access, None)
            }
            (false, false) => Transition::to(S::WaitForHostRelease, access, None),
            _ => Transition::to(S::WaitForSlot, access, Some(SchedulerEvent::Deferred)),
        },

        S::CommitLow => {
            let access = HostAccess {
                low_pending: false,
                ..access
            };
            let next = if access.high_pending {
                S::CommitHigh
            } else {
                S::WaitForHostRelease
            };
            Transition::to(next, access, Some(SchedulerEvent::Committed))
        }

        S::CommitHigh => {
            let access = HostAccess {
                high_pending: false,
                ..access
            };
            Transition::to(S::WaitForHostRelease, access, Some(SchedulerEvent::Committed))
        }

        S::WaitForHostRelease => {
            if bus.data_strobe() {
                Transition::to(S::WaitForHostRelease, access, None)
            } else {
                Transition::to(S::Idle, access, Some(SchedulerEvent::Released))
            }
        }
    }
}

/// What the scheduler drives onto the memory-side bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortDrive {
    pub address: u16,
    pub data: u8,
    pub write_enable: bool,
}

impl PortDrive {
    /// The port request implied by this drive, if write-enable is asserted.
    #[must_use]
    pub fn request(&self) -> Option<PortRequest> {
        self.write_enable.then_some(PortRequest::Write {
            address: self.address,
            data: self.data,
        })
    }
}

/// Combinational outputs for `state`.
///
/// The address is always the latched offset; bit 0 is set only in
/// `CommitHigh`. Data is zero outside the two commit states.
#[must_use]
pub fn outputs(state: SchedulerState, access: &HostAccess) -> PortDrive {
    let address = access.base_address();
    match state {
        SchedulerState::CommitLow => PortDrive {
            address,
            data: access.low,
            write_enable: true,
        },
        SchedulerState::CommitHigh => PortDrive {
            address: address | 1,
            data: access.high,
            write_enable: true,
        },
        _ => PortDrive {
            address,
            data: 0,
            write_enable: false,
        },
    }
}
