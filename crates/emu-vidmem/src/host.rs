//! Host processor bus master.
//!
//! Produces 68000-style bus cycles from a queue of operations. Each clock
//! edge is one S-state:
//!
//! | S-state | Write                     | Read                    | Abort          |
//! |---------|---------------------------|-------------------------|----------------|
//! | S0      | bus released              | bus released            | bus released   |
//! | S1      | address out, R/W low      | address out, R/W high   | address, R/W low |
//! | S2      | AS                        | AS, UDS/LDS             | AS             |
//! | S3      | data out                  |                         |                |
//! | S4      | UDS/LDS                   |                         | AS negated     |
//! | S5-S6   | hold (+ 2 per wait state) | hold                    |                |
//! | S7      | AS, UDS, LDS negated      | AS, UDS, LDS negated    |                |
//!
//! Nothing answers the host: there is no DTACK and no busy line, so the
//! cycle length is fixed by the configured wait states.

use std::collections::VecDeque;

use emu_core::Edge;
use serde::{Deserialize, Serialize};
use vidmem_snoop::HostBusSignals;

/// Which byte lanes a write strobes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lanes {
    #[default]
    Both,
    /// UDS only: D15-D8.
    Upper,
    /// LDS only: D7-D0.
    Lower,
}

impl Lanes {
    const fn strobes(self) -> (bool, bool) {
        match self {
            Lanes::Both => (true, true),
            Lanes::Upper => (true, false),
            Lanes::Lower => (false, true),
        }
    }
}

/// One host bus operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostOp {
    Write {
        address: u32,
        value: u16,
        #[serde(default)]
        lanes: Lanes,
    },
    Read {
        address: u32,
    },
    /// Address strobe without data strobes (bus retry).
    Abort {
        address: u32,
    },
    /// Leave the bus released for a number of host clocks.
    Idle {
        clocks: u32,
    },
}

impl HostOp {
    #[must_use]
    pub const fn write_word(address: u32, value: u16) -> Self {
        Self::Write {
            address,
            value,
            lanes: Lanes::Both,
        }
    }

    /// Byte write. Even addresses use the upper lane, odd the lower; the
    /// byte is driven on both halves of the data bus.
    #[must_use]
    pub const fn write_byte(address: u32, value: u8) -> Self {
        let lanes = if address & 1 == 0 {
            Lanes::Upper
        } else {
            Lanes::Lower
        };
        Self::Write {
            address,
            value: ((value as u16) << 8) | value as u16,
            lanes,
        }
    }
}

/// S-state of the strobe phase in a write cycle.
const WRITE_STROBE_STATE: u32 = 4;
/// Final S-state of an unextended bus cycle.
const LAST_STATE: u32 = 7;
/// S-state at which an aborted cycle drops AS.
const ABORT_RELEASE_STATE: u32 = 4;

#[derive(Debug, Clone)]
pub struct HostCpu {
    program: VecDeque<HostOp>,
    current: Option<HostOp>,
    /// S-state index within the current operation.
    phase: u32,
    bus: HostBusSignals,
    wait_states: u8,
    completed: u64,
}

impl HostCpu {
    #[must_use]
    pub fn new(wait_states: u8) -> Self {
        Self {
            program: VecDeque::new(),
            current: None,
            phase: 0,
            bus: HostBusSignals::idle(),
            wait_states,
            completed: 0,
        }
    }

    pub fn push(&mut self, op: HostOp) {
        self.program.push_back(op);
    }

    pub fn extend(&mut self, ops: impl IntoIterator<Item = HostOp>) {
        self.program.extend(ops);
    }

    /// No operation in progress and none queued.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.program.is_empty()
    }

    /// Operations queued, including the one in progress.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.program.len() + usize::from(self.current.is_some())
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Bus levels as currently driven.
    #[must_use]
    pub fn signals(&self) -> HostBusSignals {
        self.bus
    }

    /// Drop the queue and any cycle in progress, releasing the bus.
    pub fn reset(&mut self) {
        self.program.clear();
        self.current = None;
        self.phase = 0;
        self.bus = HostBusSignals::idle();
        self.completed = 0;
    }

    /// Host clock edge: advance one S-state.
    pub fn edge(&mut self, edge: Edge) {
        self.bus.bus_clock = edge == Edge::Rising;

        if self.current.is_none() {
            self.current = self.program.pop_front();
            self.phase = 0;
        }
        let Some(op) = self.current else {
            return;
        };

        let done = self.drive(op);
        self.phase += 1;
        if done {
            self.current = None;
            self.completed += 1;
        }
    }

    /// Drive the bus for the current S-state of `op`. Returns true on the
    /// operation's last S-state.
    fn drive(&mut self, op: HostOp) -> bool {
        let last = LAST_STATE + 2 * u32::from(self.wait_states);
        let phase = self.phase;

        if phase == 0 {
            self.bus = HostBusSignals {
                bus_clock: self.bus.bus_clock,
                ..HostBusSignals::idle()
            };
        }

        match op {
            HostOp::Write {
                address,
                value,
                lanes,
            } => {
                match phase {
                    1 => {
                        self.bus.address = address;
                        self.bus.write = true;
                    }
                    2 => self.bus.address_strobe = true,
                    3 => self.bus.data = value,
                    WRITE_STROBE_STATE => {
                        let (upper, lower) = lanes.strobes();
                        self.bus.upper_strobe = upper;
                        self.bus.lower_strobe = lower;
                    }
                    _ => {}
                }
                if phase >= last {
                    self.release();
                    return true;
                }
                false
            }
            HostOp::Read { address } => {
                match phase {
                    1 => {
                        self.bus.address = address;
                        self.bus.write = false;
                    }
                    2 => {
                        self.bus.address_strobe = true;
                        self.bus.upper_strobe = true;
                        self.bus.lower_strobe = true;
                    }
                    _ => {}
                }
                if phase >= last {
                    self.release();
                    return true;
                }
                false
            }
            HostOp::Abort { address } => {
                match phase {
                    1 => {
                        self.bus.address = address;
                        self.bus.write = true;
                    }
                    2 => self.bus.address_strobe = true,
                    _ => {}
                }
                if phase >= ABORT_RELEASE_STATE {
                    self.release();
                    return true;
                }
                false
            }
            HostOp::Idle { clocks } => phase + 1 >= clocks.saturating_mul(2),
        }
    }

    fn release(&mut self) {
        self.bus.address_strobe = false;
        self.bus.upper_strobe = false;
        self.bus.lower_strobe = false;
    }
}
