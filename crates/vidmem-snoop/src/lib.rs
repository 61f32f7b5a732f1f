//! Host bus snoop and framebuffer write scheduler.
//!
//! Watches a 68000-style host bus (address, 16-bit data, AS, UDS, LDS,
//! R/W), claims writes that fall inside the framebuffer window, and commits
//! the captured bytes to video RAM in the cycles the video read generator
//! leaves free.
//!
//! # Timing
//!
//! The scheduler is clocked on the falling edge of the pixel clock, half a
//! cycle away from the edge that advances the beam counters. It decides on
//! one falling edge and drives the port for the whole of the next cycle, so
//! a decision made with sequence value `s` writes during cycle `s + 1`.
//!
//! - Both lanes pending: start only while `seq < 5`, writes land in cycles
//!   `s + 1` and `s + 2`, at most 6.
//! - One lane pending: start only while `seq < 6`, the write lands in cycle
//!   `s + 1`, at most 6.
//!
//! Cycle 0 of the next window is never touched. A late write waits and
//! catches the next window's free cycles; writes are delayed, never dropped.
//!
//! # Clock domain crossing
//!
//! The host bus is asynchronous to the pixel clock. Every signal passes
//! through a [`emu_core::Synchronizer`] before the state machine looks at
//! it, so the scheduler sees a coherent snapshot one falling edge late.
//!
//! # Host contract
//!
//! There is no busy or wait signal back to the host. A host must let one
//! framebuffer write drain (strobes released, scheduler back in Idle) before
//! starting the next; a framebuffer access started earlier is ignored.

mod scheduler;
mod signals;
mod snoop;
mod window;

pub use scheduler::{
    DOUBLE_COMMIT_DEADLINE, HostAccess, PortDrive, SINGLE_COMMIT_DEADLINE, SchedulerEvent,
    SchedulerState, StepInputs, Transition, outputs, step,
};
pub use signals::HostBusSignals;
pub use snoop::{SchedulerStats, WriteScheduler};
pub use window::{
    FramebufferWindow, HOST_ADDRESS_BITS, InvalidMemorySize, MemorySize, WINDOW_BITS, WINDOW_SIZE,
};
