//! Core traits and types for cycle-accurate emulation.
//!
//! Every component advances on clock edges. A machine may own more than one
//! independent clock domain; signals crossing between them go through a
//! [`Synchronizer`] before any combinational use.

mod clock;
mod observable;
mod sync;
mod tickable;
mod ticks;

pub use clock::{ClockDomain, Edge};
pub use observable::{Observable, Value};
pub use sync::Synchronizer;
pub use tickable::Tickable;
pub use ticks::Ticks;
