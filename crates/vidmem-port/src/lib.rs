//! Shared video RAM port.
//!
//! One read/write port, one access per pixel clock. Two clients use it: the
//! video read generator and the host write scheduler. Their slots are
//! disjoint by construction (video owns cycle 0 of each 8-pixel window, the
//! scheduler only commits in cycles 1-6), so arbitration is time division,
//! not priority. [`SharedPort::cycle`] still checks every cycle and reports
//! an overlap as a [`PortConflict`], with the video read winning.
//!
//! # Memory-side bus
//!
//! 15-bit address, 8-bit data in/out, active-low read and write enables.
//! The enables are exposed as levels on [`PortAccess`] for inspection.

mod port;
mod vram;

pub use port::{CycleGrant, PortAccess, PortConflict, PortRequest, PortStats, SharedPort};
pub use vram::{ADDRESS_MASK, VRAM_SIZE, Vram};
