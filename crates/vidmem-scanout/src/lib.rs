//! Video timing and read generation for a 1-bit framebuffer.
//!
//! The raster counters run at the pixel clock. Every 8-pixel window is one
//! memory slot cycle: the low three bits of the horizontal counter form the
//! sequence counter, and cycle 0 of each window belongs to the video read.
//! The remaining cycles are left to the host write scheduler.
//!
//! # Timing (default raster)
//!
//! - 704 pixel clocks per line, 512 active
//! - 370 lines per frame, 342 active
//! - 15.6672 MHz pixel clock, 60.15 Hz frame rate
//!
//! # Read address
//!
//! `vcount[8:0]` supplies address bits 14-6 and `hcount[8:3]` bits 5-0, so
//! each line is 64 bytes and one fetch covers eight pixels.

mod raster;
mod scanout;

pub use raster::{Raster, RasterTiming, seq};
pub use scanout::{BLANK_LEVEL, Scanout};
