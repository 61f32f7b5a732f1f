//! Cycle-accurate shared framebuffer controller.
//!
//! Two clock domains share one video RAM port. The pixel clock drives the
//! raster counters, the video read generator and the host write scheduler;
//! the host bus runs from its own, unrelated clock. The machine interleaves
//! both on a single femtosecond timeline and always advances whichever edge
//! is due next.
//!
//! Per pixel clock:
//! - rising edge: beam counters advance, the shifter loads or shifts, and
//!   the emitted pixel is written to the framebuffer
//! - falling edge: the port performs this cycle's access (video read at
//!   sequence 0, otherwise a scheduler commit or nothing), then the
//!   scheduler samples the host bus and decides the next cycle

pub mod capture;
mod config;
mod host;
pub mod script;
mod vidmem;

pub use config::{ConfigError, VidMemConfig};
pub use host::{HostCpu, HostOp, Lanes};
pub use script::{ScriptError, load_script, parse_script, test_pattern};
pub use vidmem::{FB_HEIGHT, FB_WIDTH, VidMem};
