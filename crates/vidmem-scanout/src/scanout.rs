//! Video read generator.
//!
//! Owns the shared memory port during cycle 0 of every 8-pixel window while
//! video is active, and feeds fetched bytes to the pixel shifter. Address and
//! enable are pure functions of the beam counters.

use emu_core::{Observable, Value};
use vidmem_shifter::Shifter;

use crate::raster::Raster;

/// Serial output level outside the active region.
pub const BLANK_LEVEL: bool = false;

/// Sequence value on which the shifter's output stage takes the latch.
const LOAD_SEQ: u8 = 1;

/// Video read generator and its pixel shifter.
#[derive(Debug, Clone, Default)]
pub struct Scanout {
    shifter: Shifter,
    /// Combined active flag for the current cycle.
    active: bool,
    /// Beam position for the current cycle.
    position: (u16, u16),
    /// Active flag of the pixel now leaving the shifter (one cycle behind).
    emitting: bool,
    /// Beam position of the pixel now leaving the shifter.
    emitted_position: (u16, u16),
    /// Bytes fetched since reset.
    fetches: u64,
}

impl Scanout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Combined active video: horizontal AND vertical.
    #[must_use]
    pub const fn combined_active(h_active: bool, v_active: bool) -> bool {
        h_active && v_active
    }

    /// Memory address for the window containing `hcount` on line `vcount`.
    #[must_use]
    pub const fn read_address(hcount: u16, vcount: u16) -> u16 {
        ((vcount & 0x01FF) << 6) | ((hcount >> 3) & 0x3F)
    }

    /// Read-enable: a single-cycle pulse at cycle 0 of each active window.
    #[must_use]
    pub const fn read_enable(active: bool, seq: u8) -> bool {
        active && seq == 0
    }

    /// Does the shifter's output stage load from its latch this cycle?
    #[must_use]
    pub const fn shifter_load(seq: u8) -> bool {
        seq == LOAD_SEQ
    }

    /// Pixel clock rising edge, after the raster counters have advanced.
    pub fn rising_edge(&mut self, raster: &Raster) {
        self.emitting = self.active;
        self.emitted_position = self.position;

        self.active = Self::combined_active(raster.h_active(), raster.v_active());
        self.position = (raster.hcount(), raster.vcount());
        self.shifter.tick(Self::shifter_load(raster.seq()));
    }

    /// Address this generator claims the port for during the current cycle,
    /// or `None` when read-enable is negated.
    #[must_use]
    pub fn request(&self, raster: &Raster) -> Option<u16> {
        let active = Self::combined_active(raster.h_active(), raster.v_active());
        Self::read_enable(active, raster.seq())
            .then(|| Self::read_address(raster.hcount(), raster.vcount()))
    }

    /// Memory data for this cycle's read.
    pub fn accept_fetch(&mut self, byte: u8) {
        self.shifter.reload(byte);
        self.fetches += 1;
    }

    /// Current serial pixel, forced to [`BLANK_LEVEL`] outside active video.
    ///
    /// The blank gate is registered alongside the shifter so it applies to
    /// the pixel actually being emitted, which trails the beam by one clock.
    #[must_use]
    pub fn serial_out(&self) -> bool {
        if self.emitting {
            self.shifter.output()
        } else {
            BLANK_LEVEL
        }
    }

    /// Raster position of the pixel now on the serial output, if visible.
    #[must_use]
    pub fn emitted_pixel(&self) -> Option<(u16, u16)> {
        self.emitting.then_some(self.emitted_position)
    }

    /// Combined active flag for the current cycle.
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn shifter(&self) -> &Shifter {
        &self.shifter
    }

    #[must_use]
    pub fn fetches(&self) -> u64 {
        self.fetches
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Observable for Scanout {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "active" => Some(self.active.into()),
            "serial_out" => Some(self.serial_out().into()),
            "latch" => Some(self.shifter.latch().into()),
            "shift" => Some(self.shifter.shift_register().into()),
            "fetches" => Some(self.fetches.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["active", "serial_out", "latch", "shift", "fetches"]
    }
}
