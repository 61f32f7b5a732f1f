//! Horizontal and vertical beam counters.

/// Raster geometry in pixel clocks and lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterTiming {
    /// Pixel clocks per line, including blanking.
    pub h_total: u16,
    /// Visible pixels at the start of each line.
    pub h_active: u16,
    /// Lines per frame, including blanking.
    pub v_total: u16,
    /// Visible lines at the start of each frame.
    pub v_active: u16,
}

impl RasterTiming {
    /// 512x342 compact monochrome display.
    pub const COMPACT: Self = Self {
        h_total: 704,
        h_active: 512,
        v_total: 370,
        v_active: 342,
    };

    /// Pixel clocks per frame.
    #[must_use]
    pub const fn clocks_per_frame(&self) -> u32 {
        self.h_total as u32 * self.v_total as u32
    }
}

impl Default for RasterTiming {
    fn default() -> Self {
        Self::COMPACT
    }
}

/// Sequence counter: position within the current 8-pixel window.
#[must_use]
pub const fn seq(hcount: u16) -> u8 {
    (hcount & 0x07) as u8
}

/// Beam position counters.
#[derive(Debug, Clone)]
pub struct Raster {
    timing: RasterTiming,
    hcount: u16,
    vcount: u16,
    /// Set when the counters wrap to the top of the frame, auto-clears on read.
    frame_complete: bool,
}

impl Raster {
    /// Start at the first pixel of the first line.
    ///
    /// # Panics
    ///
    /// Panics if the active region does not fit inside the totals, or if the
    /// line length is not a whole number of 8-pixel windows.
    #[must_use]
    pub fn new(timing: RasterTiming) -> Self {
        assert!(
            timing.h_active <= timing.h_total && timing.v_active <= timing.v_total,
            "active region larger than raster"
        );
        assert!(
            timing.h_total % 8 == 0,
            "line length must be whole 8-pixel windows"
        );
        Self {
            timing,
            hcount: 0,
            vcount: 0,
            frame_complete: false,
        }
    }

    /// Advance one pixel clock.
    pub fn tick(&mut self) {
        self.hcount += 1;
        if self.hcount >= self.timing.h_total {
            self.hcount = 0;
            self.vcount += 1;
            if self.vcount >= self.timing.v_total {
                self.vcount = 0;
                self.frame_complete = true;
            }
        }
    }

    #[must_use]
    pub fn timing(&self) -> RasterTiming {
        self.timing
    }

    #[must_use]
    pub fn hcount(&self) -> u16 {
        self.hcount
    }

    #[must_use]
    pub fn vcount(&self) -> u16 {
        self.vcount
    }

    #[must_use]
    pub fn seq(&self) -> u8 {
        seq(self.hcount)
    }

    /// Horizontal active (not in horizontal blanking).
    #[must_use]
    pub fn h_active(&self) -> bool {
        self.hcount < self.timing.h_active
    }

    /// Vertical active (not in vertical blanking).
    #[must_use]
    pub fn v_active(&self) -> bool {
        self.vcount < self.timing.v_active
    }

    /// Has the frame completed? Auto-clears on read.
    pub fn take_frame_complete(&mut self) -> bool {
        let result = self.frame_complete;
        self.frame_complete = false;
        result
    }

    /// Return the beam to the first pixel of the first line.
    pub fn reset(&mut self) {
        self.hcount = 0;
        self.vcount = 0;
        self.frame_complete = false;
    }

    /// Position the beam directly (for testing).
    #[doc(hidden)]
    pub fn set_position(&mut self, hcount: u16, vcount: u16) {
        self.hcount = hcount % self.timing.h_total;
        self.vcount = vcount % self.timing.v_total;
    }
}

impl Default for Raster {
    fn default() -> Self {
        Self::new(RasterTiming::COMPACT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_length_in_pixel_clocks() {
        let mut raster = Raster::default();
        let total = RasterTiming::COMPACT.clocks_per_frame();
        assert_eq!(total, 260_480); // 704 x 370

        for _ in 0..total - 1 {
            raster.tick();
            assert!(!raster.frame_complete, "frame_complete set too early");
        }
        raster.tick();
        assert!(raster.take_frame_complete());
        assert!(!raster.take_frame_complete(), "should auto-clear");
        assert_eq!((raster.hcount(), raster.vcount()), (0, 0));
    }

    #[test]
    fn reset_returns_beam_to_origin() {
        let mut raster = Raster::default();
        raster.set_position(703, 369);
        raster.tick();
        raster.set_position(123, 45);
        raster.reset();
        assert_eq!((raster.hcount(), raster.vcount()), (0, 0));
        assert!(!raster.take_frame_complete(), "pending wrap discarded");
        assert!(raster.h_active() && raster.v_active());
    }

    #[test]
    fn line_wrap_advances_vcount() {
        let mut raster = Raster::default();
        raster.set_position(703, 10);
        raster.tick();
        assert_eq!(raster.hcount(), 0);
        assert_eq!(raster.vcount(), 11);
    }

    #[test]
    fn seq_repeats_every_eight_pixels() {
        for h in 0..704u16 {
            assert_eq!(seq(h), (h % 8) as u8);
        }
    }

    #[test]
    fn active_region_edges() {
        let mut raster = Raster::default();
        raster.set_position(511, 341);
        assert!(raster.h_active() && raster.v_active());

        raster.set_position(512, 341);
        assert!(!raster.h_active());

        raster.set_position(0, 342);
        assert!(raster.h_active());
        assert!(!raster.v_active());
    }
}
