//! Video pixel shift register.
//!
//! Converts one fetched byte into eight serial pixels, most-significant bit
//! first.
//!
//! # Standalone IC
//!
//! No dependencies and no arbitration logic. The owner decides when a byte
//! arrives and which pixel clock is the load cycle.
//!
//! # Pipeline
//!
//! Two stages: an input latch written when memory data arrives, and an
//! output shift stage that emits pixels. The shift stage copies the latch on
//! the designated load cycle and shifts on every other cycle. A byte fetched
//! during cycle 0 of a window is therefore emitted during cycles 1-7 and
//! cycle 0 of the following window, while the next fetch lands in the latch
//! without disturbing the byte still being shifted out.

/// Two-stage shift register.
#[derive(Debug, Clone, Default)]
pub struct Shifter {
    /// Input latch, written by [`Shifter::reload`].
    latch: u8,
    /// Output stage; bit 7 is the current pixel.
    shift: u8,
}

impl Shifter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a freshly fetched byte into the input latch.
    pub fn reload(&mut self, byte: u8) {
        self.latch = byte;
    }

    /// Advance one pixel clock (rising edge).
    ///
    /// On a load cycle the output stage takes the latch; otherwise it shifts
    /// left, filling with zero.
    pub fn tick(&mut self, load: bool) {
        if load {
            self.shift = self.latch;
        } else {
            self.shift <<= 1;
        }
    }

    /// Current pixel: most-significant remaining bit of the output stage.
    #[must_use]
    pub fn output(&self) -> bool {
        self.shift & 0x80 != 0
    }

    /// Input latch contents.
    #[must_use]
    pub fn latch(&self) -> u8 {
        self.latch
    }

    /// Output stage contents.
    #[must_use]
    pub fn shift_register(&self) -> u8 {
        self.shift
    }

    pub fn reset(&mut self) {
        self.latch = 0;
        self.shift = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shift a loaded byte out and collect the eight pixels.
    fn drain(shifter: &mut Shifter) -> Vec<bool> {
        let mut bits = vec![shifter.output()];
        for _ in 0..7 {
            shifter.tick(false);
            bits.push(shifter.output());
        }
        bits
    }

    #[test]
    fn emits_msb_first() {
        let mut s = Shifter::new();
        s.reload(0b1010_0001);
        s.tick(true);
        assert_eq!(
            drain(&mut s),
            vec![true, false, true, false, false, false, false, true]
        );
    }

    #[test]
    fn reload_alone_does_not_change_output() {
        let mut s = Shifter::new();
        s.reload(0xFF);
        assert!(!s.output(), "latch is not visible until a load cycle");
        s.tick(true);
        assert!(s.output());
    }

    #[test]
    fn reload_mid_shift_does_not_glitch_current_byte() {
        let mut s = Shifter::new();
        s.reload(0xF0);
        s.tick(true);
        let mut bits = vec![s.output()];
        for cycle in 1..8 {
            if cycle == 7 {
                // Next byte arrives during the last pixel of this one.
                s.reload(0x0F);
            }
            s.tick(false);
            bits.push(s.output());
        }
        assert_eq!(
            bits,
            vec![true, true, true, true, false, false, false, false]
        );

        s.tick(true);
        assert_eq!(
            drain(&mut s),
            vec![false, false, false, false, true, true, true, true]
        );
    }

    #[test]
    fn shift_fills_with_zero() {
        let mut s = Shifter::new();
        s.reload(0x01);
        s.tick(true);
        for _ in 0..7 {
            s.tick(false);
        }
        assert!(s.output());
        s.tick(false);
        assert!(!s.output());
        assert_eq!(s.shift_register(), 0);
    }

    #[test]
    fn reset_clears_both_stages() {
        let mut s = Shifter::new();
        s.reload(0xAA);
        s.tick(true);
        s.reset();
        assert_eq!(s.latch(), 0);
        assert!(!s.output());
    }
}
