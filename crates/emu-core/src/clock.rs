//! Free-running clock domains.
//!
//! A domain is a square wave of fixed frequency. Time is kept in
//! femtoseconds so that unrelated frequencies (a 15.6672 MHz pixel clock and
//! an 8 MHz host bus clock, say) can be interleaved on one timeline without
//! drifting against each other over a long run.

use crate::Ticks;

/// Femtoseconds per second.
const FS_PER_SECOND: u64 = 1_000_000_000_000_000;

/// Which transition a clock domain just made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// One independent clock domain.
#[derive(Debug, Clone)]
pub struct ClockDomain {
    frequency_hz: u64,
    half_period_fs: u64,
    /// Absolute time of the next transition.
    next_edge_fs: u64,
    /// Current level (true = high).
    level: bool,
    /// Completed full periods (counted on rising edges).
    cycles: Ticks,
}

impl ClockDomain {
    /// Create a domain. `initial_level` decides whether the first edge is
    /// falling (`true`) or rising (`false`). `phase_fs` delays the first
    /// edge, which lets two domains start out of step.
    ///
    /// # Panics
    ///
    /// Panics if `frequency_hz` is zero.
    #[must_use]
    pub fn new(frequency_hz: u64, initial_level: bool, phase_fs: u64) -> Self {
        assert!(frequency_hz > 0, "clock frequency must be non-zero");
        let half_period_fs = (FS_PER_SECOND / frequency_hz / 2).max(1);
        Self {
            frequency_hz,
            half_period_fs,
            next_edge_fs: phase_fs.saturating_add(half_period_fs),
            level: initial_level,
            cycles: Ticks::ZERO,
        }
    }

    #[must_use]
    pub fn frequency_hz(&self) -> u64 {
        self.frequency_hz
    }

    /// Absolute time of the next edge in femtoseconds.
    #[must_use]
    pub fn next_edge_fs(&self) -> u64 {
        self.next_edge_fs
    }

    /// Number of rising edges seen so far.
    #[must_use]
    pub fn cycles(&self) -> Ticks {
        self.cycles
    }

    /// Make the next transition and schedule the one after it.
    pub fn advance(&mut self) -> Edge {
        self.level = !self.level;
        self.next_edge_fs = self.next_edge_fs.saturating_add(self.half_period_fs);
        if self.level {
            self.cycles += Ticks::new(1);
            Edge::Rising
        } else {
            Edge::Falling
        }
    }
}
