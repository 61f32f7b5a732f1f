//! Two-stage synchronizer for signals crossing clock domains.

/// A double register clocked by the receiving domain.
///
/// The first stage samples the asynchronous input and may be caught
/// mid-transition; only the second stage is read by combinational logic.
/// The output therefore lags the raw input by one receiving-domain edge.
#[derive(Debug, Clone, Copy)]
pub struct Synchronizer<T> {
    first: T,
    second: T,
}

impl<T: Copy> Synchronizer<T> {
    #[must_use]
    pub const fn new(initial: T) -> Self {
        Self {
            first: initial,
            second: initial,
        }
    }

    /// Clock both stages and return the settled output.
    pub fn clock(&mut self, input: T) -> T {
        self.second = self.first;
        self.first = input;
        self.second
    }

    /// Force both stages to `value`.
    pub fn reset(&mut self, value: T) {
        self.first = value;
        self.second = value;
    }
}
