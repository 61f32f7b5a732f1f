//! Trait for components advanced by a clock.

/// A component advanced one step at a time by its owner.
///
/// For a single-domain chip a step is one clock edge. A machine that owns
/// several domains treats a step as "the next edge of whichever domain is
/// due first".
pub trait Tickable {
    /// Advance by one step.
    fn tick(&mut self);
}
