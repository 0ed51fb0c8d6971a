//! Shared "signal destroyed" flag.

use std::cell::Cell;
use std::rc::Rc;

/// Flag shared by a signal, its connections and its in-flight emissions.
///
/// The flag is heap-allocated independently of the signal, so it stays
/// readable after the signal is gone for as long as anyone holds a clone.
#[derive(Debug, Clone, Default)]
pub(crate) struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the signal destroyed.
    ///
    /// Returns true only for the call that flipped the flag.
    pub fn mark_destroyed(&self) -> bool {
        !self.0.replace(true)
    }

    pub fn is_destroyed(&self) -> bool {
        self.0.get()
    }

    /// Number of live holders of this flag.
    #[cfg(test)]
    pub fn holders(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}
