//! Emission failure type.

use thiserror::Error;

use super::slots::SlotId;

/// A callback failed, aborting the rest of its emission pass.
///
/// Wraps the callback's own error together with the slot that produced it.
/// Bookkeeping (depth counter, compaction) has already completed by the time
/// the caller sees this value.
#[derive(Debug, Error)]
#[error("{slot} failed during emission")]
pub struct EmitError<E> {
    slot: SlotId,
    #[source]
    source: E,
}

impl<E> EmitError<E> {
    pub(crate) fn new(slot: SlotId, source: E) -> Self {
        Self { slot, source }
    }

    /// The slot whose callback failed.
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Borrow the callback's error.
    pub fn get_ref(&self) -> &E {
        &self.source
    }

    /// Unwrap into the callback's error.
    pub fn into_inner(self) -> E {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::slots::SlotTable;
    use std::convert::Infallible;
    use std::error::Error as _;
    use std::rc::Rc;

    #[derive(Debug, Error)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn test_display_names_slot() {
        let slot = SlotTable::<(), Infallible>::new().push(Rc::new(|_| Ok(())));
        let err = EmitError::new(slot, DiskFull);
        assert_eq!(err.to_string(), "slot #0 failed during emission");
        assert_eq!(err.slot(), slot);
    }

    #[test]
    fn test_source_is_callback_error() {
        let slot = SlotTable::<(), Infallible>::new().push(Rc::new(|_| Ok(())));
        let err = EmitError::new(slot, DiskFull);
        let source = err.source().map(|e| e.to_string());
        assert_eq!(source.as_deref(), Some("disk full"));
        assert_eq!(err.into_inner().to_string(), "disk full");
    }
}
