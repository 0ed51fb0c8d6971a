//! RAII handle for a registered slot.

use std::fmt;
use std::rc::Weak;

use super::liveness::Liveness;
use super::slots::SlotId;

/// Slot storage a connection can detach itself from.
pub(crate) trait Detach {
    /// Remove `slot`, deferring the removal if an emission is in progress.
    fn detach(&self, slot: SlotId);
}

struct Binding {
    table: Weak<dyn Detach>,
    slot: SlotId,
    liveness: Liveness,
}

/// Handle to one registration on a [`Signal`](crate::Signal).
///
/// Dropping the connection disconnects its slot. Connections are move-only;
/// `std::mem::take` leaves an inert default behind, and assigning a new
/// connection over an old one disconnects the old one first.
///
/// A connection may outlive its signal. Once the signal is dropped or
/// closed, `disconnect` becomes a no-op.
#[must_use = "dropping a Connection disconnects its slot immediately"]
#[derive(Default)]
pub struct Connection {
    binding: Option<Binding>,
}

impl Connection {
    pub(crate) fn new(table: Weak<dyn Detach>, slot: SlotId, liveness: Liveness) -> Self {
        Self {
            binding: Some(Binding {
                table,
                slot,
                liveness,
            }),
        }
    }

    /// Detach the slot from its signal.
    ///
    /// Safe to call repeatedly, from inside the slot's own callback, and after
    /// the signal has been destroyed.
    pub fn disconnect(&mut self) {
        let Some(binding) = self.binding.take() else {
            return;
        };

        // The signal may be gone; the flag is all we may look at
        if binding.liveness.is_destroyed() {
            tracing::trace!(slot = %binding.slot, "Signal already destroyed, nothing to detach");
            return;
        }

        if let Some(table) = binding.table.upgrade() {
            table.detach(binding.slot);
        }
    }

    /// Whether the slot is still registered on a live signal.
    pub fn is_connected(&self) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|binding| !binding.liveness.is_destroyed())
    }

    /// Id of the bound slot, if still bound.
    pub fn slot_id(&self) -> Option<SlotId> {
        self.binding.as_ref().map(|binding| binding.slot)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("slot", &self.slot_id())
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::slots::SlotTable;
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::rc::Rc;

    /// Records detach requests instead of touching real slots.
    #[derive(Default)]
    struct FakeTable {
        detached: RefCell<Vec<SlotId>>,
    }

    impl Detach for FakeTable {
        fn detach(&self, slot: SlotId) {
            self.detached.borrow_mut().push(slot);
        }
    }

    fn some_slot() -> SlotId {
        SlotTable::<(), Infallible>::new().push(Rc::new(|_| Ok(())))
    }

    fn bind(table: &Rc<FakeTable>, liveness: &Liveness) -> Connection {
        let weak: Weak<FakeTable> = Rc::downgrade(table);
        Connection::new(weak, some_slot(), liveness.clone())
    }

    #[test]
    fn test_default_is_inert() {
        let mut conn = Connection::default();
        assert!(!conn.is_connected());
        assert_eq!(conn.slot_id(), None);
        conn.disconnect();
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let table = Rc::new(FakeTable::default());
        let liveness = Liveness::new();
        let mut conn = bind(&table, &liveness);
        assert!(conn.is_connected());

        conn.disconnect();
        conn.disconnect();
        drop(conn);

        assert_eq!(table.detached.borrow().len(), 1);
    }

    #[test]
    fn test_drop_disconnects() {
        let table = Rc::new(FakeTable::default());
        let liveness = Liveness::new();
        let conn = bind(&table, &liveness);
        let slot = conn.slot_id();

        drop(conn);

        assert_eq!(table.detached.borrow().first().copied(), slot);
    }

    #[test]
    fn test_destroyed_flag_skips_table() {
        let table = Rc::new(FakeTable::default());
        let liveness = Liveness::new();
        let mut conn = bind(&table, &liveness);

        liveness.mark_destroyed();
        assert!(!conn.is_connected());

        conn.disconnect();
        assert!(table.detached.borrow().is_empty());
        assert_eq!(conn.slot_id(), None);
    }

    #[test]
    fn test_take_leaves_source_inert() {
        let table = Rc::new(FakeTable::default());
        let liveness = Liveness::new();
        let mut source = bind(&table, &liveness);

        let moved = std::mem::take(&mut source);
        drop(source);
        assert!(table.detached.borrow().is_empty());
        assert!(moved.is_connected());

        drop(moved);
        assert_eq!(table.detached.borrow().len(), 1);
    }

    #[test]
    fn test_assignment_disconnects_previous() {
        let table = Rc::new(FakeTable::default());
        let liveness = Liveness::new();
        let mut conn = bind(&table, &liveness);
        let first = conn.slot_id();

        conn = bind(&table, &liveness);

        assert_eq!(table.detached.borrow().as_slice(), &[first.unwrap()]);
        assert!(conn.is_connected());
    }
}
