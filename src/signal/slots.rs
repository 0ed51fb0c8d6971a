//! Ordered slot storage with soft deletion.
//!
//! Entries are appended with strictly increasing ids and only ever removed,
//! so the table stays sorted by id and a slot's current position can be
//! found by binary search even after earlier slots were compacted away.

use std::fmt;
use std::rc::Rc;

/// Identifier of a registered slot, unique within one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(u64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot #{}", self.0)
    }
}

/// Shared callable stored in a slot.
pub(crate) type Callback<A, E> = Rc<dyn Fn(&A) -> Result<(), E>>;

/// What an emission finds at a given position.
pub(crate) enum Visit<A: ?Sized, E> {
    /// Past the current end of the table.
    End,
    /// Soft-deleted entry.
    Empty,
    /// Live slot, with its callback cloned out of the table.
    Live(SlotId, Callback<A, E>),
}

struct Entry<A: ?Sized, E> {
    id: SlotId,
    callback: Option<Callback<A, E>>,
}

/// Registration-ordered slot table.
pub(crate) struct SlotTable<A: ?Sized, E> {
    entries: Vec<Entry<A, E>>,
    next_id: u64,
}

impl<A: ?Sized, E> Default for SlotTable<A, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized, E> SlotTable<A, E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Append a callback at the tail and return its id.
    pub fn push(&mut self, callback: Callback<A, E>) -> SlotId {
        let id = SlotId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            callback: Some(callback),
        });
        id
    }

    /// Inspect the entry at `index` without holding on to the table.
    pub fn visit(&self, index: usize) -> Visit<A, E> {
        match self.entries.get(index) {
            None => Visit::End,
            Some(Entry { callback: None, .. }) => Visit::Empty,
            Some(Entry {
                id,
                callback: Some(callback),
            }) => Visit::Live(*id, Rc::clone(callback)),
        }
    }

    fn position(&self, id: SlotId) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |entry| entry.id).ok()
    }

    /// Clear a slot in place, keeping every other position stable.
    ///
    /// Returns the released callback so the caller can drop it after the
    /// table borrow ends.
    pub fn soft_delete(&mut self, id: SlotId) -> Option<Callback<A, E>> {
        let index = self.position(id)?;
        self.entries[index].callback.take()
    }

    /// Physically remove a slot.
    pub fn erase(&mut self, id: SlotId) -> Option<Callback<A, E>> {
        let index = self.position(id)?;
        self.entries.remove(index).callback
    }

    /// Drop every soft-deleted entry. Returns how many were removed.
    pub fn compact(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.callback.is_some());
        before - self.entries.len()
    }

    /// Remove all entries, handing them back to the caller.
    pub fn take_all(&mut self) -> Vec<Callback<A, E>> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .filter_map(|entry| entry.callback)
            .collect()
    }

    /// Number of live (not soft-deleted) slots.
    pub fn live(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.callback.is_some())
            .count()
    }

    /// Total entries, soft-deleted ones included.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Copy of the live slots, ids preserved.
    pub fn live_copy(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter_map(|entry| {
                    entry.callback.as_ref().map(|callback| Entry {
                        id: entry.id,
                        callback: Some(Rc::clone(callback)),
                    })
                })
                .collect(),
            next_id: self.next_id,
        }
    }
}
