//! Ordered callback registry with reentrancy-safe emission.
//!
//! Provides:
//! - [`Signal`]: slot storage, registration and emission
//! - [`Connection`]: move-only handle that detaches its slot on drop
//! - [`EmitError`]: a callback failure surfaced from [`Signal::try_emit`]
//!
//! Removal during emission is deferred: the slot is cleared in place and
//! the table is compacted once the outermost emission returns.

mod connection;
mod error;
mod liveness;
mod slots;

pub use connection::Connection;
pub use error::EmitError;
pub use slots::SlotId;

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::fmt;
use std::rc::{Rc, Weak};

use connection::Detach;
use liveness::Liveness;
use slots::{SlotTable, Visit};

/// Shared state behind a signal; connections reach it through a `Weak`.
struct State<A: ?Sized, E> {
    slots: RefCell<SlotTable<A, E>>,
    depth: Cell<usize>,
    liveness: Liveness,
}

impl<A: ?Sized, E> State<A, E> {
    fn new(slots: SlotTable<A, E>) -> Self {
        Self {
            slots: RefCell::new(slots),
            depth: Cell::new(0),
            liveness: Liveness::new(),
        }
    }

    /// Finish one emission level; the outermost one settles the table.
    fn leave(&self) {
        let depth = self.depth.get() - 1;
        self.depth.set(depth);
        if depth != 0 {
            return;
        }

        if self.liveness.is_destroyed() {
            let released = self.slots.borrow_mut().take_all();
            tracing::debug!(released = released.len(), "Released slots of closed signal");
            drop(released);
        } else {
            let removed = self.slots.borrow_mut().compact();
            if removed > 0 {
                tracing::debug!(removed, "Compacted soft-deleted slots");
            }
        }
    }
}

impl<A: ?Sized, E> Detach for State<A, E> {
    fn detach(&self, slot: SlotId) {
        // Released callbacks are dropped only after the table borrow ends
        let released = if self.depth.get() > 0 {
            let released = self.slots.borrow_mut().soft_delete(slot);
            tracing::trace!(%slot, depth = self.depth.get(), "Slot soft-deleted during emission");
            released
        } else {
            let released = self.slots.borrow_mut().erase(slot);
            tracing::trace!(%slot, "Slot erased");
            released
        };
        drop(released);
    }
}

/// Depth guard for one emission pass.
///
/// Leaving runs on every exit path, including a panicking callback.
struct Emission<'a, A: ?Sized, E> {
    state: &'a State<A, E>,
}

impl<'a, A: ?Sized, E> Emission<'a, A, E> {
    fn enter(state: &'a State<A, E>) -> Self {
        state.depth.set(state.depth.get() + 1);
        tracing::trace!(depth = state.depth.get(), "Emission entered");
        Self { state }
    }
}

impl<A: ?Sized, E> Drop for Emission<'_, A, E> {
    fn drop(&mut self) {
        tracing::trace!(depth = self.state.depth.get(), "Emission left");
        self.state.leave();
    }
}

/// An ordered set of callbacks invoked together.
///
/// Callbacks receive `&A`; pass several values as a tuple. `E` is the error
/// a fallible callback may return, `Infallible` by default.
///
/// Every method takes `&self` so callbacks may connect, disconnect, emit or
/// close the same signal while it is emitting. Bookkeeping uses interior
/// mutability: emission looks read-only but is not thread-safe, and the
/// type is neither `Send` nor `Sync`.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let signal = signals::Signal::<i32>::new();
///
/// let log = Rc::clone(&seen);
/// let mut conn = signal.connect(move |x| log.borrow_mut().push(*x));
///
/// signal.emit(&5);
/// conn.disconnect();
/// signal.emit(&7);
///
/// assert_eq!(*seen.borrow(), vec![5]);
/// ```
pub struct Signal<A: ?Sized, E = Infallible> {
    state: Rc<State<A, E>>,
}

impl<A: ?Sized, E> Signal<A, E> {
    /// Create a signal with no slots.
    pub fn new() -> Self {
        Self::with_slots(SlotTable::new())
    }

    fn with_slots(slots: SlotTable<A, E>) -> Self {
        Self {
            state: Rc::new(State::new(slots)),
        }
    }

    /// Invoke every live slot in registration order.
    ///
    /// Slots connected by a callback during this pass are invoked before it
    /// returns. The first callback error aborts the pass and is returned
    /// wrapped in [`EmitError`]. If a callback closes the signal, the pass
    /// stops right after that callback.
    pub fn try_emit(&self, args: &A) -> Result<(), EmitError<E>> {
        let liveness = self.state.liveness.clone();
        if liveness.is_destroyed() {
            return Ok(());
        }

        let _emission = Emission::enter(&*self.state);
        let mut index = 0;
        loop {
            // No borrow of the table survives past this statement
            let visit = self.state.slots.borrow().visit(index);
            index += 1;

            let (slot, callback) = match visit {
                Visit::End => return Ok(()),
                Visit::Empty => continue,
                Visit::Live(slot, callback) => (slot, callback),
            };

            if let Err(source) = callback(args) {
                tracing::debug!(%slot, "Callback failed, aborting emission");
                return Err(EmitError::new(slot, source));
            }

            if liveness.is_destroyed() {
                tracing::debug!(%slot, "Signal closed during emission");
                return Ok(());
            }
        }
    }

    /// Destroy the signal in place.
    ///
    /// Outstanding connections become inert, later emissions do nothing and
    /// later connects return inert connections. An emission in progress
    /// stops after its current callback. Closing twice is a no-op.
    pub fn close(&self) {
        if !self.state.liveness.mark_destroyed() {
            return;
        }

        let emitting = self.is_emitting();
        tracing::debug!(emitting, "Signal closed");
        if !emitting {
            let released = self.state.slots.borrow_mut().take_all();
            drop(released);
        }
    }

    /// Whether the signal has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.liveness.is_destroyed()
    }

    /// Whether an emission (of any nesting depth) is in progress.
    pub fn is_emitting(&self) -> bool {
        self.state.depth.get() > 0
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        if self.is_closed() {
            return 0;
        }
        self.state.slots.borrow().live()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A: ?Sized + 'static, E: 'static> Signal<A, E> {
    /// Register an infallible callback at the end of the slot list.
    pub fn connect<F>(&self, callback: F) -> Connection
    where
        F: Fn(&A) + 'static,
    {
        self.try_connect(move |args: &A| {
            callback(args);
            Ok(())
        })
    }

    /// Register a fallible callback at the end of the slot list.
    ///
    /// On a closed signal the callback is dropped and the returned
    /// connection is inert.
    pub fn try_connect<F>(&self, callback: F) -> Connection
    where
        F: Fn(&A) -> Result<(), E> + 'static,
    {
        if self.is_closed() {
            tracing::debug!("Connect on closed signal ignored");
            return Connection::default();
        }

        let slot = self.state.slots.borrow_mut().push(Rc::new(callback));
        tracing::trace!(%slot, emitting = self.is_emitting(), "Slot connected");

        let table: Weak<State<A, E>> = Rc::downgrade(&self.state);
        Connection::new(table, slot, self.state.liveness.clone())
    }
}

impl<A: ?Sized> Signal<A, Infallible> {
    /// Invoke every live slot in registration order.
    ///
    /// See [`Signal::try_emit`] for the traversal rules.
    pub fn emit(&self, args: &A) {
        if let Err(err) = self.try_emit(args) {
            match err.into_inner() {}
        }
    }
}

impl<A: ?Sized, E> Default for Signal<A, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies the live slots into an independent signal.
///
/// Connections of the original keep pointing at the original; the copy has
/// its own liveness flag and no connections. Cloning while emitting is
/// allowed and skips slots already soft-deleted by that emission.
impl<A: ?Sized, E> Clone for Signal<A, E> {
    fn clone(&self) -> Self {
        if self.is_closed() {
            return Self::new();
        }
        let slots = self.state.slots.borrow().live_copy();
        Self::with_slots(slots)
    }
}

impl<A: ?Sized, E> Drop for Signal<A, E> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<A: ?Sized, E> fmt::Debug for Signal<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.len())
            .field("depth", &self.state.depth.get())
            .field("closed", &self.is_closed())
            .finish()
    }
}
