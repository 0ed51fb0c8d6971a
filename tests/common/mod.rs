//! Shared fixtures for signal tests.
//!
//! Provides:
//! - A call recorder producing tagged callbacks
//! - A slot holder for callbacks that manage their own connection

#![allow(dead_code)]

use signals::observability::tracing::init_test_tracing;
use signals::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// Records `(tag, argument)` pairs in invocation order.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<(u32, i32)>>>,
}

impl Recorder {
    /// Create an empty recorder and quiet test logging.
    pub fn new() -> Self {
        init_test_tracing();
        Self::default()
    }

    /// Callback that records its argument under `tag`.
    pub fn slot(&self, tag: u32) -> impl Fn(&i32) + 'static {
        let calls = Rc::clone(&self.calls);
        move |x: &i32| calls.borrow_mut().push((tag, *x))
    }

    /// Record a call directly, for callbacks built by hand.
    pub fn push(&self, tag: u32, x: i32) {
        self.calls.borrow_mut().push((tag, x));
    }

    /// Snapshot of the calls so far.
    pub fn calls(&self) -> Vec<(u32, i32)> {
        self.calls.borrow().clone()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

/// Place a connection can be stored after `connect` returns, so the
/// callback it belongs to can reach it.
pub type Held = Rc<RefCell<Connection>>;

pub fn held() -> Held {
    Rc::default()
}
