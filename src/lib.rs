//! Signals: synchronous in-process callback registries.
//!
//! A [`Signal`] holds an ordered list of callbacks ("slots") and invokes them
//! together on [`Signal::emit`]. Registering returns a [`Connection`], a
//! move-only handle that removes its slot when dropped.
//!
//! # Guarantees
//!
//! - **Reentrant**: callbacks may connect, disconnect, emit or close the
//!   signal that is invoking them
//! - **Deferred removal**: slots removed mid-emission are cleared in place and
//!   compacted when the outermost emission returns
//! - **Safe teardown**: connections may outlive their signal; disconnecting
//!   then is a no-op detected through a shared liveness flag
//! - **Failure-safe bookkeeping**: a failing or panicking callback aborts the
//!   pass but leaves the signal consistent
//!
//! Signals are single-threaded (`!Send`, `!Sync`).
//!
//! # Modules
//!
//! - [`signal`]: registry, connection handle and emission error
//! - [`observability`]: tracing subscriber setup

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // signal::Signal is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc       // Panic docs can be verbose
)]

pub mod observability;
pub mod signal;

pub use signal::{Connection, EmitError, Signal, SlotId};
