//! Logging setup for binaries and tests that use signals.
//!
//! The library itself only emits `tracing` events; nothing is printed unless
//! a subscriber is installed.

pub mod tracing;
