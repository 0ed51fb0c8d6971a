//! Tracing subscriber setup.
//!
//! Signals log slot registration, detachment and compaction at `trace` and
//! `debug` level under the `signals` target.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a console subscriber for the given service.
///
/// This sets up:
/// - Console logging with targets, thread ids, files and line numbers
/// - Environment-based filter (via RUST_LOG), `info,signals=debug` otherwise
///
/// Returns false if a global subscriber was already installed, in which case
/// nothing changes.
pub fn init_tracing(service_name: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,signals=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(service = service_name, "Tracing initialized");
    }
    installed
}

/// Initialize tracing for tests (only logs errors).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("error")
        .with_test_writer()
        .try_init();
}
