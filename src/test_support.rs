//! Shared helpers for unit tests

use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once per test binary
///
/// Filtering follows `RUST_LOG`, defaulting to `trace` for this crate so the
/// striping and registry events are formatted during tests.
pub(crate) fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("segment=trace"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
