//! Diagnostic logging setup.

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber that writes through the test harness's captured output.
///
/// The filter comes from `RUST_LOG` and defaults to `warn`. Calling this more than once, or after another
/// subscriber was installed, does nothing.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}
