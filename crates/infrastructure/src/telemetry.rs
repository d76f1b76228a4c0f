//! Tracing subscriber setup.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call has an effect. Output
/// goes through the test writer so it is captured per test.
pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        // Another subscriber may already be set by the host application.
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
            .with(fmt::layer().with_test_writer())
            .try_init();
    });
}
