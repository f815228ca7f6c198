// ============================================================================
// Utilities Module
// Logging setup for binaries, benches and tests
// ============================================================================

#[cfg(feature = "logging")]
use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g.
/// `"contract_orderbook=debug"`) is used. Returns false if a global subscriber
/// was already installed.
#[cfg(feature = "logging")]
pub fn init_logging(default_directive: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
