//! Subscriber construction.
//!
//! Logs are JSON lines with wall-clock timestamps. The filter comes from
//! `RUST_LOG` when set, otherwise from the caller's default directive.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is absent.
pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber with `default_filter` as the fallback directive.
///
/// Returns `false` when a subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok()
}
