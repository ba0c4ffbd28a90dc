//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::DEFAULT_LOG_FILTER;

/// Install a fmt subscriber. `RUST_LOG` wins over `filter`; an empty
/// `filter` falls back to [`DEFAULT_LOG_FILTER`].
///
/// Returns false if a global subscriber was already set.
pub fn init_tracing(filter: &str) -> bool {
    let fallback = if filter.trim().is_empty() {
        DEFAULT_LOG_FILTER
    } else {
        filter
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .try_init()
        .is_ok()
}
