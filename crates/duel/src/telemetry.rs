//! Tracing bootstrap for binaries and tests.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a fmt subscriber filtered by `RUST_LOG` (default
/// [`DEFAULT_FILTER`]).
///
/// Returns `false` if a global subscriber was already installed, in which
/// case nothing changes. Safe to call from every test.
pub fn init_tracing() -> bool {
    init_tracing_with(DEFAULT_FILTER)
}

/// Same as [`init_tracing`] with a custom fallback filter.
pub fn init_tracing_with(filter: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_tolerated() {
        init_tracing();
        assert!(!init_tracing());
    }
}
