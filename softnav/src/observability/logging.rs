//! Subscriber setup for hosts that do not install their own.

use tracing_subscriber::EnvFilter;

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Installs a fmt subscriber filtered by `RUST_LOG`, or `default_filter`
/// when the variable is unset.
///
/// Panics if a global subscriber is already installed; use
/// [`try_init_tracing`] when that is possible.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_target(true)
        .init();
}

/// Like [`init_tracing`] but returns `false` instead of panicking when a
/// subscriber is already installed.
pub fn try_init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_is_idempotent() {
        let _ = try_init_tracing("softnav=debug");
        assert!(!try_init_tracing("softnav=debug"));
    }
}
