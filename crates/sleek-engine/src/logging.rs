//! Logging setup
//!
//! Installs a `tracing-subscriber` formatter filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber with an `info` default
pub fn init() {
    init_with("info");
}

/// Install the global subscriber; `default` applies when `RUST_LOG` is unset.
///
/// Returns false if a subscriber was already installed.
pub fn init_with(default: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
