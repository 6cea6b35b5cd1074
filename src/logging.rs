//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "FOODSHARE_LOG";

/// Install a stderr `fmt` subscriber filtered by `FOODSHARE_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
