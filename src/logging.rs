//! Tracing setup for the binaries

use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// Respects the `CHROMOSEQ_LOG` environment variable for filtering and
/// defaults to `info`. Logs go to stderr so stdout carries only output.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("CHROMOSEQ_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
