//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `LAYMAN_LOG` wins over the configured filter. Later calls are no-ops.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_env("LAYMAN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
