//! Opt-in diagnostics for the addon
//!
//! Nothing is logged until the host calls `initLogging`.

use tracing_subscriber::EnvFilter;

/// Install a stderr tracing subscriber
///
/// `filter` takes `EnvFilter` syntax; without it `NPRINTER_LOG` is used,
/// then `info`. Returns false if a subscriber was already installed.
#[napi]
pub fn init_logging(filter: Option<String>) -> bool {
    let filter = filter
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_env("NPRINTER_LOG").ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
