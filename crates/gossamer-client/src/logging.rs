//! Tracing subscriber setup for applications embedding the client

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install a text subscriber; `verbose` lowers the default level to debug
///
/// `RUST_LOG` wins over both defaults. Returns false when a global
/// subscriber was already installed.
pub fn init_tracing(verbose: bool) -> bool {
    let settings = LoggingSettings {
        level: if verbose { "debug" } else { "info" }.to_string(),
        json: false,
    };
    init_tracing_with(&settings)
}

/// Install a subscriber from configuration
pub fn init_tracing_with(settings: &LoggingSettings) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if settings.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false),
            )
            .try_init()
    };
    installed.is_ok()
}
