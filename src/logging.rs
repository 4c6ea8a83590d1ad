//! Centralized logging setup with optional file output
//!
//! Console output goes to stderr so stdout stays free for the JSON summary.

use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::constants::logging::{DEFAULT_FILTER, LOG_FILE};

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Stderr only
    #[default]
    Stderr,
    /// Stderr plus `debug.log` in the working directory
    StderrAndFile,
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize logging
///
/// Every output uses the level from `RUST_LOG`, defaulting to "info".
/// The file appender guard is forgotten so the writer lives for the whole
/// program.
pub fn init_logging(target: LogTarget) {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry().with(console_layer).init();
        }
        LogTarget::StderrAndFile => {
            let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(console_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_filter(env_filter()),
                )
                .init();

            std::mem::forget(guard);
        }
    }
}
