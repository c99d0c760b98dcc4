//! Tracing subscriber setup.
//!
//! Installs a `tracing-subscriber` fmt layer filtered by `EnvFilter`. The
//! configured level is the default directive; `RUST_LOG` wins when set.
//! With `logging.file` set, output goes to a daily-rolling file through a
//! non-blocking `tracing-appender` writer.

use crate::config::FileLoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(config: &FileLoggingConfig) -> EnvFilter {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(from_env.as_deref(), &config.level)
}

fn filter_from(from_env: Option<&str>, level: &str) -> EnvFilter {
    match from_env.map(EnvFilter::try_new) {
        Some(Ok(filter)) => filter,
        _ => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Install the global subscriber.
///
/// Returns the appender guard when file output is enabled; keep it alive for
/// the life of the process or buffered lines are lost. A subscriber that is
/// already installed is left in place.
pub fn init_tracing(config: &FileLoggingConfig) -> Option<WorkerGuard> {
    let filter = env_filter(config);

    let Some(path) = config.file_path() else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
        return None;
    };

    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ".".into());
    let prefix = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "opsgate.log".to_string());

    let appender = tracing_appender::rolling::daily(directory, prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .try_init();
    Some(guard)
}
