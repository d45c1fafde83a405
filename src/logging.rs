use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "tinderbox.log";

/// Install the global subscriber: stderr always, plus a daily rolling file
/// when enabled. `RUST_LOG` overrides the configured level.
///
/// Keep the returned guard alive for the process lifetime, or buffered file
/// output is lost.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if !config.to_file {
        let _ = tracing_subscriber::registry().with(filter).with(console).try_init();
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&config.log_dir) {
        eprintln!("failed to create log directory {}: {e}", config.log_dir.display());
        let _ = tracing_subscriber::registry().with(filter).with(console).try_init();
        return None;
    }

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&config.log_dir, LOG_FILE_PREFIX));
    let file = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init();
    Some(guard)
}
