use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::env_string;

const LOG_FILE_PREFIX: &str = "acharya.log";

/// Keeps the non-blocking file writer flushing for the process lifetime.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn file_log_dir() -> Option<String> {
    let enabled = matches!(
        env_string("ENABLE_FILE_LOGS").as_deref(),
        Some("true") | Some("1")
    );
    enabled.then(|| env_string("LOG_DIR").unwrap_or_else(|| "./logs".to_string()))
}

pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true));

    let Some(dir) = file_log_dir() else {
        registry.init();
        return None;
    };

    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("failed to create log directory {dir}: {err}");
        registry.init();
        return None;
    }

    let appender = RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    registry
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Some(FileLogGuard { _guard: guard })
}
