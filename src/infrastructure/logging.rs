use std::fs;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub enable_console: bool,
    pub enable_file: bool,
    pub log_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            enable_console: true,
            enable_file: false,
            log_level: Level::INFO,
        }
    }
}

/// Initializes tracing with a console layer and an optional daily-rolling
/// file layer. The returned guard must stay alive for the file writer to
/// keep flushing.
pub fn init_logging(
    config: Option<LoggingConfig>,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let config = config.unwrap_or_default();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "account_service={level},sqlx=warn,rdkafka=warn",
            level = config.log_level
        ))
    });

    let mut layers: Vec<Box<dyn Layer<_> + Send + Sync>> = Vec::new();
    let mut guard = None;

    if config.enable_console {
        layers.push(fmt::layer().with_target(true).boxed());
    }

    if config.enable_file {
        fs::create_dir_all(&config.log_dir)?;
        let appender =
            RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "account-service.log");
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        guard = Some(file_guard);
        layers.push(fmt::layer().with_writer(writer).with_ansi(false).boxed());
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_failure_converts_to_anyhow() {
        // Fails in create_dir_all, before any global subscriber is set.
        let config = LoggingConfig {
            log_dir: "/dev/null/logs".to_string(),
            enable_console: false,
            enable_file: true,
            log_level: Level::INFO,
        };

        let err = init_logging(Some(config)).unwrap_err();
        let _: anyhow::Error = anyhow::Error::from_boxed(err);
    }
}
