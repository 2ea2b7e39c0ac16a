//! Telemetry setup

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogSettings;
use crate::error::AppError;

pub fn init_telemetry(settings: &LogSettings) -> Result<(), AppError> {
    // RUST_LOG wins over the configured level
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| AppError::LoggerError(e.to_string()))?;

    let file_appender = match &settings.directory {
        Some(dir) => Some(
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("attendance")
                .filename_suffix("log")
                .build(dir)
                .map_err(|e| AppError::LoggerError(e.to_string()))?,
        ),
        None => None,
    };

    let result = match settings.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stdout)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .with(file_appender.map(|appender| {
                fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_target(true)
            }))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stdout).with_target(true))
            .with(file_appender.map(|appender| {
                fmt::layer()
                    .with_writer(appender)
                    .with_target(true)
                    .with_ansi(false) // No colors in file
            }))
            .try_init(),
    };

    result.map_err(|e| AppError::LoggerError(e.to_string()))
}
