// src/logging.rs

use crate::config::Config;
use crate::errors::{ChatError, ChatResult};
use crate::models::ApiCallLog;
use flexi_logger::{detailed_format, FileSpec, Logger, LoggerHandle, WriteMode};
use std::fs;

/// Starts the file logger. The terminal belongs to the UI, so nothing is written
/// to stdout or stderr. `RUST_LOG` takes precedence over the configured level.
/// Keep the returned handle alive for the lifetime of the program.
pub fn init_logging(config: &Config) -> ChatResult<LoggerHandle> {
    fs::create_dir_all(&config.log_dir).map_err(|e| {
        ChatError::config_error(format!(
            "Failed to create log directory {}: {}",
            config.log_dir.display(),
            e
        ))
    })?;

    Logger::try_with_env_or_str(&config.log_level)
        .and_then(|logger| {
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(&config.log_dir)
                        .basename("parley")
                        .suppress_timestamp(),
                )
                .append()
                .format(detailed_format)
                .write_mode(WriteMode::BufferAndFlush)
                .start()
        })
        .map_err(|e| ChatError::config_error(format!("Failed to start logger: {}", e)))
}

/// Records a backend call in the log file.
pub fn log_api_call(log: &ApiCallLog) {
    log::info!(
        target: "parley::api",
        "[{}] {} - {} - Status: {} - Time: {}ms",
        log.timestamp.to_rfc3339(),
        log.endpoint,
        log.request_summary,
        log.response_status,
        log.response_time_ms
    );
}
