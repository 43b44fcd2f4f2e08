use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::error::{RoiError, RoiResult};

/// Logging configuration, embedded in the `[logging]` config section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: PathBuf,
    /// Only honoured with the `advanced_logging` feature
    pub enable_file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            enable_file_logging: false,
        }
    }
}

/// Keeps the non-blocking file writer flushing until dropped
pub struct LoggingGuard {
    #[cfg(feature = "advanced_logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pdf_roi={},eframe=warn,winit=warn,{}", level, level)))
}

/// Initialize the logging system
pub fn init_logging(config: &LoggingConfig) -> RoiResult<LoggingGuard> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .boxed();

    let registry = Registry::default().with(env_filter(&config.level)).with(console_layer);

    #[cfg(feature = "advanced_logging")]
    let guard = if config.enable_file_logging {
        std::fs::create_dir_all(&config.log_dir)
            .map_err(|e| RoiError::file_io(config.log_dir.to_string_lossy().to_string(), e))?;

        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "pdfroi.log");
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = fmt::layer().with_writer(file_writer).with_ansi(false);

        registry
            .with(file_layer)
            .try_init()
            .map_err(|e| RoiError::configuration(format!("Logging already initialized: {}", e)))?;

        LoggingGuard {
            _file_guard: Some(file_guard),
        }
    } else {
        registry
            .try_init()
            .map_err(|e| RoiError::configuration(format!("Logging already initialized: {}", e)))?;
        LoggingGuard { _file_guard: None }
    };

    #[cfg(not(feature = "advanced_logging"))]
    let guard = {
        registry
            .try_init()
            .map_err(|e| RoiError::configuration(format!("Logging already initialized: {}", e)))?;
        LoggingGuard {}
    };

    info!("Log level: {}", config.level);
    if config.enable_file_logging {
        if cfg!(feature = "advanced_logging") {
            info!("File logging enabled: {}", config.log_dir.display());
        } else {
            info!("File logging requested but the advanced_logging feature is off");
        }
    }

    Ok(guard)
}

/// Times one pipeline, logging on start and on drop
pub struct PerformanceTimer {
    start: std::time::Instant,
    operation: String,
}

impl PerformanceTimer {
    pub fn start(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        info!("⏱️  Starting: {}", operation);
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    pub fn checkpoint(&self, checkpoint: &str) {
        let elapsed = self.start.elapsed();
        info!("⏱️  {} - {}: {}ms", self.operation, checkpoint, elapsed.as_millis());
    }
}

impl Drop for PerformanceTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        info!("⏱️  Completed {}: {}ms", self.operation, elapsed.as_millis());
    }
}
