//! # Logging & Tracing Infrastructure
//!
//! Provides structured logging with the `tracing` crate, supporting:
//! - JSON, compact, and pretty-print output formats
//! - Module-level filtering via `EnvFilter`
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Compact)
//!     .with_level(tracing::Level::DEBUG);
//!
//! init_logging(config).expect("Failed to initialize logging");
//!
//! tracing::info!("Reader core started");
//! ```
//!
//! The filter string wins over the plain level when both are set, so hosts can
//! write `core_playback=trace,info` style directives the same way they would
//! with `RUST_LOG`.

use crate::error::{Error, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Minimum log level
    pub level: Level,
    /// Custom filter string (e.g., "core_playback=debug,core_library=trace")
    pub filter: Option<String>,
    /// Display target module in logs
    pub display_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: Level::INFO,
            filter: None,
            display_target: true,
        }
    }
}

impl LoggingConfig {
    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set minimum log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set a custom filter directive string
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Toggle target module display
    pub fn with_display_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Should be called once at host startup; calling it a second time returns an
/// error from the underlying subscriber registry.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = match &config.filter {
        Some(custom) => EnvFilter::try_new(custom)
            .map_err(|e| Error::Config(format!("Invalid log filter '{}': {}", custom, e)))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.to_string().to_lowercase())),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.display_target);

    let init_result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    init_result.map_err(|e| Error::Internal(format!("Failed to install subscriber: {}", e)))
}
