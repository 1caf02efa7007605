//! Driver configuration.
//!
//! # Environment Variables
//!
//! - `DOCSTORE_DIR`: Override the default root directory
//! - `DOCSTORE_LOG_LEVEL`: Threshold for the default logger (`fatal`..`trace`)

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::logger::{LogLevel, Logger, TracingLogger};

/// Environment variable for a custom root directory.
pub const ROOT_DIR_ENV: &str = "DOCSTORE_DIR";

/// Environment variable for the default logger's threshold.
pub const LOG_LEVEL_ENV: &str = "DOCSTORE_LOG_LEVEL";

/// Directory name used under the platform data directory.
const DEFAULT_DIR_NAME: &str = "docstore";

/// Fallback relative directory when no data directory is known.
const FALLBACK_DIR: &str = ".docstore";

/// Get the default store root.
///
/// The root is determined by:
/// 1. `DOCSTORE_DIR` environment variable if set
/// 2. `<local data dir>/docstore` if the platform provides one
/// 3. `.docstore` in the current directory as fallback
pub fn default_root_dir() -> PathBuf {
    std::env::var(ROOT_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_local_dir()
                .map(|d| d.join(DEFAULT_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR))
        })
}

/// Options accepted by [`crate::Driver::with_options`].
#[derive(Clone, Default)]
pub struct DriverOptions {
    /// Log sink. `None` selects a [`TracingLogger`] at `Info`.
    pub logger: Option<Arc<dyn Logger>>,
}

impl DriverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `DOCSTORE_LOG_LEVEL` and configures the default logger with it.
    ///
    /// Unset or unparseable values keep the `Info` default.
    pub fn from_env() -> Self {
        let level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| v.parse::<LogLevel>().ok())
            .unwrap_or_default();
        Self::new().with_log_level(level)
    }

    /// Uses a custom logger.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Uses the default tracing logger with the given threshold.
    pub fn with_log_level(self, level: LogLevel) -> Self {
        self.with_logger(Arc::new(TracingLogger::new(level)))
    }

    pub(crate) fn into_logger(self) -> Arc<dyn Logger> {
        match self.logger {
            Some(logger) => logger,
            None => Arc::new(TracingLogger::new(LogLevel::Info)),
        }
    }
}

impl fmt::Debug for DriverOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverOptions")
            .field("logger", &self.logger.as_ref().map(|_| "<dyn Logger>"))
            .finish()
    }
}
