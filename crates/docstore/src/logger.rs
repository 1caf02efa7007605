//! Pluggable logging for the driver.
//!
//! The driver never talks to a logging backend directly. It reports through
//! the [`Logger`] trait, which has one method per severity. Each method takes
//! preformatted [`fmt::Arguments`], so callers use `format_args!` the same way
//! they would use `format!`.
//!
//! The default implementation, [`TracingLogger`], forwards to the `tracing`
//! macros under the `docstore` target. Installing a subscriber is the
//! responsibility of the binary.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, error, info, trace, warn};

/// Severity levels, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// A sink for driver log messages.
pub trait Logger: Send + Sync {
    fn fatal(&self, args: fmt::Arguments<'_>);
    fn error(&self, args: fmt::Arguments<'_>);
    fn warn(&self, args: fmt::Arguments<'_>);
    fn info(&self, args: fmt::Arguments<'_>);
    fn debug(&self, args: fmt::Arguments<'_>);
    fn trace(&self, args: fmt::Arguments<'_>);
}

/// Logger that forwards to `tracing`, dropping anything below `level`.
///
/// `fatal` is always emitted, whatever the threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger {
    level: LogLevel,
}

impl TracingLogger {
    /// Creates a logger that emits messages at `level` or more severe.
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Returns the configured threshold.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }
}

impl Logger for TracingLogger {
    fn fatal(&self, args: fmt::Arguments<'_>) {
        // tracing has no fatal level
        error!(target: "docstore", fatal = true, "{}", args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        if self.enabled(LogLevel::Error) {
            error!(target: "docstore", "{}", args);
        }
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        if self.enabled(LogLevel::Warn) {
            warn!(target: "docstore", "{}", args);
        }
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        if self.enabled(LogLevel::Info) {
            info!(target: "docstore", "{}", args);
        }
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        if self.enabled(LogLevel::Debug) {
            debug!(target: "docstore", "{}", args);
        }
    }

    fn trace(&self, args: fmt::Arguments<'_>) {
        if self.enabled(LogLevel::Trace) {
            trace!(target: "docstore", "{}", args);
        }
    }
}

/// Logger that discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn fatal(&self, _args: fmt::Arguments<'_>) {}
    fn error(&self, _args: fmt::Arguments<'_>) {}
    fn warn(&self, _args: fmt::Arguments<'_>) {}
    fn info(&self, _args: fmt::Arguments<'_>) {}
    fn debug(&self, _args: fmt::Arguments<'_>) {}
    fn trace(&self, _args: fmt::Arguments<'_>) {}
}
