//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docstore::{DriverOptions, LogLevel};

/// docstore - JSON document store on the local filesystem
#[derive(Parser, Debug)]
#[command(name = "docstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Root directory of the store
    #[arg(short, long, env = "DOCSTORE_DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a JSON value as a resource
    Write {
        collection: String,
        resource: String,
        /// JSON text, e.g. '{"Name":"Acme","Age":"10"}'
        json: String,
    },

    /// Print a resource
    Read { collection: String, resource: String },

    /// Print every resource in a collection
    List { collection: String },

    /// Remove a resource (or a directory inside a collection)
    Delete { collection: String, resource: String },

    /// Write the sample employees
    Seed {
        /// Target collection
        #[arg(short, long, default_value = crate::seed::EMPLOYEE_COLLECTION)]
        collection: String,
    },

    /// Seed sample employees, then read them all back and decode them
    Demo,
}

impl Cli {
    /// Returns the store root, using the configured default if not specified.
    pub fn root_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(docstore::default_root_dir)
    }

    /// Returns the subscriber log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Returns the threshold for the driver's own logger.
    pub fn store_log_level(&self) -> LogLevel {
        match self.verbose {
            0 | 1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Returns driver options. Without `-v`, `DOCSTORE_LOG_LEVEL` decides.
    pub fn driver_options(&self) -> DriverOptions {
        if self.verbose == 0 {
            DriverOptions::from_env()
        } else {
            DriverOptions::new().with_log_level(self.store_log_level())
        }
    }
}
