//! Embedded document store backed by plain JSON files.
//!
//! Records are grouped into collections and addressed by a
//! `(collection, resource)` pair. Each record lives in its own file:
//!
//! ```text
//! root/
//! ├── employee/
//! │   ├── acme.json
//! │   └── globex.json
//! └── customer/
//!     └── initech.json
//! ```
//!
//! Writes go to a temporary sibling and are renamed into place, so a record
//! on disk is always a complete, previously committed value. Writes and
//! deletes are serialized per collection; reads take no lock.
//!
//! # Example
//!
//! ```no_run
//! use docstore::{Driver, DriverOptions, LogLevel};
//! use serde_json::json;
//!
//! let db = Driver::with_options("./data", DriverOptions::new().with_log_level(LogLevel::Debug))?;
//!
//! db.write("employee", "acme", &json!({ "Name": "Acme", "Age": "10" }))?;
//!
//! for raw in db.read_all("employee")? {
//!     println!("{}", raw);
//! }
//!
//! db.delete("employee", "acme")?;
//! # Ok::<(), docstore::StoreError>(())
//! ```

pub mod atomic;
pub mod config;
pub mod driver;
pub mod error;
pub mod logger;

pub use config::{default_root_dir, DriverOptions};
pub use driver::Driver;
pub use error::{ErrorKind, Result, StoreError};
pub use logger::{LogLevel, Logger, NoopLogger, TracingLogger};
