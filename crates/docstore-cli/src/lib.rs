//! Command-line front end for the docstore driver.
//!
//! The `demo` command mirrors a typical first run: seed a handful of sample
//! employees, read the whole collection back and decode it.

pub mod cli;
pub mod commands;
pub mod seed;
