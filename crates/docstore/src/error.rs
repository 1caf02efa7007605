//! Error types for store operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A collection or resource identifier was empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Collection or resource not found.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Failed to read from file system.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write, rename or remove on the file system.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize a value to JSON.
    #[error("failed to serialize: {0}")]
    EncodeError(#[source] serde_json::Error),

    /// Stored bytes are not valid JSON or don't match the requested type.
    #[error("failed to decode {path}: {source}")]
    DecodeError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Broad category of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Io,
    Encoding,
    Decoding,
}

impl StoreError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::ReadError { .. }
            | StoreError::WriteError { .. }
            | StoreError::DirectoryError { .. } => ErrorKind::Io,
            StoreError::EncodeError(_) => ErrorKind::Encoding,
            StoreError::DecodeError { .. } => ErrorKind::Decoding,
        }
    }

    /// Returns true if the error is a missing collection or resource.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub(crate) fn not_found(kind: &str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind: kind.to_string(),
            id: id.into(),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
