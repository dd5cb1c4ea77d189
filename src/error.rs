//! Error types for gridstore
//!
//! Provides a unified error type for all operations. Every failing call
//! surfaces as an `Err`, so callers can always tell a failure apart from an
//! empty but successful result.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using GridError
pub type Result<T> = std::result::Result<T, GridError>;

/// Unified error type for gridstore operations
#[derive(Debug, Error)]
pub enum GridError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Coordination Errors
    // -------------------------------------------------------------------------
    #[error("Lock timeout: could not acquire exclusive access within {0:?}")]
    LockTimeout(Duration),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    // -------------------------------------------------------------------------
    // Schema / Input Errors
    // -------------------------------------------------------------------------
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    #[error("Backend error: {0}")]
    Backend(String),

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Snapshot corruption detected: {0}")]
    SnapshotCorruption(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GridError {
    /// Whether the error is a configuration problem that retrying cannot fix.
    ///
    /// Only a malformed reserved header counts; everything else is reported
    /// to the caller as a soft failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GridError::Schema(_))
    }
}
