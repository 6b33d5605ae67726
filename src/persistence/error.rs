//! Persistence error types.

use thiserror::Error;

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing the value would exceed the backend's capacity
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// Backend cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Filesystem operation failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while saving or restoring a persisted state record
#[derive(Debug, Error)]
pub enum PersistError {
    /// Backend read or write failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Serialization to JSON failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Stored text is not a valid record
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Record was written by an incompatible format version
    #[error("Unsupported persisted state version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Record belongs to another machine
    #[error("Persisted state belongs to machine '{found}', expected '{expected}'")]
    MachineMismatch { expected: String, found: String },
}
