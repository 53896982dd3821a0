//! Error types for gatelock.

use thiserror::Error;

/// Common error type for guard operations.
#[derive(Error, Debug)]
pub enum GuardError {
    /// The durable store could not be read or written.
    ///
    /// Surfaced to the caller as-is; an unavailable store is never reported
    /// as an empty ledger.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Stored data failed to decode.
    #[error("storage corrupt: {0}")]
    StorageCorrupt(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Decode-class failures mean the stored bytes are bad; everything else is a
// connection or I/O problem.
impl From<sqlx::Error> for GuardError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::TypeNotFound { .. } => GuardError::StorageCorrupt(e.to_string()),
            other => GuardError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Result type alias for guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;
