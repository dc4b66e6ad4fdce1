//! Error types for wevva-store.

use std::path::PathBuf;

/// Result type for wevva-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in wevva-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store file could not be opened or locked in time.
    #[error("Store at {path} is unavailable: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    /// The file exists but does not hold a valid store, or stored bytes are malformed.
    #[error("Store is corrupt: {0}")]
    Corrupt(String),

    /// The store was used after [`Store::close`](crate::Store::close).
    #[error("Store is closed")]
    Closed,

    /// A batch handed to the store is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error raised by the storage engine inside a transaction.
    #[error("Database error: {0}")]
    Database(#[source] redb::Error),
}

impl From<redb::StorageError> for Error {
    fn from(err: redb::StorageError) -> Self {
        match err {
            redb::StorageError::Corrupted(msg) => Error::Corrupt(msg),
            other => Error::Database(other.into()),
        }
    }
}

impl From<redb::TransactionError> for Error {
    fn from(err: redb::TransactionError) -> Self {
        match err {
            redb::TransactionError::Storage(storage) => storage.into(),
            other => Error::Database(other.into()),
        }
    }
}

impl From<redb::TableError> for Error {
    fn from(err: redb::TableError) -> Self {
        match err {
            redb::TableError::Storage(storage) => storage.into(),
            other => Error::Database(other.into()),
        }
    }
}

impl From<redb::CommitError> for Error {
    fn from(err: redb::CommitError) -> Self {
        match err {
            redb::CommitError::Storage(storage) => storage.into(),
            other => Error::Database(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Unavailable {
            path: PathBuf::from("/data/weather.db"),
            reason: "lock not acquired within 1s".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("/data/weather.db"));
        assert!(display.contains("lock not acquired"));

        assert_eq!(Error::Closed.to_string(), "Store is closed");
    }

    #[test]
    fn test_corrupted_storage_maps_to_corrupt() {
        let err: Error = redb::StorageError::Corrupted("bad page".to_string()).into();
        assert!(matches!(err, Error::Corrupt(msg) if msg == "bad page"));
    }
}
