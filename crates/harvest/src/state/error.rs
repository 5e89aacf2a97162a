//! State store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the incremental state store.
#[derive(Error, Debug)]
pub enum StateError {
    /// SQLite error from rusqlite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error when creating the state directory.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration failed to apply.
    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// The connection lock was poisoned.
    #[error("State store lock poisoned")]
    LockPoisoned,

    /// Caller passed a value the store cannot act on.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A stored checkpoint request could not be encoded or decoded.
    #[error("Checkpoint payload error: {0}")]
    Payload(#[from] serde_json::Error),
}
