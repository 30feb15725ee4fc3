use std::path::PathBuf;

/// Errors from artifact store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested artifact was not found.
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// The storage root cannot be enumerated or written into.
    #[error("storage root unavailable at {root:?}: {source}")]
    StorageUnavailable {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while reading, writing or copying artifact content.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be mapped to a location inside the storage root.
    #[error("invalid artifact key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },
}

impl StoreError {
    /// Returns `true` if this error means the key does not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
