use thiserror::Error;

use vellum_store::StoreError;

#[derive(Debug, Error)]
pub enum CollateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to flush collation sink: {0}")]
    Sink(#[source] std::io::Error),
}

impl CollateError {
    /// Returns `true` if a requested key does not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }

    /// Returns `true` if a requested key cannot be cleaned into a valid name.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Self::Store(StoreError::InvalidKey { .. }))
    }
}

pub type CollateResult<T> = Result<T, CollateError>;
