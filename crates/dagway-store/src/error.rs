use dagway_types::BlockId;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block is not in the store. Routine for a
    /// network-fed cache; resolvers decide how it surfaces.
    #[error("block not found: {0}")]
    NotFound(BlockId),

    /// I/O error from the underlying backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure (transport, corruption at rest, ...).
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether this error means "block absent" rather than "fetch broke".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
