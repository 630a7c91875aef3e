use dagway_walk::WalkError;

/// Errors from range parsing and resolution.
#[derive(Debug, thiserror::Error)]
pub enum RangeError {
    /// No requested range overlaps the stream. `start` is the first
    /// offending range's start.
    #[error("range starting at {start} not satisfiable for stream of {total} bytes")]
    NotSatisfiable { start: u64, total: u64 },

    /// The textual range form could not be parsed. Callers typically react
    /// by ignoring the header and serving full content.
    #[error("malformed range header: {0}")]
    Malformed(String),

    /// Traversal failure while resolving a range.
    #[error(transparent)]
    Walk(#[from] WalkError),
}

impl RangeError {
    /// Whether resolution failed only because a block is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RangeError::Walk(e) if e.is_not_found())
    }
}

/// Result alias for range operations.
pub type RangeResult<T> = Result<T, RangeError>;
