use dagway_types::BlockId;

/// Errors from directory listing.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    /// A shard node could not be fetched, so the listing cannot be
    /// completed. No partial listing is ever returned.
    #[error("listing incomplete: shard {missing} unavailable: {reason}")]
    TraversalIncomplete { missing: BlockId, reason: String },

    /// The shard structure is malformed (bad slot table, non-shard child,
    /// depth beyond the name hash).
    #[error("corrupt shard {id}: {reason}")]
    CorruptShard { id: BlockId, reason: String },

    /// The root block is not a shard node.
    #[error("not a directory: {0}")]
    NotADirectory(BlockId),
}

impl ListError {
    pub(crate) fn corrupt(id: BlockId, reason: impl Into<String>) -> Self {
        ListError::CorruptShard {
            id,
            reason: reason.into(),
        }
    }
}

/// Result alias for listing operations.
pub type ListResult<T> = Result<T, ListError>;
