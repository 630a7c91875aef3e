use dagway_store::StoreError;
use dagway_types::BlockId;

/// Errors from DAG traversal.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    /// The requested offset lies at or beyond the stream's declared size.
    #[error("offset {offset} out of range for stream of {size} bytes")]
    OutOfRange { offset: u64, size: u64 },

    /// The DAG's declared structure disagrees with its fetched content:
    /// a size mismatch, a hash mismatch, an undecodable block, or a node
    /// kind that cannot appear where it did.
    #[error("corrupt DAG at {id}: {reason}")]
    CorruptDag { id: BlockId, reason: String },

    /// The root does not head a file DAG (it is a shard node).
    #[error("not a file root: {0}")]
    NotAFile(BlockId),

    /// Store failure, surfaced unchanged. `NotFound` here means the DAG is
    /// only partially present locally.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl WalkError {
    /// Whether this walk failed only because a block is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WalkError::Store(e) if e.is_not_found())
    }

    pub(crate) fn corrupt(id: BlockId, reason: impl Into<String>) -> Self {
        WalkError::CorruptDag {
            id,
            reason: reason.into(),
        }
    }
}

/// Result alias for walk operations.
pub type WalkResult<T> = Result<T, WalkError>;
