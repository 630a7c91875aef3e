use async_trait::async_trait;
use bytes::Bytes;

use dagway_types::BlockId;

use crate::error::StoreResult;

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable: the same id always resolves to the same bytes.
/// - Fetches are pure reads with no side effects observable to callers;
///   an abandoned (cancelled) fetch leaves the store unchanged.
/// - `NotFound` is returned for absent blocks, never an empty buffer.
/// - Latency is unbounded (network or disk); every call is an await point.
/// - Retry policy is the implementation's concern; callers call once.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Fetch a block's bytes by content id.
    ///
    /// Returns [`StoreError::NotFound`] if the block is absent,
    /// other [`StoreError`] variants on backend failure.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    /// [`StoreError`]: crate::StoreError
    async fn fetch(&self, id: &BlockId) -> StoreResult<Bytes>;
}
