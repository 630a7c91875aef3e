use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use dagway_types::{BlockId, DagNode};

use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks are held behind a `RwLock`;
/// payloads are `Bytes`, so reads are cheap clones. The mutating helpers
/// (`put`, `remove`, ...) exist so tests can stage sparse stores — they are
/// not part of the [`BlockStore`] contract, which is read-only.
pub struct MemoryBlockStore {
    blocks: RwLock<HashMap<BlockId, Bytes>>,
}

impl MemoryBlockStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Insert raw block bytes, returning their content id.
    pub fn put(&self, data: impl Into<Bytes>) -> BlockId {
        let data = data.into();
        let id = BlockId::from_bytes(&data);
        self.blocks.write().expect("lock poisoned").insert(id, data);
        id
    }

    /// Encode and insert a DAG node, returning its content id.
    pub fn put_node(&self, node: &DagNode) -> BlockId {
        self.put(node.encode())
    }

    /// Insert bytes under an arbitrary id, bypassing content addressing.
    ///
    /// Only useful for staging corrupt blocks in tests.
    pub fn put_raw(&self, id: BlockId, data: impl Into<Bytes>) {
        self.blocks
            .write()
            .expect("lock poisoned")
            .insert(id, data.into());
    }

    /// Remove a block. Returns `true` if it was present.
    pub fn remove(&self, id: &BlockId) -> bool {
        self.blocks.write().expect("lock poisoned").remove(id).is_some()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.blocks.read().expect("lock poisoned").contains_key(id)
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blocks.
    pub fn total_bytes(&self) -> u64 {
        self.blocks
            .read()
            .expect("lock poisoned")
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }
}

impl Default for MemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn fetch(&self, id: &BlockId) -> StoreResult<Bytes> {
        let map = self.blocks.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }
}

impl std::fmt::Debug for MemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBlockStore")
            .field("block_count", &self.len())
            .finish()
    }
}
