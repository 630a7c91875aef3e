use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use dagway_store::BlockStore;
use dagway_types::{BlockId, DagNode};

use crate::error::{WalkError, WalkResult};

/// One successful offset resolution: the leaf containing the offset, its
/// bytes, and where it sits in the stream.
#[derive(Clone, Debug)]
pub struct LeafHit {
    /// The leaf block's id.
    pub id: BlockId,
    /// The leaf's payload bytes.
    pub data: Bytes,
    /// Offset of the resolved byte within the leaf.
    pub offset_in_leaf: u64,
    /// Absolute stream offset at which this leaf begins.
    pub leaf_start: u64,
}

impl LeafHit {
    /// The leaf's length in bytes.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Request-scoped DAG walker.
///
/// Interior nodes (branches, shards) fetched during resolution are cached
/// for the walker's lifetime, so a run of nearby offsets re-fetches only
/// leaves. Leaf payloads are not cached; a stream of segments would
/// otherwise pin the whole file in memory.
pub struct Walker {
    store: Arc<dyn BlockStore>,
    cache: HashMap<BlockId, Arc<DagNode>>,
}

impl Walker {
    pub fn new(store: Arc<dyn BlockStore>) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    /// Fetch and decode a block, verifying that its bytes hash to `id`.
    ///
    /// Store errors (including `NotFound`) surface unchanged; a hash
    /// mismatch or undecodable block is [`WalkError::CorruptDag`].
    pub async fn load(&self, id: &BlockId) -> WalkResult<DagNode> {
        let bytes = self.store.fetch(id).await?;
        let computed = BlockId::from_bytes(&bytes);
        if computed != *id {
            return Err(WalkError::corrupt(
                *id,
                format!("content hashes to {computed}, not the requested id"),
            ));
        }
        DagNode::decode(&bytes).map_err(|e| WalkError::corrupt(*id, e.to_string()))
    }

    /// Fetch via the interior-node cache.
    async fn node(&mut self, id: &BlockId) -> WalkResult<Arc<DagNode>> {
        if let Some(node) = self.cache.get(id) {
            return Ok(node.clone());
        }
        let node = Arc::new(self.load(id).await?);
        if matches!(*node, DagNode::Branch(_) | DagNode::Shard(_)) {
            self.cache.insert(*id, node.clone());
        }
        Ok(node)
    }

    /// Declared total size of the file stream rooted at `root`.
    pub async fn total_size(&mut self, root: &BlockId) -> WalkResult<u64> {
        let node = self.node(root).await?;
        match node.total_size() {
            Some(size) => Ok(size),
            None => match *node {
                DagNode::Shard(_) => Err(WalkError::NotAFile(*root)),
                _ => Err(WalkError::corrupt(*root, "child sizes overflow u64")),
            },
        }
    }

    /// Resolve an absolute stream offset to the leaf containing it.
    ///
    /// Descends from `root`, selecting at each branch the child whose
    /// cumulative size window covers the offset, until a leaf is reached.
    /// Cross-checks on the way down: a branch's child-size sum must equal
    /// the size its parent declared for it, and a leaf's actual length must
    /// equal its declared length.
    pub async fn resolve_offset(&mut self, root: &BlockId, offset: u64) -> WalkResult<LeafHit> {
        let total = self.total_size(root).await?;
        if offset >= total {
            return Err(WalkError::OutOfRange {
                offset,
                size: total,
            });
        }

        let mut id = *root;
        let mut node = self.node(&id).await?;
        // Absolute stream offset where the current subtree begins, and the
        // size its parent declared for it.
        let mut base = 0u64;
        let mut declared = total;

        loop {
            match &*node {
                DagNode::Leaf(leaf) => {
                    if leaf.len() != declared {
                        return Err(WalkError::corrupt(
                            id,
                            format!("leaf is {} bytes, declared {declared}", leaf.len()),
                        ));
                    }
                    debug!(
                        leaf = %id.short_hex(),
                        leaf_start = base,
                        offset_in_leaf = offset - base,
                        "resolved offset to leaf"
                    );
                    return Ok(LeafHit {
                        id,
                        data: Bytes::copy_from_slice(&leaf.data),
                        offset_in_leaf: offset - base,
                        leaf_start: base,
                    });
                }
                DagNode::Branch(branch) => {
                    let sum = branch
                        .total_size()
                        .ok_or_else(|| WalkError::corrupt(id, "child sizes overflow u64"))?;
                    if sum != declared {
                        return Err(WalkError::corrupt(
                            id,
                            format!("children sum to {sum} bytes, declared {declared}"),
                        ));
                    }
                    // Linear scan over cumulative child sizes. Deterministic,
                    // and branch fan-out is bounded by block size.
                    let rel = offset - base;
                    let mut cum = 0u64;
                    let mut selected = None;
                    for child in &branch.children {
                        if rel < cum + child.size {
                            selected = Some((child.id, cum, child.size));
                            break;
                        }
                        cum += child.size;
                    }
                    // The sum check above guarantees some child covers rel.
                    let (child_id, child_cum, child_size) = selected.ok_or_else(|| {
                        WalkError::corrupt(id, "no child covers an in-range offset")
                    })?;
                    debug!(
                        branch = %id.short_hex(),
                        child = %child_id.short_hex(),
                        child_base = base + child_cum,
                        "descending into child"
                    );
                    base += child_cum;
                    declared = child_size;
                    id = child_id;
                    node = self.node(&id).await?;
                }
                DagNode::Shard(_) => {
                    return Err(WalkError::corrupt(id, "shard node inside a file DAG"));
                }
            }
        }
    }

    /// Number of interior nodes currently cached.
    pub fn cached_nodes(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagway_store::fixtures::{pattern_byte, pattern_bytes, FileDagBuilder};
    use dagway_store::MemoryBlockStore;
    use dagway_types::{Branch, ChildLink, DagNode, Leaf};

    fn walker_over(store: MemoryBlockStore) -> Walker {
        Walker::new(Arc::new(store))
    }

    #[tokio::test]
    async fn resolves_offsets_across_leaves() {
        let store = MemoryBlockStore::new();
        let data = pattern_bytes(0, 10_000);
        let root = FileDagBuilder::new().leaf_size(256).build(&store, &data);
        let mut walker = walker_over(store);

        for offset in [0u64, 255, 256, 1000, 9_999] {
            let hit = walker.resolve_offset(&root, offset).await.unwrap();
            let byte = hit.data[hit.offset_in_leaf as usize];
            assert_eq!(byte, pattern_byte(offset), "offset {offset}");
            assert_eq!(hit.leaf_start + hit.offset_in_leaf, offset);
        }
    }

    #[tokio::test]
    async fn single_leaf_root_resolves() {
        let store = MemoryBlockStore::new();
        let root = store.put_node(&DagNode::Leaf(Leaf::new(pattern_bytes(0, 100))));
        let mut walker = walker_over(store);

        assert_eq!(walker.total_size(&root).await.unwrap(), 100);
        let hit = walker.resolve_offset(&root, 42).await.unwrap();
        assert_eq!(hit.offset_in_leaf, 42);
        assert_eq!(hit.leaf_start, 0);
    }

    #[tokio::test]
    async fn offset_at_total_size_is_out_of_range() {
        let store = MemoryBlockStore::new();
        let root = FileDagBuilder::new().build(&store, &pattern_bytes(0, 500));
        let mut walker = walker_over(store);

        let err = walker.resolve_offset(&root, 500).await.unwrap_err();
        assert!(matches!(
            err,
            WalkError::OutOfRange { offset: 500, size: 500 }
        ));
    }

    #[tokio::test]
    async fn huge_sparse_dag_resolves_exactly() {
        let store = MemoryBlockStore::new();
        let total = 87_186_935_127u64;
        let windows = [(2000u64, 3u64), (40_000_000_000, 3), (total - 2, 2)];
        let root = FileDagBuilder::new()
            .leaf_size(1 << 20)
            .fanout(256)
            .build_sparse(&store, total, &windows);
        let mut walker = walker_over(store);

        assert_eq!(walker.total_size(&root).await.unwrap(), total);
        for offset in [2000u64, 40_000_000_000, total - 1] {
            let hit = walker.resolve_offset(&root, offset).await.unwrap();
            assert_eq!(hit.leaf_start + hit.offset_in_leaf, offset);
            assert_eq!(
                hit.data[hit.offset_in_leaf as usize],
                pattern_byte(offset),
                "offset {offset}"
            );
        }
    }

    #[tokio::test]
    async fn missing_subtree_surfaces_not_found() {
        let store = MemoryBlockStore::new();
        let total = 1u64 << 32;
        let root = FileDagBuilder::new()
            .leaf_size(1 << 20)
            .fanout(16)
            .build_sparse(&store, total, &[(0, 1)]);
        let mut walker = walker_over(store);

        // Offset 0 is materialized; the far end is a hole.
        walker.resolve_offset(&root, 0).await.unwrap();
        let err = walker.resolve_offset(&root, total - 1).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn leaf_size_mismatch_is_corrupt() {
        let store = MemoryBlockStore::new();
        let leaf = store.put_node(&DagNode::Leaf(Leaf::new(vec![0u8; 10])));
        // Parent declares 20 bytes for a 10-byte leaf.
        let root = store.put_node(&DagNode::Branch(Branch::new(vec![ChildLink::new(
            leaf, 20,
        )])));
        let mut walker = walker_over(store);

        let err = walker.resolve_offset(&root, 15).await.unwrap_err();
        assert!(matches!(err, WalkError::CorruptDag { .. }), "{err}");
    }

    #[tokio::test]
    async fn branch_sum_mismatch_is_corrupt() {
        let store = MemoryBlockStore::new();
        let leaf = store.put_node(&DagNode::Leaf(Leaf::new(vec![0u8; 10])));
        let inner = store.put_node(&DagNode::Branch(Branch::new(vec![ChildLink::new(
            leaf, 10,
        )])));
        // Parent declares 25 for a subtree that sums to 10.
        let root = store.put_node(&DagNode::Branch(Branch::new(vec![ChildLink::new(
            inner, 25,
        )])));
        let mut walker = walker_over(store);

        let err = walker.resolve_offset(&root, 5).await.unwrap_err();
        assert!(matches!(err, WalkError::CorruptDag { .. }), "{err}");
    }

    #[tokio::test]
    async fn hash_mismatch_is_corrupt() {
        let store = MemoryBlockStore::new();
        let node = DagNode::Leaf(Leaf::new(b"real content".to_vec()));
        let id = node.id();
        store.put_raw(id, DagNode::Leaf(Leaf::new(b"swapped".to_vec())).encode());
        let walker = walker_over(store);

        let err = walker.load(&id).await.unwrap_err();
        assert!(matches!(err, WalkError::CorruptDag { .. }), "{err}");
    }

    #[tokio::test]
    async fn shard_root_is_not_a_file() {
        let store = MemoryBlockStore::new();
        let root = store.put_node(&DagNode::Shard(dagway_types::Shard::new(8, vec![])));
        let mut walker = walker_over(store);

        let err = walker.total_size(&root).await.unwrap_err();
        assert!(matches!(err, WalkError::NotAFile(_)));
    }

    #[tokio::test]
    async fn interior_nodes_are_cached_across_resolutions() {
        let store = MemoryBlockStore::new();
        let root = FileDagBuilder::new()
            .leaf_size(64)
            .build(&store, &pattern_bytes(0, 4096));
        let mut walker = walker_over(store);

        walker.resolve_offset(&root, 0).await.unwrap();
        let cached = walker.cached_nodes();
        assert!(cached > 0);
        // A nearby offset reuses the same ancestors.
        walker.resolve_offset(&root, 1).await.unwrap();
        assert_eq!(walker.cached_nodes(), cached);
    }
}
