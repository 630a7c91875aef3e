//! Test fixture builders.
//!
//! The read path cannot be exercised without DAGs to read, and generating
//! DAGs is otherwise out of scope, so this module carries the minimal write
//! helpers the workspace's tests share. None of this is a production write
//! path.
//!
//! [`FileDagBuilder::build_sparse`] is the interesting one: it materializes
//! a file DAG with an arbitrarily large *declared* size while only storing
//! the blocks on paths to requested byte windows. Subtrees outside every
//! window get placeholder ids that resolve to `NotFound`, which is exactly
//! how a network-fed cache looks after a partial fill.

use dagway_types::{
    BlockId, Branch, ChildLink, DagNode, EntryType, Leaf, Shard, ShardSlot, SlotValue,
};

use crate::memory::MemoryBlockStore;

/// Deterministic payload byte at an absolute stream offset.
///
/// Tests use this to check resolved bytes against expected stream content
/// without holding the stream in memory.
pub fn pattern_byte(offset: u64) -> u8 {
    (offset % 251) as u8
}

/// Deterministic payload for `[offset, offset + len)`.
pub fn pattern_bytes(offset: u64, len: u64) -> Vec<u8> {
    (offset..offset + len).map(pattern_byte).collect()
}

/// Builds leaf/branch file DAGs into a [`MemoryBlockStore`].
#[derive(Clone, Copy, Debug)]
pub struct FileDagBuilder {
    leaf_size: u64,
    fanout: u64,
}

impl FileDagBuilder {
    pub fn new() -> Self {
        Self {
            leaf_size: 1024,
            fanout: 4,
        }
    }

    /// Maximum bytes per leaf block.
    pub fn leaf_size(mut self, leaf_size: u64) -> Self {
        assert!(leaf_size > 0, "leaf size must be positive");
        self.leaf_size = leaf_size;
        self
    }

    /// Maximum children per branch node.
    pub fn fanout(mut self, fanout: u64) -> Self {
        assert!(fanout > 1, "fanout must be at least 2");
        self.fanout = fanout;
        self
    }

    /// Build a fully materialized DAG holding `data`. Returns the root id.
    pub fn build(&self, store: &MemoryBlockStore, data: &[u8]) -> BlockId {
        self.build_node(
            store,
            0,
            data.len() as u64,
            &|_, _| true,
            &|offset, len| data[offset as usize..(offset + len) as usize].to_vec(),
        )
    }

    /// Build a DAG with declared total size `total_size` whose payload is
    /// [`pattern_bytes`], materializing only subtrees that intersect one of
    /// the `windows` (`(offset, len)` pairs). Everything else is a
    /// placeholder id absent from the store.
    pub fn build_sparse(
        &self,
        store: &MemoryBlockStore,
        total_size: u64,
        windows: &[(u64, u64)],
    ) -> BlockId {
        self.build_node(
            store,
            0,
            total_size,
            &|offset, len| intersects(windows, offset, len),
            &pattern_bytes,
        )
    }

    /// Recursively build the node covering `[base, base + size)`. `wanted`
    /// decides whether a child subtree is materialized or left as a hole;
    /// `payload` supplies leaf bytes. The node this is called on is always
    /// materialized (the root must exist for any request to start).
    fn build_node(
        &self,
        store: &MemoryBlockStore,
        base: u64,
        size: u64,
        wanted: &dyn Fn(u64, u64) -> bool,
        payload: &dyn Fn(u64, u64) -> Vec<u8>,
    ) -> BlockId {
        if size <= self.leaf_size {
            return store.put_node(&DagNode::Leaf(Leaf::new(payload(base, size))));
        }

        // Smallest power-of-fanout span so this node needs at most
        // `fanout` children.
        let mut child_span = self.leaf_size;
        while child_span < u64::MAX / self.fanout && child_span * self.fanout < size {
            child_span *= self.fanout;
        }

        let mut children = Vec::new();
        let mut off = 0u64;
        while off < size {
            let child_size = child_span.min(size - off);
            let child_base = base + off;
            let id = if wanted(child_base, child_size) {
                self.build_node(store, child_base, child_size, wanted, payload)
            } else {
                hole_id(child_base, child_size)
            };
            children.push(ChildLink::new(id, child_size));
            off += child_size;
        }
        store.put_node(&DagNode::Branch(Branch::new(children)))
    }
}

impl Default for FileDagBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic id for a deliberately absent subtree.
fn hole_id(base: u64, size: u64) -> BlockId {
    BlockId::from_bytes(format!("dagway-fixture-hole:{base}:{size}").as_bytes())
}

fn intersects(windows: &[(u64, u64)], offset: u64, len: u64) -> bool {
    windows.iter().any(|&(w_off, w_len)| {
        offset < w_off.saturating_add(w_len) && w_off < offset.saturating_add(len)
    })
}

/// Builds HAMT-sharded directories into a [`MemoryBlockStore`].
///
/// Entries are assigned to slots by the BLAKE3 hash of the entry name,
/// consumed `bit_width` bits per level, most significant bits first. The
/// full name is carried as the terminal slot's fragment; interior slots
/// contribute empty fragments.
#[derive(Clone, Copy, Debug)]
pub struct HamtBuilder {
    bit_width: u32,
}

impl HamtBuilder {
    pub fn new() -> Self {
        Self {
            bit_width: Shard::DEFAULT_BIT_WIDTH,
        }
    }

    pub fn bit_width(mut self, bit_width: u32) -> Self {
        assert!((1..=16).contains(&bit_width), "bit width out of range");
        self.bit_width = bit_width;
        self
    }

    /// Build a sharded directory from `entries`. Only shard nodes are
    /// written; entry targets are left untouched (and typically absent).
    /// Returns the root shard id. Names must be unique.
    pub fn build(
        &self,
        store: &MemoryBlockStore,
        entries: &[(String, BlockId, EntryType)],
    ) -> BlockId {
        self.build_level(store, entries, 0)
    }

    fn build_level(
        &self,
        store: &MemoryBlockStore,
        entries: &[(String, BlockId, EntryType)],
        depth: u32,
    ) -> BlockId {
        let max_depth = 256 / self.bit_width;
        assert!(depth < max_depth, "hash exhausted: duplicate entry names?");

        let mut by_slot: Vec<(u32, Vec<&(String, BlockId, EntryType)>)> = Vec::new();
        for entry in entries {
            let slot = slot_of(
                blake3::hash(entry.0.as_bytes()).as_bytes(),
                depth,
                self.bit_width,
            );
            match by_slot.iter_mut().find(|(idx, _)| *idx == slot) {
                Some((_, group)) => group.push(entry),
                None => by_slot.push((slot, vec![entry])),
            }
        }
        by_slot.sort_by_key(|(idx, _)| *idx);

        let slots = by_slot
            .into_iter()
            .map(|(index, group)| {
                if let [(name, target, entry_type)] = group.as_slice() {
                    ShardSlot {
                        index,
                        fragment: name.clone(),
                        value: SlotValue::Entry {
                            target: *target,
                            entry_type: *entry_type,
                        },
                    }
                } else {
                    let owned: Vec<(String, BlockId, EntryType)> =
                        group.into_iter().cloned().collect();
                    let child = self.build_level(store, &owned, depth + 1);
                    ShardSlot {
                        index,
                        fragment: String::new(),
                        value: SlotValue::Child(child),
                    }
                }
            })
            .collect();

        store.put_node(&DagNode::Shard(Shard::new(self.bit_width, slots)))
    }
}

impl Default for HamtBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Slot index for `hash` at `depth`, taking `bit_width` bits per level
/// starting from the most significant bit of byte 0.
fn slot_of(hash: &[u8; 32], depth: u32, bit_width: u32) -> u32 {
    let start = depth as usize * bit_width as usize;
    let mut slot = 0u32;
    for i in 0..bit_width as usize {
        let bit = start + i;
        let byte = hash[bit / 8];
        let b = (byte >> (7 - (bit % 8))) & 1;
        slot = (slot << 1) | u32::from(b);
    }
    slot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::BlockStore;

    #[test]
    fn pattern_is_deterministic() {
        assert_eq!(pattern_bytes(0, 4), pattern_bytes(0, 4));
        assert_eq!(pattern_byte(251), pattern_byte(0));
    }

    #[tokio::test]
    async fn full_build_stores_all_bytes() {
        let store = MemoryBlockStore::new();
        let data = pattern_bytes(0, 10_000);
        let root = FileDagBuilder::new().leaf_size(256).build(&store, &data);

        let bytes = store.fetch(&root).await.unwrap();
        let node = DagNode::decode(&bytes).unwrap();
        assert_eq!(node.total_size(), Some(10_000));
    }

    #[tokio::test]
    async fn sparse_build_declares_full_size() {
        let store = MemoryBlockStore::new();
        let total = 87_186_935_127u64;
        let root = FileDagBuilder::new()
            .leaf_size(1 << 20)
            .fanout(256)
            .build_sparse(&store, total, &[(2000, 3)]);

        let bytes = store.fetch(&root).await.unwrap();
        let node = DagNode::decode(&bytes).unwrap();
        assert_eq!(node.total_size(), Some(total));
        // Only the root and the single materialized path exist.
        assert!(store.len() < 16, "sparse build stored {} blocks", store.len());
    }

    #[test]
    fn slot_of_consumes_msb_first() {
        let mut hash = [0u8; 32];
        hash[0] = 0b1010_0000;
        assert_eq!(slot_of(&hash, 0, 8), 0b1010_0000);
        assert_eq!(slot_of(&hash, 0, 4), 0b1010);
        assert_eq!(slot_of(&hash, 1, 4), 0);
    }

    #[test]
    fn hamt_build_writes_only_shards() {
        let store = MemoryBlockStore::new();
        let entries: Vec<(String, BlockId, EntryType)> = (0..100)
            .map(|i| {
                (
                    format!("file-{i:04}.dat"),
                    BlockId::from_bytes(format!("target-{i}").as_bytes()),
                    EntryType::File,
                )
            })
            .collect();
        let root = HamtBuilder::new().build(&store, &entries);

        assert!(store.contains(&root));
        // No entry target was written.
        for (_, target, _) in &entries {
            assert!(!store.contains(target));
        }
    }
}
