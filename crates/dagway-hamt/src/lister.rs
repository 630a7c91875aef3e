use tracing::debug;

use dagway_types::{BlockId, DagNode, DirectoryEntry, Shard, SlotValue};
use dagway_walk::{WalkError, Walker};

use crate::error::{ListError, ListResult};

/// Shard levels cannot outrun the 256-bit name hash.
fn max_depth(bit_width: u32) -> u32 {
    256 / bit_width
}

/// List the full contents of the sharded directory rooted at `root`.
///
/// Visits every occupied slot at every reachable level, fetching only shard
/// nodes. Each terminal slot yields one [`DirectoryEntry`] whose name is
/// the concatenation of the fragments along its path; targets are never
/// fetched. The listing is buffered to completion: any shard fetch failure
/// aborts the whole listing with [`ListError::TraversalIncomplete`].
///
/// Entry order follows slot-table order within a shard but is otherwise a
/// traversal artifact; callers needing a specific order sort the result.
pub async fn list_directory(walker: &Walker, root: &BlockId) -> ListResult<Vec<DirectoryEntry>> {
    let node = load_shard_block(walker, root).await?;
    let DagNode::Shard(shard) = node else {
        return Err(ListError::NotADirectory(*root));
    };

    let mut entries = Vec::new();
    // Pending child shards: (id, name prefix so far, depth).
    let mut pending: Vec<(BlockId, String, u32)> = Vec::new();
    visit_shard(*root, &shard, "", 0, &mut entries, &mut pending)?;

    while let Some((id, prefix, depth)) = pending.pop() {
        let node = load_shard_block(walker, &id).await?;
        let DagNode::Shard(shard) = node else {
            return Err(ListError::corrupt(id, "child reference is not a shard"));
        };
        visit_shard(id, &shard, &prefix, depth, &mut entries, &mut pending)?;
    }

    debug!(root = %root.short_hex(), entries = entries.len(), "directory listed");
    Ok(entries)
}

async fn load_shard_block(walker: &Walker, id: &BlockId) -> ListResult<DagNode> {
    walker.load(id).await.map_err(|e| match e {
        WalkError::CorruptDag { id, reason } => ListError::CorruptShard { id, reason },
        other => ListError::TraversalIncomplete {
            missing: *id,
            reason: other.to_string(),
        },
    })
}

/// Walk one shard's slot table: yield terminal entries, queue child shards.
fn visit_shard(
    id: BlockId,
    shard: &Shard,
    prefix: &str,
    depth: u32,
    entries: &mut Vec<DirectoryEntry>,
    pending: &mut Vec<(BlockId, String, u32)>,
) -> ListResult<()> {
    if shard.bit_width == 0 || shard.bit_width > 16 {
        return Err(ListError::corrupt(
            id,
            format!("bit width {} out of range", shard.bit_width),
        ));
    }
    if depth >= max_depth(shard.bit_width) {
        return Err(ListError::corrupt(id, "shard deeper than the name hash"));
    }

    let fanout = shard.fanout();
    let mut last_index: Option<u32> = None;
    for slot in &shard.slots {
        if u64::from(slot.index) >= fanout {
            return Err(ListError::corrupt(
                id,
                format!("slot index {} out of range for fanout {fanout}", slot.index),
            ));
        }
        if last_index.is_some_and(|prev| slot.index <= prev) {
            return Err(ListError::corrupt(
                id,
                format!("slot indexes not strictly ascending at {}", slot.index),
            ));
        }
        last_index = Some(slot.index);

        let name = format!("{prefix}{}", slot.fragment);
        match &slot.value {
            SlotValue::Entry { target, entry_type } => {
                entries.push(DirectoryEntry::new(name, *target, *entry_type));
            }
            SlotValue::Child(child) => pending.push((*child, name, depth + 1)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use dagway_store::fixtures::HamtBuilder;
    use dagway_store::{BlockStore, MemoryBlockStore, StoreError};
    use dagway_types::{EntryType, Leaf, ShardSlot};

    fn entry(i: usize) -> (String, BlockId, EntryType) {
        (
            format!("entry-{i:05}.bin"),
            BlockId::from_bytes(format!("target-{i}").as_bytes()),
            EntryType::File,
        )
    }

    #[tokio::test]
    async fn lists_small_directory() {
        let store = MemoryBlockStore::new();
        let entries: Vec<_> = (0..25).map(entry).collect();
        let root = HamtBuilder::new().build(&store, &entries);
        let walker = Walker::new(Arc::new(store));

        let mut listed = list_directory(&walker, &root).await.unwrap();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(listed.len(), 25);
        for (i, got) in listed.iter().enumerate() {
            let (name, target, entry_type) = entry(i);
            assert_eq!(got.name, name);
            assert_eq!(got.target, target);
            assert_eq!(got.entry_type, entry_type);
        }
    }

    #[tokio::test]
    async fn lists_ten_thousand_entries_without_targets() {
        let store = MemoryBlockStore::new();
        let entries: Vec<_> = (0..10_000).map(entry).collect();
        let root = HamtBuilder::new().build(&store, &entries);
        // Entry targets were never written; only shard nodes exist.
        let store = Arc::new(store);
        let walker = Walker::new(store.clone());

        let listed = list_directory(&walker, &root).await.unwrap();
        assert_eq!(listed.len(), 10_000);

        let names: HashSet<&str> = listed.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.len(), 10_000, "duplicate names in listing");

        // Any listed target is absent from the store.
        let probe = &listed[4_321];
        let err = store.fetch(&probe.target).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn names_concatenate_fragments_along_the_path() {
        let store = MemoryBlockStore::new();
        let target = BlockId::from_bytes(b"t");
        let inner = store.put_node(&DagNode::Shard(Shard::new(
            8,
            vec![ShardSlot {
                index: 7,
                fragment: "cdef.txt".into(),
                value: SlotValue::Entry {
                    target,
                    entry_type: EntryType::File,
                },
            }],
        )));
        let root = store.put_node(&DagNode::Shard(Shard::new(
            8,
            vec![ShardSlot {
                index: 0,
                fragment: "ab".into(),
                value: SlotValue::Child(inner),
            }],
        )));
        let walker = Walker::new(Arc::new(store));

        let listed = list_directory(&walker, &root).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "abcdef.txt");
    }

    #[tokio::test]
    async fn missing_child_shard_fails_whole_listing() {
        let store = MemoryBlockStore::new();
        let entries: Vec<_> = (0..2_000).map(entry).collect();
        let root = HamtBuilder::new().bit_width(4).build(&store, &entries);

        // Drop one shard block. With fan-out 16 and 2000 entries the root's
        // children are all shards; remove the first one we can find.
        let root_node = {
            let raw = store.fetch(&root).await.unwrap();
            DagNode::decode(&raw).unwrap()
        };
        let DagNode::Shard(shard) = root_node else {
            panic!("root is not a shard")
        };
        let child = shard
            .slots
            .iter()
            .find_map(|s| match &s.value {
                SlotValue::Child(id) => Some(*id),
                _ => None,
            })
            .expect("directory this size must have child shards");
        assert!(store.remove(&child));

        let walker = Walker::new(Arc::new(store));
        let err = list_directory(&walker, &root).await.unwrap_err();
        assert!(
            matches!(err, ListError::TraversalIncomplete { missing, .. } if missing == child),
            "{err}"
        );
    }

    #[tokio::test]
    async fn leaf_root_is_not_a_directory() {
        let store = MemoryBlockStore::new();
        let root = store.put_node(&DagNode::Leaf(Leaf::new(b"bytes".to_vec())));
        let walker = Walker::new(Arc::new(store));

        let err = list_directory(&walker, &root).await.unwrap_err();
        assert!(matches!(err, ListError::NotADirectory(id) if id == root));
    }

    #[tokio::test]
    async fn out_of_range_slot_index_is_corrupt() {
        let store = MemoryBlockStore::new();
        let root = store.put_node(&DagNode::Shard(Shard::new(
            4,
            vec![ShardSlot {
                index: 16,
                fragment: "x".into(),
                value: SlotValue::Entry {
                    target: BlockId::from_bytes(b"t"),
                    entry_type: EntryType::File,
                },
            }],
        )));
        let walker = Walker::new(Arc::new(store));

        let err = list_directory(&walker, &root).await.unwrap_err();
        assert!(matches!(err, ListError::CorruptShard { .. }), "{err}");
    }

    #[tokio::test]
    async fn descending_slot_indexes_are_corrupt() {
        let store = MemoryBlockStore::new();
        let slot = |index: u32| ShardSlot {
            index,
            fragment: format!("f{index}"),
            value: SlotValue::Entry {
                target: BlockId::from_bytes(b"t"),
                entry_type: EntryType::File,
            },
        };
        let root = store.put_node(&DagNode::Shard(Shard::new(8, vec![slot(9), slot(3)])));
        let walker = Walker::new(Arc::new(store));

        let err = list_directory(&walker, &root).await.unwrap_err();
        assert!(matches!(err, ListError::CorruptShard { .. }), "{err}");
    }

    #[tokio::test]
    async fn listing_is_idempotent() {
        let store = MemoryBlockStore::new();
        let entries: Vec<_> = (0..500).map(entry).collect();
        let root = HamtBuilder::new().build(&store, &entries);
        let walker = Walker::new(Arc::new(store));

        let first = list_directory(&walker, &root).await.unwrap();
        let second = list_directory(&walker, &root).await.unwrap();
        assert_eq!(first, second);
    }
}
