//! DAG node types.
//!
//! Every block in a dagway DAG decodes to exactly one [`DagNode`]. The node
//! set is closed: a node is a [`Leaf`] (raw file bytes), a [`Branch`]
//! (ordered children with declared subtree sizes), or a [`Shard`] (one level
//! of a hash-array-mapped-trie holding directory entries). Consumers match
//! exhaustively; there is no open hierarchy to extend.

use serde::{Deserialize, Serialize};

use crate::block::BlockId;
use crate::entry::EntryType;
use crate::error::TypeError;

/// A node in a content-addressed DAG.
///
/// Nodes are immutable once encoded — the block store addresses them by the
/// hash of their serialized form, so any mutation would be a different node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DagNode {
    /// Raw file bytes with no children.
    Leaf(Leaf),
    /// An interior file node: ordered children, each with a declared
    /// subtree byte length.
    Branch(Branch),
    /// One level of a sharded directory.
    Shard(Shard),
}

impl DagNode {
    /// Serialize this node into block bytes.
    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).expect("node serialization cannot fail")
    }

    /// Decode block bytes into a node.
    pub fn decode(bytes: &[u8]) -> Result<Self, TypeError> {
        bincode::deserialize(bytes).map_err(|e| TypeError::Decode(e.to_string()))
    }

    /// The content id this node encodes to.
    pub fn id(&self) -> BlockId {
        BlockId::from_bytes(&self.encode())
    }

    /// Total byte length of the file stream rooted at this node.
    ///
    /// Returns `None` for shard nodes (directories are not byte streams)
    /// and when a branch's child sizes overflow `u64`, which callers treat
    /// as structural corruption.
    pub fn total_size(&self) -> Option<u64> {
        match self {
            DagNode::Leaf(leaf) => Some(leaf.data.len() as u64),
            DagNode::Branch(branch) => branch.total_size(),
            DagNode::Shard(_) => None,
        }
    }

    /// Short tag for error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DagNode::Leaf(_) => "leaf",
            DagNode::Branch(_) => "branch",
            DagNode::Shard(_) => "shard",
        }
    }
}

/// Raw file bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    pub data: Vec<u8>,
}

impl Leaf {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// An interior file node.
///
/// Children are ordered; each link declares the byte length of the subtree
/// it points to, which is what lets a walker pick the child containing an
/// absolute offset without fetching the child first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub children: Vec<ChildLink>,
}

impl Branch {
    pub fn new(children: Vec<ChildLink>) -> Self {
        Self { children }
    }

    /// Sum of declared child sizes, `None` on u64 overflow.
    pub fn total_size(&self) -> Option<u64> {
        self.children
            .iter()
            .try_fold(0u64, |acc, child| acc.checked_add(child.size))
    }
}

/// A link from a branch to one child subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildLink {
    pub id: BlockId,
    /// Declared byte length of the subtree behind `id`.
    pub size: u64,
}

impl ChildLink {
    pub fn new(id: BlockId, size: u64) -> Self {
        Self { id, size }
    }
}

/// One level of a hash-array-mapped-trie directory.
///
/// The slot table has `2^bit_width` logical slots; only occupied slots are
/// stored, in ascending slot-index order. Entries are assigned to slots by
/// the BLAKE3 hash of the entry name, consumed `bit_width` bits per level,
/// most significant bits first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    /// Bits of the name hash consumed at this level. Fan-out is
    /// `2^bit_width`; the default is 8 (256 slots).
    pub bit_width: u32,
    /// Occupied slots in ascending index order.
    pub slots: Vec<ShardSlot>,
}

impl Shard {
    pub const DEFAULT_BIT_WIDTH: u32 = 8;

    pub fn new(bit_width: u32, slots: Vec<ShardSlot>) -> Self {
        Self { bit_width, slots }
    }

    /// Number of logical slots at this level.
    pub fn fanout(&self) -> u64 {
        1u64 << self.bit_width
    }
}

/// One occupied slot of a shard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardSlot {
    pub index: u32,
    /// Name fragment this level contributes. A listed entry's name is the
    /// concatenation of fragments along the path to its terminal slot.
    pub fragment: String,
    pub value: SlotValue,
}

/// What an occupied slot holds: a terminal entry or a child shard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotValue {
    /// Terminal entry. Listing never fetches `target`.
    Entry { target: BlockId, entry_type: EntryType },
    /// Reference to the next shard level.
    Child(BlockId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_branch() -> Branch {
        Branch::new(vec![
            ChildLink::new(BlockId::from_bytes(b"a"), 100),
            ChildLink::new(BlockId::from_bytes(b"b"), 250),
            ChildLink::new(BlockId::from_bytes(b"c"), 7),
        ])
    }

    #[test]
    fn leaf_size_is_data_length() {
        let node = DagNode::Leaf(Leaf::new(vec![0u8; 42]));
        assert_eq!(node.total_size(), Some(42));
    }

    #[test]
    fn branch_size_sums_children() {
        let node = DagNode::Branch(sample_branch());
        assert_eq!(node.total_size(), Some(357));
    }

    #[test]
    fn branch_size_overflow_is_none() {
        let node = DagNode::Branch(Branch::new(vec![
            ChildLink::new(BlockId::from_bytes(b"a"), u64::MAX),
            ChildLink::new(BlockId::from_bytes(b"b"), 1),
        ]));
        assert_eq!(node.total_size(), None);
    }

    #[test]
    fn shard_has_no_stream_size() {
        let node = DagNode::Shard(Shard::new(Shard::DEFAULT_BIT_WIDTH, vec![]));
        assert_eq!(node.total_size(), None);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let node = DagNode::Branch(sample_branch());
        let bytes = node.encode();
        let decoded = DagNode::decode(&bytes).unwrap();
        assert_eq!(node, decoded);
    }

    #[test]
    fn id_matches_encoded_bytes() {
        let node = DagNode::Leaf(Leaf::new(b"hello".to_vec()));
        assert_eq!(node.id(), BlockId::from_bytes(&node.encode()));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(DagNode::decode(&[0xff; 3]).is_err());
    }

    #[test]
    fn shard_slot_roundtrip() {
        let node = DagNode::Shard(Shard::new(
            8,
            vec![
                ShardSlot {
                    index: 3,
                    fragment: "file.txt".into(),
                    value: SlotValue::Entry {
                        target: BlockId::from_bytes(b"t"),
                        entry_type: EntryType::File,
                    },
                },
                ShardSlot {
                    index: 200,
                    fragment: String::new(),
                    value: SlotValue::Child(BlockId::from_bytes(b"c")),
                },
            ],
        ));
        let decoded = DagNode::decode(&node.encode()).unwrap();
        assert_eq!(node, decoded);
    }
}
