//! Foundation types for dagway.
//!
//! This crate provides the data model shared by every other dagway crate:
//! content-addressed block identifiers, the closed DAG node variant, byte
//! ranges, and directory entries.
//!
//! # Key Types
//!
//! - [`BlockId`] — content-addressed identifier (BLAKE3 hash of a block's
//!   serialized bytes)
//! - [`DagNode`] — closed tagged variant: Leaf / Branch / Shard
//! - [`ByteRange`] / [`RangeSet`] — caller-ordered byte ranges; the set is
//!   never sorted, merged, or deduplicated
//! - [`ResolvedSegment`] — one contiguous read unit within a single leaf
//! - [`DirectoryEntry`] — one listed entry of a sharded directory

pub mod block;
pub mod entry;
pub mod error;
pub mod node;
pub mod range;

pub use block::BlockId;
pub use entry::{DirectoryEntry, EntryType};
pub use error::TypeError;
pub use node::{Branch, ChildLink, DagNode, Leaf, Shard, ShardSlot, SlotValue};
pub use range::{ByteRange, RangeSet, ResolvedSegment};
