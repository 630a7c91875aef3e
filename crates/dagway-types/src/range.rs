//! Byte ranges and resolved segments.
//!
//! Ranges are half-open internally (`end` exclusive); the textual
//! `bytes=a-b` form with its inclusive end is converted at the parsing
//! boundary. A [`RangeSet`] preserves caller order exactly — the core never
//! sorts, merges, or deduplicates it, because response parts must appear in
//! the order the client asked for them.

use serde::{Deserialize, Serialize};

use crate::block::BlockId;

/// One requested byte range. `end` is exclusive; `None` means "to end of
/// stream".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    /// A bounded range `[start, end)`.
    pub fn bounded(start: u64, end: u64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// An open range from `start` to the end of the stream.
    pub fn to_end(start: u64) -> Self {
        Self { start, end: None }
    }

    /// Length if bounded.
    pub fn len(&self) -> Option<u64> {
        self.end.map(|end| end.saturating_sub(self.start))
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

/// An ordered sequence of byte ranges, exactly as the caller supplied them.
///
/// Order is significant: a later range may address an earlier offset and
/// must still be served after the ranges before it. This type deliberately
/// exposes no sorting or merging.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RangeSet(Vec<ByteRange>);

impl RangeSet {
    pub fn new(ranges: Vec<ByteRange>) -> Self {
        Self(ranges)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ranges in caller order.
    pub fn iter(&self) -> impl Iterator<Item = &ByteRange> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ByteRange] {
        &self.0
    }
}

impl From<Vec<ByteRange>> for RangeSet {
    fn from(ranges: Vec<ByteRange>) -> Self {
        Self(ranges)
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type Item = &'a ByteRange;
    type IntoIter = std::slice::Iter<'a, ByteRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One contiguous read unit: a slice of a single leaf block satisfying part
/// of a requested range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSegment {
    /// The leaf block holding the bytes.
    pub leaf: BlockId,
    /// Offset of the first wanted byte within the leaf.
    pub offset_in_leaf: u64,
    /// Number of wanted bytes in this leaf.
    pub length: u64,
    /// Absolute offset of the first byte within the whole stream.
    pub stream_offset: u64,
}
