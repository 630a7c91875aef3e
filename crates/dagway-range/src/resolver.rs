//! Range validation and lazy segment resolution.

use bytes::Bytes;
use tracing::debug;

use dagway_types::{BlockId, ByteRange, RangeSet, ResolvedSegment};
use dagway_walk::Walker;

use crate::error::{RangeError, RangeResult};

/// A requested range after validation: half-open, in-bounds, non-empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClampedRange {
    pub start: u64,
    /// Exclusive end, at most the stream's total size.
    pub end: u64,
}

impl ClampedRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Inclusive last byte, as printed in `Content-Range` descriptors.
    pub fn last_byte(&self) -> u64 {
        self.end - 1
    }
}

/// Validate a range set against a stream's declared total size.
///
/// Each range is checked independently, in caller order: a range ending
/// beyond the total is clamped to it; a range starting at or beyond the
/// total (or empty after clamping) is dropped as unsatisfiable. If *no*
/// range survives, the whole request is [`RangeError::NotSatisfiable`].
/// Surviving ranges keep their caller order.
pub fn validate(ranges: &RangeSet, total: u64) -> RangeResult<Vec<ClampedRange>> {
    let mut clamped = Vec::with_capacity(ranges.len());
    let mut first_failed = None;

    for range in ranges {
        match clamp(range, total) {
            Some(c) => clamped.push(c),
            None => {
                first_failed.get_or_insert(range.start);
            }
        }
    }

    if clamped.is_empty() {
        return Err(RangeError::NotSatisfiable {
            start: first_failed.unwrap_or(0),
            total,
        });
    }
    Ok(clamped)
}

fn clamp(range: &ByteRange, total: u64) -> Option<ClampedRange> {
    if range.start >= total {
        return None;
    }
    let end = range.end.map_or(total, |end| end.min(total));
    if end <= range.start {
        return None;
    }
    Some(ClampedRange {
        start: range.start,
        end,
    })
}

/// One resolved segment with its payload bytes.
#[derive(Clone, Debug)]
pub struct Segment {
    pub resolved: ResolvedSegment,
    pub data: Bytes,
}

/// Pull-based segment resolution for one validated range.
///
/// Each `next()` call resolves the cursor to a leaf, emits the covered
/// slice, and advances — one segment per leaf crossed. Nothing beyond the
/// cursor is fetched, so a missing block surfaces on the pull that needs
/// it, after earlier segments were already handed out. After an error the
/// stream is exhausted.
pub struct SegmentStream<'w> {
    walker: &'w mut Walker,
    root: BlockId,
    cursor: u64,
    end: u64,
}

impl<'w> SegmentStream<'w> {
    pub fn new(walker: &'w mut Walker, root: BlockId, range: ClampedRange) -> Self {
        Self {
            walker,
            root,
            cursor: range.start,
            end: range.end,
        }
    }

    /// Bytes not yet resolved.
    pub fn remaining(&self) -> u64 {
        self.end - self.cursor
    }

    /// Resolve and return the next segment, or `None` when the range is
    /// fully resolved.
    pub async fn next(&mut self) -> Option<RangeResult<Segment>> {
        if self.cursor >= self.end {
            return None;
        }

        let hit = match self.walker.resolve_offset(&self.root, self.cursor).await {
            Ok(hit) => hit,
            Err(e) => {
                // Exhaust the stream; a failed range never resumes.
                self.cursor = self.end;
                return Some(Err(e.into()));
            }
        };

        let available = hit.len() - hit.offset_in_leaf;
        let take = available.min(self.end - self.cursor);
        let from = hit.offset_in_leaf as usize;
        let data = hit.data.slice(from..from + take as usize);

        let segment = Segment {
            resolved: ResolvedSegment {
                leaf: hit.id,
                offset_in_leaf: hit.offset_in_leaf,
                length: take,
                stream_offset: self.cursor,
            },
            data,
        };
        debug!(
            leaf = %hit.id.short_hex(),
            stream_offset = self.cursor,
            length = take,
            "resolved segment"
        );
        self.cursor += take;
        Some(Ok(segment))
    }
}
