//! Textual range-set parsing.

use dagway_types::{ByteRange, RangeSet};

use crate::error::{RangeError, RangeResult};

/// Parse the textual byte-range request form: `bytes=a-b, c-d, e-`.
///
/// `a-b` has an inclusive end (converted to the half-open internal form);
/// `e-` runs to the end of the stream. Ranges come back in exactly the
/// order written — never sorted, merged, or deduplicated. Suffix ranges
/// (`-n`) and anything else unparseable are [`RangeError::Malformed`].
pub fn parse_range_header(header: &str) -> RangeResult<RangeSet> {
    let spec = header
        .trim()
        .strip_prefix("bytes=")
        .ok_or_else(|| malformed(header, "missing bytes= prefix"))?;

    let mut ranges = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(malformed(header, "empty range"));
        }
        let (start_str, end_str) = part
            .split_once('-')
            .ok_or_else(|| malformed(header, "missing '-'"))?;
        if start_str.is_empty() {
            // Suffix form (-n): not produced by this core's callers.
            return Err(malformed(header, "suffix ranges not supported"));
        }
        let start: u64 = start_str
            .trim()
            .parse()
            .map_err(|_| malformed(header, "bad start"))?;

        let end_str = end_str.trim();
        if end_str.is_empty() {
            ranges.push(ByteRange::to_end(start));
            continue;
        }
        let last: u64 = end_str.parse().map_err(|_| malformed(header, "bad end"))?;
        if last < start {
            return Err(malformed(header, "end before start"));
        }
        let end = last
            .checked_add(1)
            .ok_or_else(|| malformed(header, "range end overflows"))?;
        ranges.push(ByteRange::bounded(start, end));
    }

    if ranges.is_empty() {
        return Err(malformed(header, "no ranges"));
    }
    Ok(RangeSet::new(ranges))
}

fn malformed(header: &str, reason: &str) -> RangeError {
    RangeError::Malformed(format!("{reason}: {header:?}"))
}
