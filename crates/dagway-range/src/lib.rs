//! File range resolution.
//!
//! Turns a caller-ordered [`RangeSet`] into a lazy sequence of block-level
//! segments. Three stages, all order-preserving:
//!
//! 1. [`parse_range_header`] — the textual `bytes=a-b, c-d, e-` form into a
//!    [`RangeSet`].
//! 2. [`validate`] — each range checked against the stream's declared total
//!    size: ranges starting at or beyond it are unsatisfiable, ranges ending
//!    beyond it are clamped.
//! 3. [`SegmentStream`] — pull-based resolution of one validated range into
//!    segments, one per leaf crossed. Fetches happen only as segments are
//!    pulled, so a missing block at segment N is observed exactly when N is
//!    consumed, never earlier.
//!
//! [`RangeSet`]: dagway_types::RangeSet

pub mod error;
pub mod parse;
pub mod resolver;

pub use error::{RangeError, RangeResult};
pub use parse::parse_range_header;
pub use resolver::{validate, ClampedRange, Segment, SegmentStream};
