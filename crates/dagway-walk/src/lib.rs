//! Lazy Merkle DAG traversal.
//!
//! [`Walker`] turns absolute stream offsets into leaf blocks by descending
//! branch nodes along a single path, fetching nothing outside that path.
//! Declared subtree sizes are trusted for navigation and cross-checked
//! opportunistically against what is actually fetched; any disagreement is
//! structural corruption and terminates the walk.
//!
//! A walker is request-scoped: it keeps a small cache of interior nodes so
//! nearby resolutions within one request reuse already-fetched ancestors,
//! and it is dropped with the request.

pub mod error;
pub mod walker;

pub use error::{WalkError, WalkResult};
pub use walker::{LeafHit, Walker};
