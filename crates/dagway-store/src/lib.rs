//! Block store seam for dagway.
//!
//! The whole read path depends on exactly one storage primitive:
//! [`BlockStore::fetch`]. Everything else — network transports, on-disk
//! persistence, population and eviction policy — lives behind that trait,
//! outside this workspace. A partially populated store is the *normal*
//! operating condition: callers must expect [`StoreError::NotFound`] for
//! any block at any time.
//!
//! # Backends
//!
//! - [`MemoryBlockStore`] — `HashMap`-based store for tests and embedding.
//!
//! # Design Rules
//!
//! 1. Blocks are immutable and content-addressed; the store never
//!    interprets block contents.
//! 2. This workspace never writes to a production store — the only write
//!    surface here is the test-fixture builders in [`fixtures`].
//! 3. `NotFound` is distinguished from I/O failure; resolvers treat them
//!    differently before and after response emission.
//! 4. Retry policy belongs to backends. Callers never retry a fetch.

pub mod error;
pub mod fixtures;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryBlockStore;
pub use traits::BlockStore;
