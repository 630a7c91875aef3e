//! HAMT directory listing.
//!
//! Enumerates a sharded directory by visiting shard nodes only: terminal
//! entries are yielded straight from the slot tables, and no entry's target
//! block is ever fetched. This is what lets a sparse store list a directory
//! it holds almost none of the content for.
//!
//! Listing is buffered to completion before being returned (directories
//! are bounded, unlike file streams), so a shard fetch failing partway
//! never produces a partial listing, only [`ListError::TraversalIncomplete`].

pub mod error;
pub mod lister;

pub use error::{ListError, ListResult};
pub use lister::list_directory;
