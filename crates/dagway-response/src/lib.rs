//! Range response encoding and streaming fault handling.
//!
//! [`RangePlan`] fixes the response shape up front (single range or
//! multipart, descriptors, boundary, exact body length), which is possible
//! because validation clamps every range before emission starts, and is
//! what makes a later truncation observable as a short body.
//!
//! [`RangeBody`] then streams the planned body chunk by chunk. Its one
//! subtle job is the fault contract: a block found missing *before* the
//! first chunk is handed out surfaces as a clean error; the same failure
//! *after* emission has begun only ever ends the stream early, with no
//! completion framing and no substitute error body.

pub mod body;
pub mod encoder;
pub mod error;

pub use body::RangeBody;
pub use encoder::{generate_boundary, RangePlan};
pub use error::BodyError;
