//! HTTP gateway surface for dagway.
//!
//! A thin axum adapter over the resolution core: parse the request, run
//! the walker-backed resolvers, map structured errors to statuses, and
//! stream the planned body. All range, listing, and fault semantics live
//! in the core crates; nothing here re-implements them.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, EntryRecord};
pub use router::build_router;
pub use server::{init_tracing, DagwayServer};
