//! Request handlers: thin adapters from HTTP to the resolution core.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Response, StatusCode};
use axum::response::{IntoResponse, Json};
use futures::stream;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use dagway_hamt::list_directory;
use dagway_range::{parse_range_header, validate};
use dagway_response::{RangeBody, RangePlan};
use dagway_store::BlockStore;
use dagway_types::{BlockId, DirectoryEntry};
use dagway_walk::Walker;

use crate::config::ServerConfig;
use crate::error::ServerError;

/// Shared handler state. The store is the only cross-request state, and it
/// is opaque and read-only from here; each request builds its own walker.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlockStore>,
    pub config: Arc<ServerConfig>,
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "dagway-server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}

/// `GET /dag/{root}` — serve file content, optionally by ranges.
pub async fn get_dag_handler(
    State(state): State<AppState>,
    Path(root): Path<String>,
    headers: HeaderMap,
) -> Result<Response<Body>, ServerError> {
    let root = parse_root(&root)?;
    let mut walker = Walker::new(state.store.clone());
    let total = walker.total_size(&root).await.map_err(ServerError::from_walk)?;

    let range_header = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok());

    let (status, plan) = match range_header.map(parse_range_header) {
        None => (StatusCode::OK, RangePlan::full(total)),
        Some(Err(e)) => {
            // An unparseable Range header is ignored, not rejected.
            debug!(error = %e, "ignoring malformed range header");
            (StatusCode::OK, RangePlan::full(total))
        }
        Some(Ok(ranges)) => {
            if ranges.len() > state.config.max_ranges {
                return Err(ServerError::BadRequest(format!(
                    "{} ranges requested, at most {} allowed",
                    ranges.len(),
                    state.config.max_ranges,
                )));
            }
            let parts =
                validate(&ranges, total).map_err(|e| ServerError::from_range(e, total))?;
            let plan = RangePlan::new(total, parts, &mut rand::thread_rng());
            (StatusCode::PARTIAL_CONTENT, plan)
        }
    };

    // Resolve through the first payload chunk before committing the
    // status: a missing first block still gets a clean error response.
    let mut body = RangeBody::new(walker, root, plan);
    body.prime()
        .await
        .map_err(|e| ServerError::from_range(e, total))?;

    let plan = body.plan();
    let mut response = Response::builder()
        .status(status)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_TYPE, plan.content_type())
        .header(header::CONTENT_LENGTH, plan.content_length());
    if status == StatusCode::PARTIAL_CONTENT {
        if let Some(content_range) = plan.content_range() {
            response = response.header(header::CONTENT_RANGE, content_range);
        }
    }

    // After this point a missing block can only end the stream short of
    // Content-Length; the transport surfaces that as an abnormal end.
    let chunks = stream::unfold(body, |mut body| async move {
        let chunk = body.next_chunk().await?;
        Some((Ok::<_, std::io::Error>(chunk), body))
    });
    response
        .body(Body::from_stream(chunks))
        .map_err(|e| ServerError::Internal(e.to_string()))
}

/// One listed entry on the wire.
#[derive(Debug, Serialize)]
pub struct EntryRecord {
    pub name: String,
    pub target: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}

impl From<&DirectoryEntry> for EntryRecord {
    fn from(entry: &DirectoryEntry) -> Self {
        Self {
            name: entry.name.clone(),
            target: entry.target.to_hex(),
            entry_type: entry.entry_type.to_string(),
        }
    }
}

/// `GET /dag/{root}/ls` — list a sharded directory.
pub async fn list_directory_handler(
    State(state): State<AppState>,
    Path(root): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let root = parse_root(&root)?;
    let walker = Walker::new(state.store.clone());
    let entries = list_directory(&walker, &root)
        .await
        .map_err(ServerError::from_list)?;
    let records: Vec<EntryRecord> = entries.iter().map(EntryRecord::from).collect();
    Ok(Json(records))
}

fn parse_root(raw: &str) -> Result<BlockId, ServerError> {
    BlockId::from_hex(raw)
        .map_err(|e| ServerError::BadRequest(format!("invalid root id {raw:?}: {e}")))
}
