use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use dagway_hamt::ListError;
use dagway_range::RangeError;
use dagway_walk::WalkError;

/// Gateway-level errors, each mapped to an HTTP status.
///
/// These only ever describe failures found *before* any response byte was
/// committed; a fault mid-stream never becomes one of these (see
/// `dagway_response::RangeBody`).
#[derive(Debug, Error)]
pub enum ServerError {
    /// Unparseable root id, non-file root for a range request, non-shard
    /// root for a listing, or too many ranges.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The root (or a block needed before emission) is absent locally.
    #[error("not found: {0}")]
    NotFound(String),

    /// No requested range overlaps the stream.
    #[error("range not satisfiable for stream of {total} bytes")]
    RangeNotSatisfiable { total: u64 },

    /// A directory listing could not be completed from local blocks.
    #[error("listing incomplete: {0}")]
    ListingIncomplete(String),

    /// The store fed us content that fails structural checks. The request
    /// was fine; the upstream data is not.
    #[error("corrupt content: {0}")]
    CorruptContent(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Classify a traversal failure found before emission.
    pub fn from_walk(e: WalkError) -> Self {
        if e.is_not_found() {
            return ServerError::NotFound(e.to_string());
        }
        match e {
            WalkError::NotAFile(_) | WalkError::OutOfRange { .. } => {
                ServerError::BadRequest(e.to_string())
            }
            WalkError::CorruptDag { .. } => ServerError::CorruptContent(e.to_string()),
            WalkError::Store(inner) => ServerError::Internal(inner.to_string()),
        }
    }

    /// Classify a range failure found before emission. `total` feeds the
    /// `Content-Range: bytes */total` of a 416.
    pub fn from_range(e: RangeError, total: u64) -> Self {
        match e {
            RangeError::NotSatisfiable { .. } => ServerError::RangeNotSatisfiable { total },
            RangeError::Malformed(reason) => ServerError::BadRequest(reason),
            RangeError::Walk(walk) => Self::from_walk(walk),
        }
    }

    pub fn from_list(e: ListError) -> Self {
        match e {
            ListError::NotADirectory(_) => ServerError::BadRequest(e.to_string()),
            ListError::CorruptShard { .. } => ServerError::CorruptContent(e.to_string()),
            ListError::TraversalIncomplete { .. } => ServerError::ListingIncomplete(e.to_string()),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) | ServerError::ListingIncomplete(_) => StatusCode::NOT_FOUND,
            ServerError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            ServerError::CorruptContent(_) => StatusCode::BAD_GATEWAY,
            ServerError::Config(_) | ServerError::Io(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "request failed");
        let status = self.status();
        let message = self.to_string();
        if let ServerError::RangeNotSatisfiable { total } = self {
            (
                status,
                [(header::CONTENT_RANGE, format!("bytes */{total}"))],
                message,
            )
                .into_response()
        } else {
            (status, message).into_response()
        }
    }
}

/// Result alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
