use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all gateway endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/dag/:root", get(handler::get_dag_handler))
        .route("/dag/:root/ls", get(handler::list_directory_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
