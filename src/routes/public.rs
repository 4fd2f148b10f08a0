use crate::AppState;
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints outside `/api` that are reachable without credentials.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Used by load balancers and monitoring. Returns "ok" once the server is up.
        .route("/health", get(|| async { "ok" }))
}
