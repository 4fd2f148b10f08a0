use crate::{AppState, handlers::edges};
use axum::{Router, routing::get};

/// Edge routes. Reads are public; create and delete need any authenticated
/// caller; updates are admin-only.
pub fn edge_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(edges::list_edges).post(edges::create_edge))
        .route(
            "/{id}",
            get(edges::get_edge)
                .put(edges::update_edge)
                .delete(edges::delete_edge),
        )
}
