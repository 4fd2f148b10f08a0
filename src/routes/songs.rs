use crate::{AppState, handlers::songs};
use axum::{Router, routing::get};

/// Song routes.
///
/// | verb   | path  | access         |
/// |--------|-------|----------------|
/// | GET    | /     | admin          |
/// | POST   | /     | authenticated  |
/// | GET    | /{id} | public         |
/// | PUT    | /{id} | admin          |
/// | DELETE | /{id} | owner or admin |
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(songs::list_songs).post(songs::create_song))
        .route(
            "/{id}",
            get(songs::get_song)
                .put(songs::update_song)
                .delete(songs::delete_song),
        )
}
