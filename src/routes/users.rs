use crate::{AppState, handlers::users};
use axum::{Router, routing::get};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        // GET lists (admin), POST registers (public).
        .route("/", get(users::list_users).post(users::create_user))
        // Static segment, matched before /{id}.
        .route("/me", get(users::get_me))
        .route("/{id}", get(users::get_user))
}
