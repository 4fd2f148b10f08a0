//! Router Module Index
//!
//! One router per resource, nested under `/api` by `create_router`. Access control
//! is not applied per router: each verb's policy lives in the resource descriptor
//! and is enforced by the shared handler pipeline, so one path can mix public and
//! protected methods.

/// Unauthenticated operational endpoints.
pub mod public;

/// /api/songs
pub mod songs;

/// /api/edges
pub mod edges;

/// /api/users
pub mod users;

use crate::AppState;
use axum::Router;

/// All resource routes, relative to `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/songs", songs::song_routes())
        .nest("/edges", edges::edge_routes())
        .nest("/users", users::user_routes())
}
