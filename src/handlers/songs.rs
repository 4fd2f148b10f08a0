use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use super::crud::{self, Created};
use crate::{
    AppState,
    auth::AuthUser,
    errors::{ApiResult, FieldError},
    models::{Song, SongPatch},
};

/// list_songs
///
/// [Admin] Every stored song.
#[utoipa::path(
    get,
    path = "/api/songs",
    tag = "songs",
    responses(
        (status = 200, description = "All songs", body = [Song]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_songs(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Song>>> {
    crud::list::<Song>(caller, &state).await.map(Json)
}

/// get_song
///
/// [Public] A single song with its derived `location` and `apiLocation`.
#[utoipa::path(
    get,
    path = "/api/songs/{id}",
    tag = "songs",
    params(("id" = uuid::Uuid, Path, description = "Song ID")),
    responses(
        (status = 200, description = "Found", body = Song),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_song(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Song>> {
    crud::show::<Song>(caller, &state, &id).await.map(Json)
}

/// create_song
///
/// [Authenticated] Creates a song owned by the caller and appends its id to the
/// caller's `songsCreated`. Responds with `Location: /api/songs/{id}`.
#[utoipa::path(
    post,
    path = "/api/songs",
    tag = "songs",
    request_body = SongPatch,
    responses(
        (status = 201, description = "Created", body = Song),
        (status = 400, description = "Missing field or duplicate url", body = [FieldError]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_song(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    body: crud::Body,
) -> ApiResult<Created<Song>> {
    crud::create::<Song>(caller, &state, body).await
}

/// update_song
///
/// [Admin] Merges `title`, `artist` and/or `url` over the stored song.
#[utoipa::path(
    put,
    path = "/api/songs/{id}",
    tag = "songs",
    params(("id" = uuid::Uuid, Path, description = "Song ID")),
    request_body = SongPatch,
    responses(
        (status = 200, description = "Updated", body = Song),
        (status = 400, description = "Invalid patch", body = [FieldError]),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_song(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: crud::Body,
) -> ApiResult<Json<Song>> {
    crud::update::<Song>(caller, &state, &id, body).await.map(Json)
}

/// delete_song
///
/// [Owner or Admin] Deletes a song and drops it from its creator's `songsCreated`.
#[utoipa::path(
    delete,
    path = "/api/songs/{id}",
    tag = "songs",
    params(("id" = uuid::Uuid, Path, description = "Song ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Neither owner nor admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_song(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    crud::remove::<Song>(caller, &state, &id).await
}
