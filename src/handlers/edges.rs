use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use super::crud::{self, Created};
use crate::{AppState, auth::AuthUser, errors::ApiResult, models::Edge};

/// list_edges
///
/// [Public] Every stored edge.
#[utoipa::path(
    get,
    path = "/api/edges",
    tag = "edges",
    responses((status = 200, description = "All edges", body = [Edge]))
)]
pub async fn list_edges(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Edge>>> {
    crud::list::<Edge>(caller, &state).await.map(Json)
}

/// get_edge
///
/// [Public] A single edge with its free-form fields inlined.
#[utoipa::path(
    get,
    path = "/api/edges/{id}",
    tag = "edges",
    params(("id" = uuid::Uuid, Path, description = "Edge ID")),
    responses(
        (status = 200, description = "Found", body = Edge),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_edge(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Edge>> {
    crud::show::<Edge>(caller, &state, &id).await.map(Json)
}

/// create_edge
///
/// [Authenticated] Stores any JSON object as a new edge.
#[utoipa::path(
    post,
    path = "/api/edges",
    tag = "edges",
    responses(
        (status = 201, description = "Created", body = Edge),
        (status = 400, description = "Body is not an object"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_edge(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    body: crud::Body,
) -> ApiResult<Created<Edge>> {
    crud::create::<Edge>(caller, &state, body).await
}

/// update_edge
///
/// [Admin] Shallow-merges the body's top-level keys over the stored edge.
#[utoipa::path(
    put,
    path = "/api/edges/{id}",
    tag = "edges",
    params(("id" = uuid::Uuid, Path, description = "Edge ID")),
    responses(
        (status = 200, description = "Updated", body = Edge),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_edge(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: crud::Body,
) -> ApiResult<Json<Edge>> {
    crud::update::<Edge>(caller, &state, &id, body).await.map(Json)
}

/// delete_edge
///
/// [Authenticated] Edges have no owner, so any signed-in caller may delete one.
#[utoipa::path(
    delete,
    path = "/api/edges/{id}",
    tag = "edges",
    params(("id" = uuid::Uuid, Path, description = "Edge ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_edge(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    crud::remove::<Edge>(caller, &state, &id).await
}
