use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::crud::{Body, parse_id};
use crate::{
    AppState,
    auth::AuthUser,
    errors::{ApiResult, FieldError},
    guard::{self, Access},
    models::User,
    schema,
};

/// list_users
///
/// [Admin] Every known user.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<User>>> {
    guard::authorize_caller(Access::Admin, caller.as_ref())?;
    state.users.list_users().await.map(Json)
}

/// get_me
///
/// [Authenticated] The caller's own record, including `songsCreated`.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Profile", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_me(AuthUser { id, .. }: AuthUser, State(state): State<AppState>) -> ApiResult<Json<User>> {
    state.users.get_user(id).await.map(Json)
}

/// get_user
///
/// [Admin] Any user by id.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    guard::authorize_caller(Access::Admin, caller.as_ref())?;
    state.users.get_user(parse_id(&id)?).await.map(Json)
}

/// create_user
///
/// [Public] Signup. Registers an email with the `user` role; tokens for the new
/// user are issued by the identity service, not here.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 400, description = "Missing or duplicate email", body = [FieldError])
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    body: Body,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(body) = body?;
    let new_user = schema::new_user(&body)?;
    let user = state.users.create_user(new_user).await?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}
