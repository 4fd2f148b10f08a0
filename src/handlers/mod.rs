//! HTTP handlers.
//!
//! `crud` holds the request pipeline shared by every resource type. The
//! per-resource modules are thin, OpenAPI-annotated entry points into it.

pub mod edges;
pub mod songs;
pub mod users;

pub mod crud {
    use axum::{
        Json,
        extract::rejection::JsonRejection,
        http::{HeaderValue, StatusCode, header},
        response::{IntoResponse, Response},
    };
    use serde::Serialize;
    use serde_json::Value;
    use uuid::Uuid;

    use crate::{
        AppState,
        auth::AuthUser,
        errors::{ApiError, ApiResult},
        guard::{self, Access},
        resource::Resource,
    };

    /// Created
    ///
    /// A 201 response carrying the new resource and, when the resource defines
    /// one, a `Location` header.
    #[derive(Debug)]
    pub struct Created<R> {
        pub location: Option<String>,
        pub resource: R,
    }

    impl<R: Serialize> IntoResponse for Created<R> {
        fn into_response(self) -> Response {
            let mut response = (StatusCode::CREATED, Json(self.resource)).into_response();
            if let Some(location) = self
                .location
                .and_then(|location| HeaderValue::from_str(&location).ok())
            {
                response.headers_mut().insert(header::LOCATION, location);
            }
            response
        }
    }

    /// A request body as extracted, left unparsed until the caller gate has run so
    /// an anonymous request is answered with 401 whatever its body looks like.
    pub type Body = Result<Json<Value>, JsonRejection>;

    /// An id that is not a UUID cannot name any stored document.
    pub fn parse_id(raw: &str) -> ApiResult<Uuid> {
        Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
    }

    pub async fn list<R: Resource>(caller: Option<AuthUser>, state: &AppState) -> ApiResult<Vec<R>> {
        guard::authorize_caller(R::LIST, caller.as_ref())?;
        R::store(state).list().await
    }

    pub async fn show<R: Resource>(
        caller: Option<AuthUser>,
        state: &AppState,
        id: &str,
    ) -> ApiResult<R> {
        guard::authorize_caller(R::SHOW, caller.as_ref())?;
        let resource = R::store(state).get_by_id(parse_id(id)?).await?;
        guard::authorize_owner(R::SHOW, caller.as_ref(), resource.owner())?;
        Ok(resource)
    }

    pub async fn create<R: Resource>(
        caller: Option<AuthUser>,
        state: &AppState,
        body: Body,
    ) -> ApiResult<Created<R>> {
        guard::authorize_caller(R::CREATE, caller.as_ref())?;
        let Json(body) = body?;
        let draft = R::draft(body, caller.as_ref())?;
        let resource = R::store(state).create(draft).await?;
        resource.after_insert(state).await;

        tracing::info!(resource = R::NAME, id = %resource.id(), "created");
        Ok(Created {
            location: resource.location(),
            resource,
        })
    }

    /// The patch is validated before the store is touched; a missing id is then
    /// reported by the repository's merge.
    pub async fn update<R: Resource>(
        caller: Option<AuthUser>,
        state: &AppState,
        id: &str,
        body: Body,
    ) -> ApiResult<R> {
        guard::authorize_caller(R::UPDATE, caller.as_ref())?;
        let id = parse_id(id)?;
        let Json(body) = body?;
        let patch = R::patch(body)?;
        let store = R::store(state);

        if R::UPDATE == Access::OwnerOrAdmin {
            let current = store.get_by_id(id).await?;
            guard::authorize_owner(R::UPDATE, caller.as_ref(), current.owner())?;
        }

        let updated = store.update_merge(id, patch).await?;
        tracing::info!(resource = R::NAME, %id, "updated");
        Ok(updated)
    }

    pub async fn remove<R: Resource>(
        caller: Option<AuthUser>,
        state: &AppState,
        id: &str,
    ) -> ApiResult<StatusCode> {
        guard::authorize_caller(R::DELETE, caller.as_ref())?;
        let id = parse_id(id)?;
        let store = R::store(state);

        let current = store.get_by_id(id).await?;
        guard::authorize_owner(R::DELETE, caller.as_ref(), current.owner())?;

        store.remove(id).await?;
        current.after_remove(state).await;

        tracing::info!(resource = R::NAME, %id, "deleted");
        Ok(StatusCode::NO_CONTENT)
    }
}
