use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    errors::ApiError,
    models::Role,
    repository::UserRepositoryState,
};

/// Header used by the local development bypass.
pub const DEV_USER_HEADER: &str = "x-user-id";

/// Claims
///
/// The JWT payload this service accepts. Tokens are issued by an external
/// identity service sharing `AppConfig::jwt_secret`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id.
    pub sub: Uuid,
    /// Expiration Time (exp): always validated.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of the caller. It is passed to handlers explicitly as an
/// extractor argument; nothing about the caller is kept in ambient state.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// AuthUser Extractor Implementation
///
/// 1. Local bypass: outside production, `x-user-id: <uuid>` naming an existing user.
/// 2. Bearer token: HS256 JWT decoded with the configured secret.
/// 3. User lookup: the role always comes from the store, so a demoted or deleted
///    user cannot keep acting on an old token.
///
/// Rejection: `ApiError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    UserRepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let users = UserRepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            if let Some(user_id) = parts
                .headers
                .get(DEV_USER_HEADER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| Uuid::parse_str(value).ok())
            {
                if let Ok(user) = users.get_user(user_id).await {
                    tracing::debug!(user_id = %user.id, "authenticated via local bypass header");
                    return Ok(AuthUser {
                        id: user.id,
                        role: user.role,
                    });
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                other => tracing::debug!(?other, "rejected invalid token"),
            }
            ApiError::Unauthorized
        })?;

        let user = users
            .get_user(token_data.claims.sub)
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}

/// Optional caller identity.
///
/// A request with no credentials at all resolves to `None`, leaving it to the
/// route's access policy to decide. Credentials that are present but invalid are
/// still rejected with 401.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    UserRepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        // The bypass header only counts where the bypass is honoured.
        let bypass_enabled = AppConfig::from_ref(state).env == Env::Local;
        let has_credentials = parts.headers.contains_key(header::AUTHORIZATION)
            || (bypass_enabled && parts.headers.contains_key(DEV_USER_HEADER));
        if !has_credentials {
            return Ok(None);
        }
        <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
