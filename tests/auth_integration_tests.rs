use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{Method, Request, header, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use songbook_api::{
    ApiError, AppConfig, AppState,
    auth::{AuthUser, Claims, DEV_USER_HEADER},
    config::Env,
    models::{NewUser, Role, User},
};
use std::time::SystemTime;
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn create_token(user_id: Uuid, secret: &str, exp: u64) -> String {
    let claims = Claims {
        sub: user_id,
        iat: now() as usize,
        exp: exp as usize,
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(env: Env) -> AppState {
    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };
    AppState::in_memory(config)
}

async fn seed_user(state: &AppState, email: &str, role: Role) -> User {
    state
        .users
        .create_user(NewUser {
            email: email.to_string(),
            role,
        })
        .await
        .unwrap()
}

fn request_parts() -> Parts {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(token: &str) -> Parts {
    let mut parts = request_parts();
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    parts
}

fn with_dev_header(user_id: Uuid) -> Parts {
    let mut parts = request_parts();
    parts.headers.insert(
        header::HeaderName::from_static(DEV_USER_HEADER),
        header::HeaderValue::from_str(&user_id.to_string()).unwrap(),
    );
    parts
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let state = create_app_state(Env::Production);
    let user = seed_user(&state, "test@example.com", Role::User).await;
    let token = create_token(user.id, TEST_JWT_SECRET, now() + 3600);

    let mut parts = with_bearer(&token);
    let auth_user = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(auth_user.id, user.id);
    assert_eq!(auth_user.role, Role::User);
    assert!(!auth_user.is_admin());
}

#[tokio::test]
async fn test_auth_role_comes_from_store() {
    let state = create_app_state(Env::Production);
    let admin = seed_user(&state, "admin@example.com", Role::Admin).await;
    let token = create_token(admin.id, TEST_JWT_SECRET, now() + 3600);

    let mut parts = with_bearer(&token);
    let auth_user = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert!(auth_user.is_admin());
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let state = create_app_state(Env::Production);
    let mut parts = request_parts();

    let result = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let state = create_app_state(Env::Production);
    let user = seed_user(&state, "test@example.com", Role::User).await;
    // Well past the default leeway.
    let token = create_token(user.id, TEST_JWT_SECRET, now() - 3600);

    let mut parts = with_bearer(&token);
    let result = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_auth_failure_with_wrong_secret() {
    let state = create_app_state(Env::Production);
    let user = seed_user(&state, "test@example.com", Role::User).await;
    let token = create_token(user.id, "some-other-secret", now() + 3600);

    let mut parts = with_bearer(&token);
    let result = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_auth_failure_for_unknown_user() {
    let state = create_app_state(Env::Production);
    let token = create_token(Uuid::new_v4(), TEST_JWT_SECRET, now() + 3600);

    let mut parts = with_bearer(&token);
    let result = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_local_bypass_success() {
    let state = create_app_state(Env::Local);
    let admin = seed_user(&state, "local@dev.com", Role::Admin).await;

    let mut parts = with_dev_header(admin.id);
    let auth_user = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(auth_user.id, admin.id);
    assert_eq!(auth_user.role, Role::Admin);
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let state = create_app_state(Env::Production);
    let user = seed_user(&state, "local@dev.com", Role::User).await;

    let mut parts = with_dev_header(user.id);
    let result = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_optional_caller_is_none_without_credentials() {
    let state = create_app_state(Env::Local);
    let mut parts = request_parts();

    let caller =
        <AuthUser as OptionalFromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
            .await
            .unwrap();

    assert_eq!(caller, None);
}

#[tokio::test]
async fn test_optional_caller_rejects_invalid_credentials() {
    let state = create_app_state(Env::Local);
    let mut parts = with_bearer("not-a-jwt");

    let result =
        <AuthUser as OptionalFromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
            .await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_optional_caller_resolves_valid_credentials() {
    let state = create_app_state(Env::Local);
    let user = seed_user(&state, "someone@example.com", Role::User).await;
    let mut parts = with_dev_header(user.id);

    let caller =
        <AuthUser as OptionalFromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
            .await
            .unwrap();

    assert_eq!(
        caller,
        Some(AuthUser {
            id: user.id,
            role: Role::User
        })
    );
}

#[tokio::test]
async fn test_optional_caller_ignores_dev_header_in_prod() {
    let state = create_app_state(Env::Production);
    let user = seed_user(&state, "someone@example.com", Role::User).await;
    let mut parts = with_dev_header(user.id);

    let caller =
        <AuthUser as OptionalFromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
            .await
            .unwrap();

    assert_eq!(caller, None);
}
