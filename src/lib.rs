use axum::{Router, extract::FromRef, http::HeaderName};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod errors;
pub mod guard;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;
pub mod resource;
pub mod schema;
pub mod slug;

pub mod routes;
use routes::public;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use errors::{ApiError, ApiResult};
pub use memory::MemoryStore;
pub use repository::{PostgresRepository, ResourceRepository, ResourceStore, UserRepository, UserRepositoryState};

use models::{Edge, Song};

/// ApiDoc
///
/// OpenAPI document for every handler annotated with `#[utoipa::path]`,
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::songs::list_songs, handlers::songs::get_song, handlers::songs::create_song,
        handlers::songs::update_song, handlers::songs::delete_song,
        handlers::edges::list_edges, handlers::edges::get_edge, handlers::edges::create_edge,
        handlers::edges::update_edge, handlers::edges::delete_edge,
        handlers::users::list_users, handlers::users::get_me, handlers::users::get_user,
        handlers::users::create_user
    ),
    components(
        schemas(
            models::Song, models::SongPatch, models::Edge, models::User, models::Role,
            errors::FieldError,
        )
    ),
    tags(
        (name = "songs", description = "Songs, owned by their creator"),
        (name = "edges", description = "Free-form linked documents"),
        (name = "users", description = "Identities referenced by songs")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container of everything a request may need. Handlers and
/// extractors pull individual parts through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub songs: ResourceStore<Song>,
    pub edges: ResourceStore<Edge>,
    pub users: UserRepositoryState,
    pub config: AppConfig,
}

impl AppState {
    /// Backs every repository with one store instance.
    pub fn with_store<T>(store: Arc<T>, config: AppConfig) -> Self
    where
        T: ResourceRepository<Song> + ResourceRepository<Edge> + UserRepository + 'static,
    {
        Self {
            songs: store.clone(),
            edges: store.clone(),
            users: store,
            config,
        }
    }

    /// A fresh in-memory state.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for UserRepositoryState {
    fn from_ref(app_state: &AppState) -> UserRepositoryState {
        app_state.users.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, the documentation UI and the observability layers, and
/// binds the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest("/api", routes::api_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens one span per request carrying method, uri and the `x-request-id` set by
/// `SetRequestIdLayer`, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
