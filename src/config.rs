use std::env;

/// Development-only JWT secret, used when `JWT_SECRET` is unset outside production.
pub const LOCAL_JWT_SECRET: &str = "songbook-local-development-secret";

/// AppConfig
///
/// Immutable configuration loaded once at startup and shared through `AppState`
/// (pulled into extractors via `FromRef`).
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Runtime environment marker. Controls the local auth bypass and log format.
    pub env: Env,
    /// Which persistence backend the repositories use.
    pub store: StoreBackend,
    /// Postgres connection string. Required when `store` is `Postgres`.
    pub db_url: Option<String>,
    /// Secret used to validate incoming HS256 tokens.
    pub jwt_secret: String,
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// StoreBackend
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum StoreBackend {
    Postgres,
    /// Process-local store; data is lost on restart.
    Memory,
}

impl Default for AppConfig {
    /// Safe, non-panicking values for tests.
    fn default() -> Self {
        Self {
            env: Env::Local,
            store: StoreBackend::Memory,
            db_url: None,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads `APP_ENV`, `APP_STORE`, `DATABASE_URL`, `JWT_SECRET` and `BIND_ADDR`.
    ///
    /// # Panics
    /// In production, panics when `DATABASE_URL` or `JWT_SECRET` is missing, or when
    /// the in-memory store is requested. Locally, panics only when `APP_STORE=postgres`
    /// is set without a `DATABASE_URL`.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let requested_store = env::var("APP_STORE").ok();

        match env {
            Env::Production => {
                let db_url = db_url.expect("FATAL: DATABASE_URL must be set in production.");
                let jwt_secret =
                    env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.");
                if requested_store.as_deref() == Some("memory") {
                    panic!("FATAL: APP_STORE=memory is not allowed in production.");
                }
                Self {
                    env,
                    store: StoreBackend::Postgres,
                    db_url: Some(db_url),
                    jwt_secret,
                    bind_addr,
                }
            }
            Env::Local => {
                let store = match (requested_store.as_deref(), &db_url) {
                    (Some("memory"), _) => StoreBackend::Memory,
                    (Some("postgres"), None) => {
                        panic!("FATAL: APP_STORE=postgres requires DATABASE_URL.")
                    }
                    (_, Some(_)) => StoreBackend::Postgres,
                    (_, None) => StoreBackend::Memory,
                };
                Self {
                    env,
                    store,
                    db_url,
                    jwt_secret: env::var("JWT_SECRET")
                        .unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                    bind_addr,
                }
            }
        }
    }
}
