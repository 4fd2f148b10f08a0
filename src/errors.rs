use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// FieldError
///
/// A single, client-facing problem with one field of a request body.
/// Validation and duplicate-key failures are rendered as a JSON array of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The canonical "missing required field" problem.
    pub fn required(field: &str) -> Self {
        Self::new(field, format!("{} is required", field))
    }
}

/// ApiError
///
/// The failure taxonomy shared by every repository and handler. Failures are never
/// recovered locally; they propagate to the handler boundary and are translated
/// exactly once, by the `IntoResponse` implementation below.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more required fields are missing or malformed.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    /// A unique constraint was violated (e.g. a song url that is already used).
    #[error("duplicate value for {}", .0.field)]
    Duplicate(FieldError),
    #[error("resource not found")]
    NotFound,
    /// No caller identity, or the presented credentials are invalid.
    #[error("authentication required")]
    Unauthorized,
    /// The caller is authenticated but lacks the rights for this operation.
    #[error("insufficient rights")]
    Forbidden,
    /// Catch-all. The detail is logged, never returned to the client.
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn duplicate(field: &str) -> Self {
        ApiError::Duplicate(FieldError::new(field, format!("{} already exists", field)))
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }

    /// The HTTP status this failure maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Duplicate(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) => (status, Json(errors)).into_response(),
            ApiError::Duplicate(error) => (status, Json(vec![error])).into_response(),
            ApiError::NotFound => status.into_response(),
            ApiError::Unauthorized => opaque(status, "Unauthorized"),
            ApiError::Forbidden => opaque(status, "Forbidden"),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed with an internal error");
                opaque(status, "Internal server error")
            }
        }
    }
}

fn opaque(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "error": {
            "message": message
        }
    }));
    (status, body).into_response()
}

/// Classifies driver failures into the API taxonomy.
///
/// Constraint names follow the Postgres defaults (`songs_url_key`,
/// `songs_created_by_fkey`), so the offending column is recovered from them.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                let field = db
                    .constraint()
                    .map(field_from_constraint)
                    .unwrap_or_else(|| "value".to_string());
                ApiError::duplicate(&field)
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                let field = db
                    .constraint()
                    .map(field_from_constraint)
                    .unwrap_or_else(|| "reference".to_string());
                let message = format!("{} must reference an existing record", field);
                ApiError::invalid(&field, message)
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

/// A body that is missing, not JSON, or not parseable is a validation failure on
/// the pseudo-field `body`.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid("body", rejection.body_text())
    }
}

/// Maps `<table>_<column>_<suffix>` to the camelCase JSON field name of `<column>`.
pub fn field_from_constraint(constraint: &str) -> String {
    let trimmed = ["_fkey", "_pkey", "_key"]
        .iter()
        .find_map(|suffix| constraint.strip_suffix(suffix))
        .unwrap_or(constraint);
    let column = trimmed.split_once('_').map_or(trimmed, |(_, rest)| rest);

    let mut field = String::with_capacity(column.len());
    let mut upper_next = false;
    for c in column.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            field.extend(c.to_uppercase());
            upper_next = false;
        } else {
            field.push(c);
        }
    }
    field
}
