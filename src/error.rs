//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("validation: {0}")]
    Validation(String),
}

/// Failures raised by a record or user store. Backend errors never leave the service layer raw.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
    #[error("row not found")]
    RowMissing,
    #[error("database: {0}")]
    Database(#[source] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Classify a sqlx error: SQLSTATE 23505 becomes a unique violation, `RowNotFound` a missing row.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::RowMissing,
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                }
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Why the authorization gate refused a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    Seeded,
    NotOwner,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::Seeded => f.write_str("seeded records are immutable"),
            DenyReason::NotOwner => f.write_str("only the owner may modify this record"),
        }
    }
}

/// Outcome taxonomy of every catalog operation.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },
    #[error("pokemon {0} not found")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(DenyReason),
    #[error("{0}")]
    Conflict(String),
    #[error("data access failure: {0}")]
    DataAccess(String),
}

impl CatalogError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CatalogError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, code, message) = match &self {
            AppError::Catalog(e) => match e {
                CatalogError::Validation { field, message } => {
                    details = field.map(|f| serde_json::json!({ "field": f }));
                    (StatusCode::BAD_REQUEST, "validation_error", message.clone())
                }
                CatalogError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", e.to_string()),
                CatalogError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", e.to_string()),
                CatalogError::Conflict(_) => (StatusCode::CONFLICT, "conflict", e.to_string()),
                CatalogError::DataAccess(msg) => {
                    tracing::error!(error = %msg, "data access failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "data_access_failure",
                        "data access failure".to_string(),
                    )
                }
            },
            AppError::Config(e) => {
                tracing::error!(error = %e, "config error");
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", "server misconfigured".to_string())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "an internal error occurred".to_string(),
                )
            }
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
