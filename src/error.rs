use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use sqlx::error::ErrorKind;
use std::fmt;
use thiserror::Error as ThisError;
use tracing::{error, warn};

use crate::types::{FieldError, ValidationErrors};

/// Record kinds that can be looked up by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Category,
    Product,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Category => f.write_str("Category"),
            Entity::Product => f.write_str("Product"),
        }
    }
}

/// Which store-level rule rejected a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
    NotNull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    pub message: String,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} constraint: {}", self.kind, self.message)
    }
}

#[derive(Debug, ThisError)]
pub enum InventoryError {
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error("{0} not found")]
    NotFound(Entity),

    #[error("Category {0} does not exist")]
    UnknownCategory(i64),

    #[error("Constraint violation: {0}")]
    Constraint(ConstraintViolation),

    #[error("Database unavailable: {0}")]
    Connection(#[source] SqlxError),

    #[error("Database error: {0}")]
    Database(#[source] SqlxError),
}

impl InventoryError {
    pub fn status(&self) -> StatusCode {
        match self {
            InventoryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
            InventoryError::UnknownCategory(_) => StatusCode::BAD_REQUEST,
            InventoryError::Constraint(v) => match v.kind {
                ConstraintKind::Unique => StatusCode::CONFLICT,
                ConstraintKind::ForeignKey | ConstraintKind::Check | ConstraintKind::NotNull => {
                    StatusCode::BAD_REQUEST
                }
            },
            InventoryError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            InventoryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_constraint(&self, kind: ConstraintKind) -> bool {
        matches!(self, InventoryError::Constraint(v) if v.kind == kind)
    }
}

impl From<SqlxError> for InventoryError {
    fn from(e: SqlxError) -> Self {
        match e {
            SqlxError::Database(db_err) => {
                let kind = match db_err.kind() {
                    ErrorKind::UniqueViolation => ConstraintKind::Unique,
                    ErrorKind::ForeignKeyViolation => ConstraintKind::ForeignKey,
                    ErrorKind::CheckViolation => ConstraintKind::Check,
                    ErrorKind::NotNullViolation => ConstraintKind::NotNull,
                    _ => return InventoryError::Database(SqlxError::Database(db_err)),
                };
                InventoryError::Constraint(ConstraintViolation {
                    kind,
                    message: db_err.message().to_string(),
                })
            }
            SqlxError::PoolTimedOut
            | SqlxError::PoolClosed
            | SqlxError::Io(_)
            | SqlxError::Tls(_)
            | SqlxError::WorkerCrashed => InventoryError::Connection(e),
            other => InventoryError::Database(other),
        }
    }
}

impl From<ValidationErrors> for InventoryError {
    fn from(e: ValidationErrors) -> Self {
        InventoryError::Validation(e)
    }
}

impl From<JsonRejection> for InventoryError {
    fn from(rejection: JsonRejection) -> Self {
        InventoryError::Validation(ValidationErrors::single("body", rejection.body_text()))
    }
}

impl From<PathRejection> for InventoryError {
    fn from(rejection: PathRejection) -> Self {
        InventoryError::Validation(ValidationErrors::single("path", rejection.body_text()))
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match &self {
            InventoryError::Validation(errors) => ApiErrorBody {
                code: "VALIDATION_ERROR".to_string(),
                message: "Request validation failed.".to_string(),
                details: errors.fields().to_vec(),
            },
            InventoryError::NotFound(entity) => {
                ApiErrorBody::plain("NOT_FOUND", format!("{entity} not found"))
            }
            InventoryError::UnknownCategory(_) => {
                ApiErrorBody::plain("CATEGORY_NOT_FOUND", "Category not found")
            }
            InventoryError::Constraint(v) => {
                warn!(kind = ?v.kind, error = %v.message, "store rejected statement");
                match v.kind {
                    ConstraintKind::Unique => {
                        ApiErrorBody::plain("CONFLICT", "A record with this value already exists.")
                    }
                    // A category removed after the existence check surfaces here.
                    ConstraintKind::ForeignKey => {
                        ApiErrorBody::plain("CATEGORY_NOT_FOUND", "Category not found")
                    }
                    ConstraintKind::Check | ConstraintKind::NotNull => {
                        ApiErrorBody::plain("CONSTRAINT_VIOLATION", "Value rejected by the store.")
                    }
                }
            }
            InventoryError::Connection(e) => {
                error!(error = %e, "database connection failure");
                ApiErrorBody::plain("SERVICE_UNAVAILABLE", "Database is unavailable.")
            }
            InventoryError::Database(e) => {
                error!(error = %e, "database error");
                ApiErrorBody::plain("INTERNAL_ERROR", "An internal server error occurred.")
            }
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

impl ApiErrorBody {
    fn plain(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
