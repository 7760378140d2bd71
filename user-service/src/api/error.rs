//! API error taxonomy
//!
//! Every failure leaving a handler is an [`ApiError`] carrying one of seven
//! [`ErrorKind`]s. Each kind has a stable numeric code and a fixed HTTP
//! status; the body is always `{"error": {"code": <int>, "msg": <string>}}`,
//! except for [`ErrorKind::Empty`] whose 204 response carries no body.
//!
//! # Example
//!
//! ```rust
//! use axum::http::StatusCode;
//! use user_service::api::{ApiError, ErrorKind};
//!
//! let error = ApiError::not_found("user 42 not found");
//! assert_eq!(error.kind, ErrorKind::NotFound);
//! assert_eq!(error.kind.code(), 4);
//! assert_eq!(error.kind.status_code(), StatusCode::NOT_FOUND);
//! ```

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::repository::{RepositoryError, RepositoryErrorKind};

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input
    InvalidParameter,
    /// Caller is known but not allowed
    PermissionDenied,
    /// Anything the service could not handle or classify
    Internal,
    /// Requested record does not exist
    NotFound,
    /// Nothing to return
    Empty,
    /// Operation is not available
    NotImplemented,
    /// Caller is not authenticated
    Unauthorized,
}

impl ErrorKind {
    /// Stable numeric code sent to clients
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidParameter => 1,
            Self::PermissionDenied => 2,
            Self::Internal => 3,
            Self::NotFound => 4,
            Self::Empty => 5,
            Self::NotImplemented => 6,
            Self::Unauthorized => 7,
        }
    }

    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidParameter => StatusCode::BAD_REQUEST,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Empty => StatusCode::NO_CONTENT,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid_parameter"),
            Self::PermissionDenied => write!(f, "permission_denied"),
            Self::Internal => write!(f, "internal"),
            Self::NotFound => write!(f, "not_found"),
            Self::Empty => write!(f, "empty"),
            Self::NotImplemented => write!(f, "not_implemented"),
            Self::Unauthorized => write!(f, "unauthorized"),
        }
    }
}

/// A classified failure with a client-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The category of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameter, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Empty, message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API {} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorDetail<'a> {
    code: u16,
    msg: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        tracing::debug!(
            kind = %self.kind,
            status = status.as_u16(),
            "API error: {}", self.message
        );

        if self.kind == ErrorKind::Empty {
            return status.into_response();
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.kind.code(),
                msg: &self.message,
            },
        };
        (status, Json(body)).into_response()
    }
}

// Store failures are logged here and reduced to a generic message; only
// not-found and validation failures keep theirs.
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err.kind {
            RepositoryErrorKind::NotFound => {
                let message = match (&err.entity_type, &err.entity_id) {
                    (Some(entity), Some(id)) => {
                        format!("{} {} not found", entity.to_lowercase(), id)
                    }
                    _ => "record not found".to_string(),
                };
                Self::not_found(message)
            }
            RepositoryErrorKind::ValidationFailed => Self::invalid_parameter(err.message),
            _ => {
                tracing::error!(
                    operation = %err.operation,
                    kind = %err.kind,
                    entity_type = ?err.entity_type,
                    entity_id = ?err.entity_id,
                    retriable = err.is_retriable(),
                    "store error: {}", err.message
                );
                Self::internal("internal error")
            }
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::invalid_parameter(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_parameter(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_parameter(rejection.body_text())
    }
}
