use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::users::repo::{DuplicateKey, StoreError};

/// Errors a handler can return. Client errors carry a plain-text reason;
/// internal errors are logged with a reference id and hidden from the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(DuplicateKey::Email) => {
                ApiError::Conflict("Email already exists".into())
            }
            StoreError::Duplicate(DuplicateKey::Uid) => {
                ApiError::Conflict("User id already exists".into())
            }
            StoreError::Database(e) => ApiError::Internal(anyhow::Error::new(e).context("database")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Internal(err) => {
                let reference = Uuid::new_v4();
                error!(error = ?err, %reference, "request failed");
                (status, format!("Internal server error (ref {reference})")).into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}
