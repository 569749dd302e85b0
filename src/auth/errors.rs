use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Every failure an auth operation can hand to the transport.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Email or password is incorrect")]
    InvalidCredentials,
    #[error("Missing or invalid authentication token")]
    Unauthorized,
    #[error("Email already registered")]
    AlreadyRegistered,
    #[error("store unavailable: {0}")]
    Connectivity(String),
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl AuthError {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Unauthorized => "unauthorized",
            AuthError::AlreadyRegistered => "already_registered",
            AuthError::Connectivity(_) => "connectivity",
            AuthError::Unexpected(_) => "unexpected",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::AlreadyRegistered => StatusCode::CONFLICT,
            AuthError::Connectivity(_) | AuthError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing text. Internal failures collapse to one fixed message.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Connectivity(_) | AuthError::Unexpected(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub kind: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.public_message(),
            kind: self.kind(),
        };
        (self.status(), Json(body)).into_response()
    }
}
