// Authorization error types for admin endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::warn;

use crate::auth::token::Role;

/// Errors raised while checking a bearer token
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    /// Token is valid but its role cannot use the endpoint
    InsufficientPermissions { required: Role, actual: Role },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::InsufficientPermissions { required, actual } => {
                write!(f, "Insufficient permissions: required role '{}', but token has role '{}'", required, actual)
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::InsufficientPermissions { required, actual } => {
                warn!("Authorization failed: required role '{}', token has role '{}'", required, actual);
                format!("Insufficient permissions: required role '{}'", required)
            }
            other => {
                warn!("Rejected bearer token: {}", other);
                other.to_string()
            }
        };

        (self.status_code(), Json(json!({ "error": message }))).into_response()
    }
}
