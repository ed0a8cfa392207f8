// Admin guard for catalogue and booking management routes

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::{debug, warn};

use crate::auth::{error::AuthError, token::Role};
use crate::AppState;

/// Extracted from a valid bearer token whose role is `admin`
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub subject: String,
    pub email: Option<String>,
}

/// Pull the bearer token out of the Authorization header
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let endpoint = parts.uri.path().to_string();
        let token = bearer_token(parts).map_err(|e| {
            warn!("Rejected request to {}: {}", endpoint, e);
            e
        })?;

        let claims = state.tokens.validate_access_token(token)?;

        if claims.role != Role::Admin {
            return Err(AuthError::InsufficientPermissions {
                required: Role::Admin,
                actual: claims.role,
            });
        }

        debug!("Admin {} authorized for {}", claims.sub, endpoint);
        Ok(AdminUser {
            subject: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(auth_value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/room-types");
        if let Some(value) = auth_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_missing_header() {
        let parts = parts_with(None);
        assert!(matches!(bearer_token(&parts), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_non_bearer_schemes_are_rejected() {
        for value in ["Basic dXNlcjpwYXNz", "token_without_bearer", ""] {
            let parts = parts_with(Some(value));
            assert!(matches!(bearer_token(&parts), Err(AuthError::InvalidToken)));
        }
    }

    #[test]
    fn test_bearer_token_is_extracted() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");
    }
}
