//! Error taxonomy for the auth endpoints.
//!
//! Every collaborator failure funnels into one of these variants before it
//! reaches the client. Internal errors are logged server-side and answered
//! with a generic message; authentication failures share one undifferentiated
//! `Invalid credentials` answer so responses do not reveal whether an
//! identifier exists.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::error;

use super::rate_limit::{self, RateLimitStatus};
use super::types::MessageResponse;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing required fields on a non-login request (400).
    #[error("All fields are required")]
    MissingFields,

    /// Missing login credentials. Answered like any other failed login (401).
    #[error("All fields are required")]
    MissingCredentials,

    /// Unknown identifier or wrong password (401).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No authenticated principal on a guarded route (401).
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed here (403).
    #[error("Forbidden")]
    Forbidden,

    /// Username or email already taken (409).
    #[error("User already exists")]
    Conflict,

    /// Fixed-window limit exhausted (429).
    #[error("Too many requests, please try again later.")]
    RateLimited(RateLimitStatus),

    /// Datastore, cache, or hasher failure (500).
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::MissingCredentials | Self::InvalidCredentials | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Conflict => StatusCode::CONFLICT,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref err) = self {
            // The chain stays in the server logs; the client gets the generic message.
            error!("Internal error: {err:#}");
        }

        let status = self.status();
        let body = Json(MessageResponse {
            message: self.to_string(),
        });

        match self {
            Self::RateLimited(limit_status) => {
                (status, rate_limit::headers(&limit_status), body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(AuthError::MissingFields.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::MissingCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::Internal(anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_hide_the_cause() {
        let err = AuthError::Internal(anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn rate_limited_response_carries_headers() {
        let err = AuthError::RateLimited(RateLimitStatus {
            limit: 10,
            remaining: 0,
            reset_seconds: Some(60),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        assert_eq!(response.headers()["x-ratelimit-limit"], "10");
        assert_eq!(response.headers()["x-ratelimit-reset"], "60");
    }

    #[test]
    fn credential_failures_share_messages() {
        // Unknown identifier and wrong password must be indistinguishable.
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(
            AuthError::MissingCredentials.to_string(),
            AuthError::MissingFields.to_string()
        );
    }
}
