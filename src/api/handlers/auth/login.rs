use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, instrument};

use super::error::AuthError;
use super::guards;
use super::session;
use super::state::AuthConfig;
use super::strategy::{self, AuthFailure, LoginOutcome};
use super::types::{LoginRequest, UserEnvelope};
use crate::cache::SessionCache;

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserEnvelope),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Already signed in"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    pool: Extension<PgPool>,
    cache: Extension<SessionCache>,
    config: Extension<Arc<AuthConfig>>,
    headers: HeaderMap,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    guards::require_anonymous(&headers, &pool, &cache, &config).await?;

    let Some(Json(request)) = payload else {
        return Err(AuthError::MissingCredentials);
    };

    let user = match strategy::verify_credentials(&pool, &request.username_or_email, &request.password)
        .await?
    {
        LoginOutcome::Authenticated(user) => user,
        LoginOutcome::Rejected(AuthFailure::MissingCredentials) => {
            return Err(AuthError::MissingCredentials)
        }
        LoginOutcome::Rejected(AuthFailure::InvalidCredentials) => {
            return Err(AuthError::InvalidCredentials)
        }
    };

    // A fresh token on every login; an attacker-seeded cookie never survives
    // authentication.
    let cookie = session::establish_session(&cache, &config, user.id).await?;
    info!(user.id, "user logged in");

    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);

    Ok((
        StatusCode::OK,
        response_headers,
        Json(UserEnvelope {
            message: "User logged in successfully".to_string(),
            user: guards::Principal::from(user).into(),
        }),
    ))
}
