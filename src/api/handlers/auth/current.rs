use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::instrument;

use super::error::AuthError;
use super::guards;
use super::rate_limit::{self, RateLimitDecision};
use super::state::AuthConfig;
use super::types::UserEnvelope;
use crate::cache::SessionCache;

#[utoipa::path(
    get,
    path = "/current",
    responses(
        (status = 200, description = "Authenticated principal", body = UserEnvelope),
        (status = 401, description = "Not authenticated"),
        (status = 429, description = "Rate limit exceeded"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn current_user(
    pool: Extension<PgPool>,
    cache: Extension<SessionCache>,
    config: Extension<Arc<AuthConfig>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let principal = guards::require_authenticated(&headers, &pool, &cache, &config).await?;

    let status = match rate_limit::check(&cache, &config, principal.id).await? {
        RateLimitDecision::Allowed(status) => status,
        RateLimitDecision::Limited(status) => return Err(AuthError::RateLimited(status)),
    };

    Ok((
        StatusCode::OK,
        rate_limit::headers(&status),
        Json(UserEnvelope {
            message: "User retrieved successfully".to_string(),
            user: principal.into(),
        }),
    ))
}
