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
use super::types::MessageResponse;
use crate::cache::SessionCache;

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session destroyed, cookie cleared", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Session store failure"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(
    pool: Extension<PgPool>,
    cache: Extension<SessionCache>,
    config: Extension<Arc<AuthConfig>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let principal = guards::require_authenticated(&headers, &pool, &cache, &config).await?;

    session::destroy_session(&headers, &cache, &config).await?;
    info!(principal.id, "user logged out");

    // Clear the cookie even though the cache entry is already gone.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = session::clear_session_cookie(&config) {
        response_headers.insert(SET_COOKIE, cookie);
    }

    Ok((
        StatusCode::OK,
        response_headers,
        Json(MessageResponse {
            message: "User logged out successfully".to_string(),
        }),
    ))
}
