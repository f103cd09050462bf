use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, instrument};

use super::error::AuthError;
use super::guards;
use super::password;
use super::state::AuthConfig;
use super::storage::{self, InsertOutcome};
use super::types::{RegisterRequest, UserEnvelope};
use crate::cache::SessionCache;

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserEnvelope),
        (status = 400, description = "Missing required fields"),
        (status = 403, description = "Already signed in"),
        (status = 409, description = "Username or email already exists"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    pool: Extension<PgPool>,
    cache: Extension<SessionCache>,
    config: Extension<Arc<AuthConfig>>,
    headers: HeaderMap,
    payload: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    guards::require_anonymous(&headers, &pool, &cache, &config).await?;

    let Some(Json(request)) = payload else {
        return Err(AuthError::MissingFields);
    };

    let email = request.email.trim();
    let username = request.username.trim();
    let password = request.password.trim();
    if email.is_empty() || username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let password_hash = password::hash_password(password)?;

    match storage::insert_user(&pool, email, username, &password_hash).await? {
        InsertOutcome::Created(user) => {
            info!(user.id, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(UserEnvelope {
                    message: "User registered successfully".to_string(),
                    user: guards::Principal::from(user).into(),
                }),
            ))
        }
        InsertOutcome::Conflict => Err(AuthError::Conflict),
    }
}
