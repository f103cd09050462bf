//! Principal resolution and route guards.
//!
//! Guards are explicit calls at the top of each handler rather than ambient
//! middleware state, so the auth requirement of a route is visible at its
//! definition. The first failing guard short-circuits the handler.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::error::AuthError;
use super::session;
use super::state::AuthConfig;
use super::storage::{self, User};
use super::types::{UserResponse, UserRole, UserStatus};
use crate::cache::SessionCache;

/// Authenticated identity attached to a request: a user record with the
/// secret fields stripped.
#[derive(Clone, Debug)]
pub struct Principal {
    pub(super) id: i64,
    pub(super) username: String,
    pub(super) email: String,
    pub(super) status: UserStatus,
    pub(super) role: UserRole,
    pub(super) created_at: DateTime<Utc>,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            status: user.status,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<Principal> for UserResponse {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username,
            email: principal.email,
            status: principal.status,
            role: principal.role,
            created_at: principal.created_at,
        }
    }
}

/// Resolve the request's principal, if any.
///
/// The principal is re-fetched from the database on every request; a session
/// pointing at a deleted, inactive, or banned user resolves to `None` rather
/// than an error.
pub async fn current_principal(
    headers: &HeaderMap,
    pool: &PgPool,
    cache: &SessionCache,
    config: &AuthConfig,
) -> Result<Option<Principal>, AuthError> {
    let Some(data) = session::load_session(headers, cache, config).await? else {
        return Ok(None);
    };
    let Some(user) = storage::find_by_id(pool, data.user_id).await? else {
        return Ok(None);
    };
    if user.status != UserStatus::Active {
        return Ok(None);
    }
    Ok(Some(user.into()))
}

/// Pass only when a principal is attached, else 401.
pub async fn require_authenticated(
    headers: &HeaderMap,
    pool: &PgPool,
    cache: &SessionCache,
    config: &AuthConfig,
) -> Result<Principal, AuthError> {
    current_principal(headers, pool, cache, config)
        .await?
        .ok_or(AuthError::Unauthorized)
}

/// Pass only when no principal is attached, else 403.
/// Blocks re-registration and re-login from an authenticated session.
pub async fn require_anonymous(
    headers: &HeaderMap,
    pool: &PgPool,
    cache: &SessionCache,
    config: &AuthConfig,
) -> Result<(), AuthError> {
    match current_principal(headers, pool, cache, config).await? {
        Some(_) => Err(AuthError::Forbidden),
        None => Ok(()),
    }
}

/// Pass only when the principal holds the required role, else 403.
pub fn require_role(principal: &Principal, role: UserRole) -> Result<(), AuthError> {
    if principal.role == role {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: UserRole) -> Principal {
        Principal {
            id: 1,
            username: "alice".to_string(),
            email: "a@b.com".to_string(),
            status: UserStatus::Active,
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn require_role_matches() {
        assert!(require_role(&principal(UserRole::Admin), UserRole::Admin).is_ok());
    }

    #[test]
    fn require_role_rejects_other_roles() {
        let result = require_role(&principal(UserRole::User), UserRole::Admin);
        assert!(matches!(result, Err(AuthError::Forbidden)));
    }

    #[test]
    fn principal_from_user_drops_the_hash() {
        let user = User {
            id: 7,
            username: "alice".to_string(),
            email: "a@b.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            status: UserStatus::Active,
            role: UserRole::User,
            created_at: Utc::now(),
        };

        let principal = Principal::from(user);
        let response = UserResponse::from(principal);
        let value = serde_json::to_value(&response).expect("serialize");
        assert!(value.get("password_hash").is_none());
        assert!(value.get("password").is_none());
        assert_eq!(value["id"], 7);
    }
}
