//! Database access for user records.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::Instrument;

use super::types::{UserRole, UserStatus};
use super::utils::is_unique_violation;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, status::text AS status, role::text AS role, created_at";

/// Full user record. Only the strategy and this module ever see
/// `password_hash`; everything else works with a stripped principal.
#[derive(Debug, Clone)]
pub(super) struct User {
    pub(super) id: i64,
    pub(super) username: String,
    pub(super) email: String,
    pub(super) password_hash: String,
    pub(super) status: UserStatus,
    pub(super) role: UserRole,
    pub(super) created_at: DateTime<Utc>,
}

/// Outcome when attempting to insert a new user.
#[derive(Debug)]
pub(super) enum InsertOutcome {
    Created(User),
    Conflict,
}

/// Look up a user whose username or email exactly equals `identifier`.
pub(super) async fn find_by_identifier(pool: &PgPool, identifier: &str) -> Result<Option<User>> {
    let query =
        format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1 LIMIT 1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(identifier)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by identifier")?;

    row.map(map_user).transpose()
}

/// Look up a user by primary key, used to rehydrate a session principal.
pub(super) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by id")?;

    row.map(map_user).transpose()
}

/// Insert a user with a pre-hashed password. Uniqueness is enforced by the
/// database; a violated constraint surfaces as `Conflict`, not an error.
pub(super) async fn insert_user(
    pool: &PgPool,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<InsertOutcome> {
    let query = format!(
        "INSERT INTO users (email, username, password_hash) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(InsertOutcome::Created(map_user(row)?)),
        Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

fn map_user(row: PgRow) -> Result<User> {
    let status: String = row.get("status");
    let role: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        status: UserStatus::parse(&status)
            .ok_or_else(|| anyhow!("unknown user status: {status}"))?,
        role: UserRole::parse(&role).ok_or_else(|| anyhow!("unknown user role: {role}"))?,
        created_at: row.get("created_at"),
    })
}
