use crate::{cache::SessionCache, GIT_COMMIT_HASH};
use axum::{
    extract::Extension,
    http::{Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgPool};
use tracing::{error, info_span, Instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
    cache: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database and session cache are healthy", body = Health),
        (status = 503, description = "Database or session cache is unhealthy", body = Health)
    ),
    tag = "health"
)]
pub async fn health(
    method: Method,
    pool: Extension<PgPool>,
    cache: Extension<SessionCache>,
) -> impl IntoResponse {
    let acquire_span = info_span!(
        "db.acquire",
        db.system = "postgresql",
        db.operation = "ACQUIRE"
    );
    let database_ok = match pool.0.acquire().instrument(acquire_span).await {
        Ok(mut conn) => {
            let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
            match conn.ping().instrument(ping_span).await {
                Ok(()) => true,
                Err(error) => {
                    error!("Failed to ping database: {}", error);
                    false
                }
            }
        }
        Err(error) => {
            error!("Failed to acquire database connection: {}", error);
            false
        }
    };

    let cache_ok = match cache.0.ping().await {
        Ok(()) => true,
        Err(error) => {
            error!("Failed to ping session cache: {}", error);
            false
        }
    };

    let status = if database_ok && cache_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_ok { "ok" } else { "error" }.to_string(),
        cache: if cache_ok { "ok" } else { "error" }.to_string(),
    };

    // Preflight OPTIONS gets headers only, GET gets the body.
    if method == Method::GET {
        (status, Json(health)).into_response()
    } else {
        status.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::Health;

    #[test]
    fn health_serializes_expected_fields() {
        let health = Health {
            commit: "abc1234".to_string(),
            name: "janua".to_string(),
            version: "0.1.0".to_string(),
            database: "ok".to_string(),
            cache: "error".to_string(),
        };

        let value = serde_json::to_value(&health).expect("serialize");
        assert_eq!(value["database"], "ok");
        assert_eq!(value["cache"], "error");
        assert_eq!(value["name"], "janua");
    }
}
