//! Session cookie handling and cache-backed session state.
//!
//! The cookie value is `<token>.<signature>` where the signature is an
//! HMAC-SHA256 over the token with the configured cookie secret. A missing or
//! badly signed cookie is treated as "no session", never as an error. The
//! cache stores the session payload under a hash of the token, keyed
//! `session:<hash>`, with the configured TTL; nothing is written for
//! anonymous traffic.

use anyhow::{anyhow, Context, Result};
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::state::AuthConfig;
use super::utils::{generate_session_token, hash_session_token};
use crate::cache::SessionCache;

pub(super) const SESSION_COOKIE_NAME: &str = "janua_session";
const SESSION_KEY_PREFIX: &str = "session:";

type HmacSha256 = Hmac<Sha256>;

/// Server-side session payload. The client only ever holds the opaque token.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub(super) struct SessionData {
    pub(super) user_id: i64,
    pub(super) created_at: i64,
}

fn session_key(token: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{}", hash_session_token(token))
}

fn sign_token(secret: &SecretString, token: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|err| anyhow!("invalid cookie secret: {err}"))?;
    mac.update(token.as_bytes());
    let signature = mac.finalize().into_bytes();
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(signature))
}

pub(super) fn cookie_value(secret: &SecretString, token: &str) -> Result<String> {
    let signature = sign_token(secret, token)?;
    Ok(format!("{token}.{signature}"))
}

/// Split and verify a `<token>.<signature>` cookie value.
///
/// Returns `None` for malformed values or bad signatures; the HMAC comparison
/// is constant-time.
pub(super) fn verify_cookie_value(secret: &SecretString, value: &str) -> Option<String> {
    let (token, signature) = value.rsplit_once('.')?;
    if token.is_empty() {
        return None;
    }
    let signature = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(signature)
        .ok()?;
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()).ok()?;
    mac.update(token.as_bytes());
    mac.verify_slice(&signature).ok()?;
    Some(token.to_string())
}

/// Resolve the session token from the request cookies.
///
/// Absent cookies and invalid signatures both mean "no session".
pub(super) fn extract_session_token(headers: &HeaderMap, config: &AuthConfig) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        // Flag-style pairs without `=` are skipped, not treated as no session.
        let Some((key, val)) = pair.trim().split_once('=') else {
            continue;
        };
        if key.trim() == SESSION_COOKIE_NAME {
            return verify_cookie_value(config.cookie_secret(), val.trim());
        }
    }
    None
}

/// Load the session state referenced by the request cookie, if any.
pub(super) async fn load_session(
    headers: &HeaderMap,
    cache: &SessionCache,
    config: &AuthConfig,
) -> Result<Option<SessionData>> {
    let Some(token) = extract_session_token(headers, config) else {
        return Ok(None);
    };
    let Some(payload) = cache.get(&session_key(&token)).await? else {
        return Ok(None);
    };
    // A payload that no longer parses is a stale entry, not a failure.
    Ok(serde_json::from_str(&payload).ok())
}

/// Create a fresh session for `user_id` and return the Set-Cookie header.
///
/// A new token is generated on every call, so logging in always rotates the
/// session identifier.
pub(super) async fn establish_session(
    cache: &SessionCache,
    config: &AuthConfig,
    user_id: i64,
) -> Result<HeaderValue> {
    let token = generate_session_token()?;
    let data = SessionData {
        user_id,
        created_at: Utc::now().timestamp(),
    };
    let payload = serde_json::to_string(&data).context("failed to serialize session")?;
    let ttl = u64::try_from(config.session_ttl_seconds().max(0))
        .context("session TTL out of range")?;
    cache.set_ex(&session_key(&token), &payload, ttl).await?;

    session_cookie(config, &token).context("failed to build session cookie")
}

/// Destroy the session referenced by the request cookie, if any.
/// Destroying an already-gone session is fine; logout is idempotent.
pub(super) async fn destroy_session(
    headers: &HeaderMap,
    cache: &SessionCache,
    config: &AuthConfig,
) -> Result<()> {
    if let Some(token) = extract_session_token(headers, config) {
        cache.del(&session_key(&token)).await?;
    }
    Ok(())
}

/// Build a signed `HttpOnly` cookie carrying the session token.
fn session_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue> {
    let value = cookie_value(config.cookie_secret(), token)?;
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).context("failed to encode session cookie")
}

pub(super) fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
