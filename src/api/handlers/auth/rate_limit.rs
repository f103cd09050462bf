//! Fixed-window rate limiting, keyed per principal in the session cache.

use anyhow::Result;
use axum::http::{HeaderMap, HeaderValue};

use super::state::AuthConfig;
use crate::cache::SessionCache;

const RATE_LIMIT_KEY_PREFIX: &str = "ratelimit:user:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Window length echoed on rejected requests only.
    pub reset_seconds: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RateLimitDecision {
    Allowed(RateLimitStatus),
    Limited(RateLimitStatus),
}

/// Count this request against the principal's current window.
///
/// The counter is created implicitly by `INCR`; the first hit in a window
/// arms the expiry that resets it.
pub(super) async fn check(
    cache: &SessionCache,
    config: &AuthConfig,
    principal_id: i64,
) -> Result<RateLimitDecision> {
    let key = format!("{RATE_LIMIT_KEY_PREFIX}{principal_id}");
    let window = config.rate_limit_window_seconds();

    let count = cache.incr(&key).await?;
    if count == 1 {
        // INCR and EXPIRE are separate round trips; a crash between the two
        // leaves a counter with no expiry.
        cache.expire(&key, window).await?;
    }

    Ok(decide(count, config.rate_limit(), window))
}

fn decide(count: i64, limit: u32, window_seconds: i64) -> RateLimitDecision {
    if count > i64::from(limit) {
        RateLimitDecision::Limited(RateLimitStatus {
            limit,
            remaining: 0,
            reset_seconds: Some(window_seconds),
        })
    } else {
        // count is in 1..=limit here, so the subtraction cannot wrap.
        let remaining = limit - u32::try_from(count).unwrap_or(limit);
        RateLimitDecision::Allowed(RateLimitStatus {
            limit,
            remaining,
            reset_seconds: None,
        })
    }
}

/// Render the `x-ratelimit-*` response headers for a decision.
pub(super) fn headers(status: &RateLimitStatus) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-ratelimit-remaining",
        HeaderValue::from(status.remaining),
    );
    headers.insert("x-ratelimit-limit", HeaderValue::from(status.limit));
    if let Some(reset) = status.reset_seconds {
        headers.insert("x-ratelimit-reset", HeaderValue::from(reset));
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_within_the_window_count_down() {
        for count in 1..=10 {
            let decision = decide(count, 10, 60);
            assert_eq!(
                decision,
                RateLimitDecision::Allowed(RateLimitStatus {
                    limit: 10,
                    remaining: 10 - u32::try_from(count).expect("small"),
                    reset_seconds: None,
                })
            );
        }
    }

    #[test]
    fn eleventh_request_is_limited() {
        let decision = decide(11, 10, 60);
        assert_eq!(
            decision,
            RateLimitDecision::Limited(RateLimitStatus {
                limit: 10,
                remaining: 0,
                reset_seconds: Some(60),
            })
        );
    }

    #[test]
    fn headers_for_allowed_requests_omit_reset() {
        let RateLimitDecision::Allowed(status) = decide(3, 10, 60) else {
            panic!("expected allowed");
        };
        let headers = headers(&status);
        assert_eq!(headers["x-ratelimit-remaining"], "7");
        assert_eq!(headers["x-ratelimit-limit"], "10");
        assert!(!headers.contains_key("x-ratelimit-reset"));
    }

    #[test]
    fn headers_for_limited_requests_include_reset() {
        let RateLimitDecision::Limited(status) = decide(11, 10, 60) else {
            panic!("expected limited");
        };
        let headers = headers(&status);
        assert_eq!(headers["x-ratelimit-remaining"], "0");
        assert_eq!(headers["x-ratelimit-limit"], "10");
        assert_eq!(headers["x-ratelimit-reset"], "60");
    }
}
