//! Auth configuration shared across handlers.

use secrecy::SecretString;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_RATE_LIMIT: u32 = 10;
const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: i64 = 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    base_url: String,
    cookie_secret: SecretString,
    session_ttl_seconds: i64,
    rate_limit: u32,
    rate_limit_window_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(base_url: String, cookie_secret: SecretString) -> Self {
        Self {
            base_url,
            cookie_secret,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_limit_window_seconds: DEFAULT_RATE_LIMIT_WINDOW_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, limit: u32) -> Self {
        self.rate_limit = limit;
        self
    }

    #[must_use]
    pub fn with_rate_limit_window_seconds(mut self, seconds: i64) -> Self {
        self.rate_limit_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(super) fn cookie_secret(&self) -> &SecretString {
        &self.cookie_secret
    }

    pub(super) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(super) fn rate_limit(&self) -> u32 {
        self.rate_limit
    }

    pub(super) fn rate_limit_window_seconds(&self) -> i64 {
        self.rate_limit_window_seconds
    }

    pub(super) fn session_cookie_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> AuthConfig {
        AuthConfig::new(
            base_url.to_string(),
            SecretString::from("0123456789abcdef0123456789abcdef".to_string()),
        )
    }

    #[test]
    fn defaults_and_overrides() {
        let config = config("https://app.janua.dev");

        assert_eq!(config.base_url(), "https://app.janua.dev");
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.rate_limit(), DEFAULT_RATE_LIMIT);
        assert_eq!(
            config.rate_limit_window_seconds(),
            DEFAULT_RATE_LIMIT_WINDOW_SECONDS
        );

        let config = config
            .with_session_ttl_seconds(3600)
            .with_rate_limit(5)
            .with_rate_limit_window_seconds(30);

        assert_eq!(config.session_ttl_seconds(), 3600);
        assert_eq!(config.rate_limit(), 5);
        assert_eq!(config.rate_limit_window_seconds(), 30);
    }

    #[test]
    fn secure_cookie_only_for_https() {
        assert!(config("https://app.janua.dev").session_cookie_secure());
        assert!(!config("http://localhost:3000").session_cookie_secure());
    }
}
