use crate::api;
use crate::api::handlers::auth::AuthConfig;
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub cache_url: String,
    pub cookie_secret: SecretString,
    pub base_url: String,
    pub session_ttl_seconds: i64,
    pub rate_limit: u32,
    pub rate_limit_window_seconds: i64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database or cache cannot be reached, or if the
/// server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let config = AuthConfig::new(args.base_url, args.cookie_secret)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_rate_limit(args.rate_limit)
        .with_rate_limit_window_seconds(args.rate_limit_window_seconds);

    api::serve(args.port, &args.dsn, &args.cache_url, config).await
}
