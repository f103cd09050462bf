//! # Janua
//!
//! `janua` is a username/password authentication service backed by PostgreSQL
//! (credential store) and a Redis-style key-value cache (sessions and
//! rate-limit counters).
//!
//! ## Sessions
//!
//! Clients hold an opaque session token in a signed, `HttpOnly` cookie. The
//! server stores only a SHA-256 hash of the token as the cache key; the
//! session payload never leaves the cache.
//!
//! ## Authentication
//!
//! Login accepts a username or an email plus a password. Unknown identifiers
//! and wrong passwords return the same `Invalid credentials` answer, and the
//! unknown-identifier path is padded with a randomized delay so response
//! timing does not reveal whether an account exists.
//!
//! ## Rate limiting
//!
//! Authenticated endpoints are limited per principal with a fixed-window
//! counter in the cache (default 10 requests per 60 seconds).

pub mod api;
pub mod cache;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }
}
