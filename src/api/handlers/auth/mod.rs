//! Username/password authentication and session lifecycle.
//!
//! ## Flow
//!
//! Request → session resolution (signed cookie → cache → principal) →
//! route guard → handler. Login verifies credentials against the database,
//! rotates the session token, and writes the session to the cache; logout
//! destroys the cache entry and clears the cookie.
//!
//! ## User enumeration
//!
//! Unknown identifiers and wrong passwords share one `Invalid credentials`
//! answer, and the unknown-identifier path sleeps for a randomized 200–300 ms
//! so its latency matches a failed password verification.

pub(crate) mod current;
mod error;
mod guards;
pub(crate) mod login;
pub(crate) mod logout;
mod password;
mod rate_limit;
pub(crate) mod register;
mod session;
mod state;
mod storage;
mod strategy;
pub mod types;
mod utils;

pub use error::AuthError;
pub use guards::{
    current_principal, require_anonymous, require_authenticated, require_role, Principal,
};
pub use rate_limit::RateLimitStatus;
pub use state::AuthConfig;
