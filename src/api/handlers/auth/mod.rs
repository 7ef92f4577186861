//! Auth handlers and supporting modules.
//!
//! Identity is owned by Stytch. This module turns a Stytch session token into
//! an `HttpOnly` cookie session, validates it on every protected request and
//! proxies the MFA calls.
//!
//! ## Session Cache
//!
//! Validation results are cached per process, keyed by token and request
//! fingerprint:
//!
//! - **Soft window (5 min):** answered from memory.
//! - **Hard window (15 min):** revalidated; served stale only while Stytch is down.
//! - **Rotation (30 min):** the token is exchanged and the cookie re-issued.
//!
//! Cache entries are not shared between instances; logout only clears the
//! entries held by the instance that served it.

pub(crate) mod cache;
pub(crate) mod cookies;
mod error;
pub(crate) mod fingerprint;
pub(crate) mod mfa;
pub(crate) mod principal;
pub(crate) mod session;
mod state;
pub(crate) mod types;

pub use cache::{CacheWindows, SessionCache, SessionData};
pub use error::AuthError;
pub use principal::{CurrentUser, authenticate};
pub use state::{AuthConfig, AuthState};

#[cfg(test)]
pub(crate) mod test_support;
