//! # SaaS Template API
//!
//! `saas-api` is the backend for the SaaS template. Identity is delegated to
//! Stytch: the browser obtains a Stytch session token, hands it to
//! `POST /auth/session`, and from then on authenticates with the
//! `stytch_session` cookie.
//!
//! ## Session Validation Cache
//!
//! Every authenticated request resolves the cookie through an in-memory cache
//! keyed by `token:fingerprint` (the fingerprint hashes peer address,
//! `X-Forwarded-For` and `User-Agent`).
//!
//! - **Soft expiry (5 min):** cached results are served without calling Stytch.
//! - **Hard expiry (15 min):** past the soft window the session is revalidated;
//!   a stale entry is only served while Stytch is unreachable and the entry is
//!   younger than this.
//! - **Rotation (30 min):** tokens older than this are exchanged for a fresh
//!   one and the cookie is re-issued.
//!
//! The cache is volatile and per process.
//!
//! ## Request Guards
//!
//! `/auth/*` is rate limited per client address and path, and cookie
//! authenticated state-changing requests must echo the `csrf_token` cookie in
//! the `X-CSRF-Token` header.

pub mod api;
pub mod cli;
pub mod db;
pub mod stytch;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
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

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
