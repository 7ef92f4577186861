//! Stytch consumer API client.
//!
//! Session issuance, token rotation and MFA factor checks are decided by
//! Stytch; this module only calls the HTTP API and reshapes the answers.
//! Handlers talk to it through [`IdentityProvider`] so tests can swap in a
//! fake.

mod client;
mod error;
pub mod types;

pub use client::Client;
pub use error::Error;

use secrecy::SecretString;
use std::{future::Future, pin::Pin};
use types::{SessionAuthenticateResponse, SmsSendResponse, User};

const LIVE_BASE_URL: &str = "https://api.stytch.com";
const TEST_BASE_URL: &str = "https://test.stytch.com";

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 'a>>;

/// Operations the API needs from the identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Validate a session token. Passing `session_duration_minutes` extends the
    /// session and may hand back a fresh token.
    fn authenticate_session<'a>(
        &'a self,
        session_token: &'a str,
        session_duration_minutes: Option<u32>,
    ) -> ProviderFuture<'a, SessionAuthenticateResponse>;

    fn get_user<'a>(&'a self, user_id: &'a str) -> ProviderFuture<'a, User>;

    fn send_sms_otp<'a>(
        &'a self,
        user_id: &'a str,
        phone_number: &'a str,
        expiration_minutes: u32,
    ) -> ProviderFuture<'a, SmsSendResponse>;

    fn authenticate_otp<'a>(&'a self, method_id: &'a str, code: &'a str)
    -> ProviderFuture<'a, ()>;

    fn authenticate_totp<'a>(&'a self, user_id: &'a str, code: &'a str) -> ProviderFuture<'a, ()>;
}

#[derive(Clone)]
pub struct Config {
    project_id: String,
    secret: SecretString,
    base_url: Option<String>,
}

impl Config {
    #[must_use]
    pub fn new(project_id: String, secret: SecretString) -> Self {
        Self {
            project_id,
            secret,
            base_url: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Explicit base URL, otherwise derived from the project id: test projects
    /// (`project-test-*`) talk to the test environment.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if self.project_id.starts_with("project-test-") => TEST_BASE_URL.to_string(),
            None => LIVE_BASE_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("project_id", &self.project_id)
            .field("secret", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_follows_project_environment() {
        let test = Config::new("project-test-123".to_string(), SecretString::from("s"));
        assert_eq!(test.base_url(), "https://test.stytch.com");

        let live = Config::new("project-live-123".to_string(), SecretString::from("s"));
        assert_eq!(live.base_url(), "https://api.stytch.com");

        let custom = live.with_base_url(Some("http://127.0.0.1:9999/".to_string()));
        assert_eq!(custom.base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn debug_hides_secret() {
        let config = Config::new(
            "project-test-123".to_string(),
            SecretString::from("super-secret"),
        );
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("***"));
    }
}
