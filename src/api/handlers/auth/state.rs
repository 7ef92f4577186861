//! Auth state and configuration shared by the handlers.

use std::{sync::Arc, time::Duration};

use super::cache::{CacheWindows, SessionCache};
use crate::stytch::IdentityProvider;

const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_COOKIE_MAX_AGE_SECONDS: u64 = 60 * 60;
const DEFAULT_SMS_EXPIRATION_MINUTES: u32 = 10;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    environment: String,
    cookie_max_age_seconds: u64,
    sms_expiration_minutes: u32,
    cache_windows: CacheWindows,
}

impl AuthConfig {
    #[must_use]
    pub fn new(environment: String) -> Self {
        Self {
            environment,
            cookie_max_age_seconds: DEFAULT_COOKIE_MAX_AGE_SECONDS,
            sms_expiration_minutes: DEFAULT_SMS_EXPIRATION_MINUTES,
            cache_windows: CacheWindows::default(),
        }
    }

    #[must_use]
    pub fn with_cookie_max_age_seconds(mut self, seconds: u64) -> Self {
        self.cookie_max_age_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_sms_expiration_minutes(mut self, minutes: u32) -> Self {
        self.sms_expiration_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_cache_windows(mut self, windows: CacheWindows) -> Self {
        self.cache_windows = windows;
        self
    }

    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Cookies carry `Secure` only in production so local http dev keeps working.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    #[must_use]
    pub fn cookie_max_age_seconds(&self) -> u64 {
        self.cookie_max_age_seconds
    }

    #[must_use]
    pub fn sms_expiration_minutes(&self) -> u32 {
        self.sms_expiration_minutes
    }

    #[must_use]
    pub fn cache_windows(&self) -> CacheWindows {
        self.cache_windows
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENVIRONMENT.to_string())
    }
}

pub struct AuthState {
    config: AuthConfig,
    provider: Arc<dyn IdentityProvider>,
    cache: SessionCache,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        let cache = SessionCache::new(config.cache_windows());
        Self {
            config,
            provider,
            cache,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn provider(&self) -> &dyn IdentityProvider {
        self.provider.as_ref()
    }

    #[must_use]
    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Interval for the background sweeper.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        self.config.cache_windows().hard_ttl
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
