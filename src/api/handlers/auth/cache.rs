//! In-memory session validation cache.
//!
//! Flow Overview:
//! 1) Entries are keyed by `token:fingerprint` and hold the resolved user.
//! 2) Younger than the soft window: served without calling Stytch.
//! 3) Older: revalidated. If Stytch is unreachable the stale entry is served
//!    until the hard window, then the outage is surfaced.
//! 4) Tokens older than the rotation age are exchanged for a fresh one.
//!
//! Unbounded and per process; the sweeper drops entries past the hard window.

use chrono::{DateTime, TimeDelta, Utc};
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::{cookies::token_prefix, error::AuthError, types::User};
use crate::stytch::{IdentityProvider, types::Session};

const SOFT_TTL: Duration = Duration::from_secs(5 * 60);
const HARD_TTL: Duration = Duration::from_secs(15 * 60);
const ROTATION_AGE: Duration = Duration::from_secs(30 * 60);
const SESSION_DURATION_MINUTES: u32 = 60;
const PLACEHOLDER_EMAIL_DOMAIN: &str = "stytch.local";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheWindows {
    /// Cached results younger than this skip the provider.
    pub soft_ttl: Duration,
    /// Stale results are never served past this age.
    pub hard_ttl: Duration,
    /// Tokens older than this are rotated.
    pub rotation_age: Duration,
    /// Session lifetime requested from Stytch when rotating.
    pub session_duration_minutes: u32,
}

impl Default for CacheWindows {
    fn default() -> Self {
        Self {
            soft_ttl: SOFT_TTL,
            hard_ttl: HARD_TTL,
            rotation_age: ROTATION_AGE,
            session_duration_minutes: SESSION_DURATION_MINUTES,
        }
    }
}

/// What a validated session resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub fingerprint: String,
    pub session_id: String,
    /// When the current token was issued (session start, or last rotation).
    pub token_issued_at: DateTime<Utc>,
}

impl SessionData {
    #[must_use]
    pub fn user(&self) -> User {
        User {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    data: SessionData,
    cached_at: Instant,
}

impl CacheEntry {
    fn new(data: SessionData) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
        }
    }
}

#[derive(Debug)]
pub struct SessionCache {
    windows: CacheWindows,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl SessionCache {
    #[must_use]
    pub fn new(windows: CacheWindows) -> Self {
        Self {
            windows,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn key(token: &str, fingerprint: &str) -> String {
        format!("{token}:{fingerprint}")
    }

    /// Resolve a session token for a fingerprint.
    ///
    /// Returns `Ok(None)` when the provider rejects the token.
    ///
    /// # Errors
    /// Returns `AuthError::ProviderUnavailable` when Stytch cannot be reached and
    /// no entry within the hard window exists.
    pub async fn validate(
        &self,
        provider: &dyn IdentityProvider,
        token: &str,
        fingerprint: &str,
    ) -> Result<Option<SessionData>, AuthError> {
        let key = Self::key(token, fingerprint);
        let previous = self.entries.read().await.get(&key).cloned();

        if let Some(entry) = &previous
            && entry.cached_at.elapsed() < self.windows.soft_ttl
        {
            debug!("Session cache hit for {}...", token_prefix(token, 10));
            return Ok(Some(entry.data.clone()));
        }

        match provider.authenticate_session(token, None).await {
            Ok(response) => {
                let Some(session) = response.valid_session() else {
                    warn!("Stytch returned no session for {}...", token_prefix(token, 10));
                    self.entries.write().await.remove(&key);
                    return Ok(None);
                };

                // Keep the issue time across revalidations so rotation is not re-triggered.
                let token_issued_at = previous
                    .as_ref()
                    .map(|entry| entry.data.token_issued_at)
                    .or(session.started_at)
                    .unwrap_or_else(Utc::now);
                let data = build_session_data(provider, session, fingerprint, token_issued_at).await;

                self.entries
                    .write()
                    .await
                    .insert(key, CacheEntry::new(data.clone()));
                Ok(Some(data))
            }
            Err(err) if err.is_unavailable() => {
                if let Some(entry) = previous
                    && entry.cached_at.elapsed() < self.windows.hard_ttl
                {
                    warn!("Session validation error, serving cached session: {err}");
                    return Ok(Some(entry.data));
                }
                error!("Session validation error: {err}");
                self.entries.write().await.remove(&key);
                Err(AuthError::ProviderUnavailable)
            }
            Err(err) => {
                info!("Session rejected by Stytch: {err}");
                self.entries.write().await.remove(&key);
                Ok(None)
            }
        }
    }

    /// Insert a freshly validated session.
    pub async fn store(&self, token: &str, data: SessionData) {
        let key = Self::key(token, &data.fingerprint);
        self.entries.write().await.insert(key, CacheEntry::new(data));
    }

    /// Exchange the token for a fresh one once it is older than the rotation age.
    ///
    /// Returns the new token when Stytch issued one. Failures are logged and the
    /// current token stays in use.
    pub async fn rotate_if_needed(
        &self,
        provider: &dyn IdentityProvider,
        token: &str,
        data: &SessionData,
    ) -> Option<String> {
        let age = Utc::now().signed_duration_since(data.token_issued_at);
        let threshold = TimeDelta::from_std(self.windows.rotation_age).unwrap_or(TimeDelta::MAX);
        if age < threshold {
            return None;
        }

        info!("Rotating session token {}...", token_prefix(token, 10));
        let response = match provider
            .authenticate_session(token, Some(self.windows.session_duration_minutes))
            .await
        {
            Ok(response) if response.valid_session().is_some() => response,
            Ok(_) => {
                warn!("Session rotation returned no session");
                return None;
            }
            Err(err) => {
                error!("Session rotation error: {err}");
                return None;
            }
        };

        let mut rotated = data.clone();
        rotated.token_issued_at = Utc::now();

        let old_key = Self::key(token, &data.fingerprint);
        let mut entries = self.entries.write().await;
        let new_token = response.session_token;
        if new_token.is_empty() || new_token == token {
            // Extended in place: reset the clock so the next request does not rotate again.
            entries.insert(old_key, CacheEntry::new(rotated));
            return None;
        }

        entries.remove(&old_key);
        entries.insert(
            Self::key(&new_token, &data.fingerprint),
            CacheEntry::new(rotated),
        );
        Some(new_token)
    }

    /// Drop every entry for a token, whatever the fingerprint.
    pub async fn invalidate(&self, token: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        // Fingerprints are hex, so the last `:` always ends the token.
        entries.retain(|key, _| {
            !key
                .rsplit_once(':')
                .is_some_and(|(cached_token, _)| cached_token == token)
        });
        before - entries.len()
    }

    /// Drop entries that can no longer be served.
    pub async fn purge_expired(&self) -> usize {
        let hard_ttl = self.windows.hard_ttl;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.cached_at.elapsed() < hard_ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Resolve profile details for a validated session.
///
/// A failed user lookup falls back to a placeholder email so authentication
/// does not depend on the profile endpoint.
pub async fn build_session_data(
    provider: &dyn IdentityProvider,
    session: &Session,
    fingerprint: &str,
    token_issued_at: DateTime<Utc>,
) -> SessionData {
    let placeholder = format!("{}@{PLACEHOLDER_EMAIL_DOMAIN}", session.user_id);
    let (email, name) = match provider.get_user(&session.user_id).await {
        Ok(user) => (
            user.primary_email().map_or(placeholder, str::to_string),
            user.display_name(),
        ),
        Err(err) => {
            error!("User details fetch error: {err}");
            (placeholder, None)
        }
    };

    SessionData {
        user_id: session.user_id.clone(),
        email,
        name,
        fingerprint: fingerprint.to_string(),
        session_id: session.session_id.clone(),
        token_issued_at,
    }
}
