//! Authenticated user resolution for protected handlers.
//!
//! Flow Overview: read the session cookie, fingerprint the request, resolve the
//! token through the cache, then rotate it when it is old enough. A rotated
//! token travels back with the user so the handler can re-issue the session
//! cookie together with the CSRF cookie, keeping both on the same lifetime.

use axum::{
    extract::ConnectInfo,
    http::{HeaderMap, header::SET_COOKIE},
    response::Response,
};
use std::net::{IpAddr, SocketAddr};
use tracing::{error, warn};

use super::{
    cache::SessionData,
    cookies::{
        CSRF_COOKIE_NAME, CookieOptions, SESSION_COOKIE_NAME, csrf_cookie, extract_cookie,
        generate_csrf_token, session_cookie, token_prefix,
    },
    error::AuthError,
    fingerprint::session_fingerprint,
    state::{AuthConfig, AuthState},
    types::User,
};

/// User context derived from the session cookie.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub session: SessionData,
    /// Fresh token when the session was rotated during this request.
    pub rotated_token: Option<String>,
    /// CSRF cookie sent with the request, re-issued on rotation.
    pub csrf_token: Option<String>,
}

/// Resolve the session cookie into the current user.
///
/// # Errors
/// `SessionNotFound` without a cookie, `InvalidSession` when the provider
/// rejects the token, `SecurityViolation` on fingerprint mismatch and
/// `ProviderUnavailable` when Stytch is down with nothing cached.
pub async fn authenticate(
    state: &AuthState,
    headers: &HeaderMap,
    client_ip: Option<IpAddr>,
) -> Result<CurrentUser, AuthError> {
    let token = extract_cookie(headers, SESSION_COOKIE_NAME).ok_or(AuthError::SessionNotFound)?;
    let fingerprint = session_fingerprint(headers, client_ip);

    let session = state
        .cache()
        .validate(state.provider(), &token, &fingerprint)
        .await?
        .ok_or_else(|| {
            warn!("Invalid session token {}...", token_prefix(&token, 10));
            AuthError::InvalidSession
        })?;

    if session.fingerprint != fingerprint {
        warn!(
            "Session fingerprint mismatch for user {}: expected {}..., got {}...",
            session.user_id,
            token_prefix(&session.fingerprint, 8),
            token_prefix(&fingerprint, 8)
        );
        return Err(AuthError::SecurityViolation);
    }

    let rotated_token = state
        .cache()
        .rotate_if_needed(state.provider(), &token, &session)
        .await;

    Ok(CurrentUser {
        user: session.user(),
        session,
        rotated_token,
        csrf_token: extract_cookie(headers, CSRF_COOKIE_NAME),
    })
}

/// Peer address of the connection, when the server was started with connect info.
#[must_use]
pub fn peer_ip(connect_info: Option<ConnectInfo<SocketAddr>>) -> Option<IpAddr> {
    connect_info.map(|ConnectInfo(addr)| addr.ip())
}

/// Attach `Set-Cookie` headers for the rotated token, if any.
///
/// The CSRF cookie is re-issued with the same max-age so it never expires
/// before the session it protects. A missing CSRF cookie gets a fresh value.
pub fn with_rotated_cookie(
    mut response: Response,
    current: &CurrentUser,
    config: &AuthConfig,
) -> Response {
    let Some(token) = current.rotated_token.as_deref() else {
        return response;
    };
    let options = CookieOptions {
        max_age_seconds: config.cookie_max_age_seconds(),
        secure: config.is_production(),
    };
    match session_cookie(token, options) {
        Ok(cookie) => {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build rotated session cookie: {err}");
            return response;
        }
    }

    let csrf_value = match current.csrf_token.clone() {
        Some(value) => value,
        None => match generate_csrf_token() {
            Ok(value) => value,
            Err(err) => {
                error!("Failed to generate csrf token on rotation: {err}");
                return response;
            }
        },
    };
    match csrf_cookie(&csrf_value, options) {
        Ok(cookie) => {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build rotated csrf cookie: {err}"),
    }
    response
}
