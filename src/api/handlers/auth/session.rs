//! Session endpoints: establish the cookie session, read it, clear it.

use axum::{
    Json,
    extract::{ConnectInfo, Extension},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info};

use super::{
    cache::build_session_data,
    cookies::{
        CSRF_COOKIE_NAME, CookieOptions, SESSION_COOKIE_NAME, clear_cookie, csrf_cookie,
        extract_cookie, generate_csrf_token, session_cookie, token_prefix,
    },
    error::AuthError,
    fingerprint::session_fingerprint,
    principal::{authenticate, peer_ip, with_rotated_cookie},
    state::AuthState,
    types::{AuthResponse, LogoutResponse, SessionEstablishRequest, SessionEstablishResponse},
};
use crate::api::error::{ErrorDetail, detail};

#[utoipa::path(
    post,
    path = "/auth/session",
    request_body = SessionEstablishRequest,
    responses(
        (status = 200, description = "Session established, cookies set", body = SessionEstablishResponse),
        (status = 401, description = "Authentication failed", body = ErrorDetail),
        (status = 503, description = "Stytch unavailable", body = ErrorDetail)
    ),
    tag = "auth"
)]
pub async fn establish(
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Json<SessionEstablishRequest>,
) -> impl IntoResponse {
    // Rejected tokens answer `Authentication`; only an outage is distinguished.
    let token = payload.session_token.trim();
    if token.is_empty() {
        return AuthError::Authentication.into_response();
    }

    let response = match auth_state.provider().authenticate_session(token, None).await {
        Ok(response) => response,
        Err(err) => {
            error!("Session establish error: {err}");
            return match AuthError::from(err) {
                AuthError::ProviderUnavailable => AuthError::ProviderUnavailable,
                _ => AuthError::Authentication,
            }
            .into_response();
        }
    };
    let Some(session) = response.valid_session() else {
        info!("Stytch returned no session for {}...", token_prefix(token, 10));
        return AuthError::Authentication.into_response();
    };

    let fingerprint = session_fingerprint(&headers, peer_ip(connect_info));
    let issued_at = session.started_at.unwrap_or_else(Utc::now);
    let data =
        build_session_data(auth_state.provider(), session, &fingerprint, issued_at).await;
    let user = data.user();
    auth_state.cache().store(token, data).await;

    let csrf_token = match generate_csrf_token() {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to generate csrf token: {err}");
            return detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    let config = auth_state.config();
    let options = CookieOptions {
        max_age_seconds: config.cookie_max_age_seconds(),
        secure: config.is_production(),
    };
    let (session_value, csrf_value) =
        match (session_cookie(token, options), csrf_cookie(&csrf_token, options)) {
            (Ok(session), Ok(csrf)) => (session, csrf),
            (Err(err), _) | (_, Err(err)) => {
                error!("Failed to build session cookies: {err}");
                return detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            }
        };

    info!("Session established for user {}", user.user_id);
    let mut response = (
        StatusCode::OK,
        Json(SessionEstablishResponse {
            success: true,
            user,
        }),
    )
        .into_response();
    let headers = response.headers_mut();
    headers.append(SET_COOKIE, session_value);
    headers.append(SET_COOKIE, csrf_value);
    response
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorDetail),
        (status = 503, description = "Stytch unavailable", body = ErrorDetail)
    ),
    tag = "auth"
)]
pub async fn me(
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    auth_state: Extension<Arc<AuthState>>,
) -> Response {
    let current = match authenticate(&auth_state, &headers, peer_ip(connect_info)).await {
        Ok(current) => current,
        Err(err) => return err.into_response(),
    };

    let response = (
        StatusCode::OK,
        Json(AuthResponse {
            user: current.user.clone(),
            authenticated: true,
        }),
    )
        .into_response();
    with_rotated_cookie(response, &current, auth_state.config())
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Cookies cleared", body = LogoutResponse)
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    if let Some(token) = extract_cookie(&headers, SESSION_COOKIE_NAME) {
        let removed = auth_state.cache().invalidate(&token).await;
        info!(
            "Logged out session {}... ({removed} cache entries dropped)",
            token_prefix(&token, 10)
        );
    }

    let secure = auth_state.config().is_production();
    let mut response = (
        StatusCode::OK,
        Json(LogoutResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
        .into_response();

    for (name, http_only) in [(SESSION_COOKIE_NAME, true), (CSRF_COOKIE_NAME, false)] {
        match clear_cookie(name, http_only, secure) {
            Ok(cookie) => {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
            Err(err) => error!("Failed to build clear cookie for {name}: {err}"),
        }
    }
    response
}
