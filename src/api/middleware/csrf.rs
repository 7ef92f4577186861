//! Double-submit CSRF check for cookie-authenticated state changes.

use axum::{
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::api::{
    error::detail,
    handlers::auth::cookies::{
        CSRF_COOKIE_NAME, CSRF_HEADER_NAME, SESSION_COOKIE_NAME, csrf_tokens_match, extract_cookie,
    },
};

/// Establishing the session is what issues the CSRF cookie.
const EXEMPT_PATHS: [&str; 1] = ["/auth/session"];

/// Requests that change state and carry the session cookie must echo the
/// `csrf_token` cookie in `X-CSRF-Token`.
pub async fn csrf(request: Request, next: Next) -> Response {
    if !requires_csrf(request.method(), request.uri().path())
        || extract_cookie(request.headers(), SESSION_COOKIE_NAME).is_none()
    {
        return next.run(request).await;
    }

    let header_token = request
        .headers()
        .get(CSRF_HEADER_NAME)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let cookie_token = extract_cookie(request.headers(), CSRF_COOKIE_NAME).unwrap_or_default();

    if csrf_tokens_match(header_token, &cookie_token) {
        return next.run(request).await;
    }

    warn!(
        method = %request.method(),
        uri = %request.uri(),
        "CSRF validation failed"
    );
    detail(StatusCode::FORBIDDEN, "CSRF token missing or invalid")
}

fn requires_csrf(method: &Method, path: &str) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    ) && !EXEMPT_PATHS.contains(&path)
}
