//! Session and CSRF cookie helpers.

use anyhow::{Context, Result};
use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};
use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use subtle::ConstantTimeEq;

pub const SESSION_COOKIE_NAME: &str = "stytch_session";
pub const CSRF_COOKIE_NAME: &str = "csrf_token";
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

#[derive(Clone, Copy, Debug)]
pub struct CookieOptions {
    pub max_age_seconds: u64,
    pub secure: bool,
}

/// `HttpOnly` session cookie carrying the Stytch session token.
pub fn session_cookie(
    token: &str,
    options: CookieOptions,
) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(SESSION_COOKIE_NAME, token, options, true)
}

/// CSRF cookie, readable by the SPA so it can echo it in `X-CSRF-Token`.
pub fn csrf_cookie(token: &str, options: CookieOptions) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(CSRF_COOKIE_NAME, token, options, false)
}

/// Expire a cookie with the same attributes it was set with.
pub fn clear_cookie(
    name: &str,
    http_only: bool,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(
        name,
        "",
        CookieOptions {
            max_age_seconds: 0,
            secure,
        },
        http_only,
    )
}

fn build_cookie(
    name: &str,
    value: &str,
    options: CookieOptions,
    http_only: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{name}={value}; Path=/; SameSite=Lax; Max-Age={}",
        options.max_age_seconds
    );
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if options.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read a cookie value from the `Cookie` header(s).
#[must_use]
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next()?.trim();
            let val = parts.next()?.trim();
            (key == name && !val.is_empty()).then(|| val.to_string())
        })
}

/// Create a random CSRF token (32 bytes, URL-safe base64).
pub fn generate_csrf_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate csrf token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Constant-time comparison of the submitted and cookie tokens.
#[must_use]
pub fn csrf_tokens_match(provided: &str, expected: &str) -> bool {
    if provided.is_empty() || provided.len() != expected.len() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Shorten a token for log lines.
#[must_use]
pub fn token_prefix(token: &str, len: usize) -> &str {
    token
        .char_indices()
        .nth(len)
        .map_or(token, |(index, _)| &token[..index])
}
