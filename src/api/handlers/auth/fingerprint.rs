//! Request fingerprint binding cached sessions to a client.

use axum::http::{HeaderMap, header::USER_AGENT};
use sha2::{Digest, Sha256};
use std::net::IpAddr;

/// `sha256_hex("{client_ip}:{x-forwarded-for}:{user-agent}")`, with empty
/// strings for anything missing.
#[must_use]
pub fn session_fingerprint(headers: &HeaderMap, client_ip: Option<IpAddr>) -> String {
    let user_agent = header_str(headers, USER_AGENT.as_str());
    let forwarded_for = header_str(headers, "x-forwarded-for");
    let client_ip = client_ip.map(|ip| ip.to_string()).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(format!("{client_ip}:{forwarded_for}:{user_agent}").as_bytes());
    format!("{:x}", hasher.finalize())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}
