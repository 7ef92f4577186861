//! Sliding-window rate limiting for `/auth/*`.
//!
//! Keys are `"{client_ip}:{path}"`; each key keeps the instants of its recent
//! requests. State is per process.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::api::error::detail;

const DEFAULT_LIMIT: usize = 10;
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
const RATE_LIMITED_PREFIX: &str = "/auth/";
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    hits: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a request for `key` unless it is already over the limit.
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();
        let mut hits = self.hits.lock().await;
        let recent = hits.entry(key.to_string()).or_default();
        recent.retain(|at| now.duration_since(*at) < self.window);

        if recent.len() >= self.limit {
            return RateLimitDecision::Limited;
        }
        recent.push(now);
        RateLimitDecision::Allowed
    }

    /// Forget keys without requests inside the window.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let window = self.window;
        let mut hits = self.hits.lock().await;
        let before = hits.len();
        hits.retain(|_, recent| {
            recent.retain(|at| now.duration_since(*at) < window);
            !recent.is_empty()
        });
        before - hits.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

/// Reject `/auth/*` requests over the per-client limit with 429.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !path.starts_with(RATE_LIMITED_PREFIX) {
        return next.run(request).await;
    }

    let client = connect_info.map_or_else(
        || UNKNOWN_CLIENT.to_string(),
        |ConnectInfo(addr)| addr.ip().to_string(),
    );
    let key = format!("{client}:{path}");

    match limiter.check(&key).await {
        RateLimitDecision::Allowed => next.run(request).await,
        RateLimitDecision::Limited => {
            warn!(client = %client, path = %path, "Rate limit exceeded");
            let mut response = detail(
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please try again later.",
            );
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(limiter.window().as_secs()));
            response
        }
    }
}
