//! Rate limiting middleware using Governor.
//!
//! Implements per-client rate limiting with a token bucket algorithm.
//! Clients identify themselves with the `X-Client-Id` header. Buckets that
//! have refilled completely are dropped periodically, so the key space
//! does not grow with every client ever seen.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::{
    num::NonZeroU32,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use fx_types::ErrorResponse;

/// Header carrying the caller identity used as the rate limit key.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

const ANONYMOUS: &str = "anonymous";

/// Number of checks between two sweeps of idle buckets.
const PRUNE_EVERY: u64 = 1024;

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// One bucket per client key
    limiter: DefaultKeyedRateLimiter<String>,
    /// Checks since startup, drives the periodic sweep
    checks: AtomicU64,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RateLimiterState {
    /// Creates a new rate limiter state allowing `requests_per_minute` per client.
    ///
    /// A value of zero is treated as one.
    pub fn new(requests_per_minute: u32) -> Self {
        let burst = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(burst)),
            checks: AtomicU64::new(0),
        }
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        let allowed = self.limiter.check_key(&key.to_string()).is_ok();

        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_EVERY == 0 {
            self.prune();
        }
        allowed
    }

    /// Drops buckets that are indistinguishable from a fresh one.
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        tracing::debug!(before, after = self.limiter.len(), "Pruned rate limit buckets");
    }

    /// Number of client keys currently holding a bucket.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip rate limiting for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let key = request
        .headers()
        .get(CLIENT_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string();

    if !limiter.check(&key) {
        tracing::warn!(client = %key, "Rate limit exceeded");
        let status = StatusCode::TOO_MANY_REQUESTS;
        return (
            status,
            Json(ErrorResponse {
                error_kind: "RateLimited".into(),
                message: "Rate limit exceeded. Please try again later.".into(),
                code: status.as_u16(),
            }),
        )
            .into_response();
    }

    next.run(request).await
}
