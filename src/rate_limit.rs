//! Per-client request rate limiting.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota};

use crate::Error;

/// How many requests one client may make within a time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// The most requests a client may make in one window.
    pub max_requests: NonZeroU32,
    /// The length of the window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: NonZeroU32::new(100).unwrap_or(NonZeroU32::MIN),
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Tracks the requests of each client IP address.
///
/// A client may use its whole allowance at once, after which it regains one
/// request every `window / max_requests`.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl RateLimiter {
    /// Create a rate limiter with no requests recorded.
    pub fn new(config: RateLimitConfig) -> Self {
        let quota = Quota::with_period(config.window / config.max_requests.get())
            .unwrap_or_else(|| Quota::per_second(config.max_requests))
            .allow_burst(config.max_requests);

        Self {
            limiter: Arc::new(DefaultKeyedRateLimiter::<IpAddr>::keyed(quota)),
        }
    }

    /// Record a request from `client` and return whether it is within the limit.
    pub fn check(&self, client: IpAddr) -> bool {
        self.limiter.check_key(&client).is_ok()
    }
}

/// Middleware that rejects requests from clients that are over the limit with
/// [Error::TooManyRequests].
///
/// Clients are told apart by the peer address, so the router must be served
/// with connect info. Requests without one share a single allowance.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !limiter.check(client) {
        tracing::warn!("Rate limit exceeded for {client}");
        return Error::TooManyRequests.into_response();
    }

    next.run(request).await
}
