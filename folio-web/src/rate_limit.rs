//! Per-client request rate limiting
//!
//! Each client IP gets `max_requests` per `window`. The governor quota is a
//! burst of `max_requests` that refills evenly over the window, which is the
//! same allowance as a fixed window without the reset-boundary double burst.
//! This is a coarse abuse brake in front of the auth gate and the contact
//! endpoint, not a security boundary on its own.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use folio_common::{Error, Result};

pub const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests, please try again later.";

/// How a rejected request is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Plain text, for browser-facing admin pages
    Text,
    /// `{"success": false, "error": ...}`, for the contact form script
    Json,
}

/// A keyed limiter plus the response style used when it trips
pub struct ClientRateLimiter {
    name: &'static str,
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    rejection: Rejection,
}

/// A full allowance of `max_requests`, refilled one request per
/// `window / max_requests`
fn client_quota(name: &str, config: RateLimitConfig) -> Result<Quota> {
    let burst = NonZeroU32::new(config.max_requests)
        .ok_or_else(|| Error::Config(format!("{} rate limit must be at least 1", name)))?;
    let quota = Quota::with_period(config.window / config.max_requests)
        .ok_or_else(|| Error::Config(format!("{} rate limit window is too short", name)))?
        .allow_burst(burst);
    Ok(quota)
}

impl ClientRateLimiter {
    pub fn new(name: &'static str, config: RateLimitConfig, rejection: Rejection) -> Result<Self> {
        let quota = client_quota(name, config)?;

        Ok(Self {
            name,
            limiter: RateLimiter::keyed(quota),
            rejection,
        })
    }

    /// Record one request for `client`; `false` means over the limit
    pub fn check(&self, client: IpAddr) -> bool {
        self.limiter.check_key(&client).is_ok()
    }

    /// Forget clients whose allowance has fully refilled
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }

    fn reject(&self) -> Response {
        match self.rejection {
            Rejection::Json => ApiError::TooManyRequests.into_response(),
            Rejection::Text => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                TOO_MANY_REQUESTS_MESSAGE,
            )
                .into_response(),
        }
    }
}

/// Client address from the connection; requests built in tests have none
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Middleware applied with `from_fn_with_state(limiter, limit_requests)`
pub async fn limit_requests(
    State(limiter): State<Arc<ClientRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request);
    if !limiter.check(client) {
        warn!(
            "Rate limit exceeded on {} for {} ({} {})",
            limiter.name,
            client,
            request.method(),
            request.uri().path()
        );
        return limiter.reject();
    }
    next.run(request).await
}
