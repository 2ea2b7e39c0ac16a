//! Per-IP rate limiting for the API

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use attendance_shared::config::RateLimitSettings;

use crate::error::ApiError;
use crate::state::AppState;

/// Checks between sweeps of idle client keys.
const PRUNE_EVERY: u64 = 1024;

/// `max_requests` per `window_seconds` for each client address
pub struct IpRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    trust_forwarded: bool,
    checks: AtomicU64,
}

impl IpRateLimiter {
    /// `None` when the settings describe an empty quota.
    pub fn new(settings: &RateLimitSettings) -> Option<Self> {
        let burst = NonZeroU32::new(settings.max_requests)?;
        let period = Duration::from_secs(settings.window_seconds.max(1)) / burst.get();
        let quota = Quota::with_period(period)?.allow_burst(burst);
        Some(Self {
            limiter: RateLimiter::keyed(quota),
            trust_forwarded: settings.trust_forwarded,
            checks: AtomicU64::new(0),
        })
    }

    pub fn check(&self, ip: IpAddr) -> bool {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }
        self.limiter.check_key(&ip).is_ok()
    }

    /// Drops keys whose quota has fully replenished.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!("Rate limiter tracking {} clients", self.limiter.len());
    }

    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Socket peer, or the first `X-Forwarded-For` hop when the proxy is trusted.
    fn client_ip(&self, request: &Request) -> IpAddr {
        let forwarded = self
            .trust_forwarded
            .then(|| forwarded_for(request))
            .flatten();
        forwarded
            .or_else(|| {
                request
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        let ip = limiter.client_ip(&request);
        if !limiter.check(ip) {
            warn!("Rate limit exceeded for {}", ip);
            return ApiError::RateLimited.into_response();
        }
    }
    next.run(request).await
}

fn forwarded_for(request: &Request) -> Option<IpAddr> {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
}
