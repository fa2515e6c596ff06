//! Fixed-window per-IP rate limiting for the `/auth` routes.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use tracing::warn;

use crate::auth::ServerState;
use crate::errors::ApiError;

pub const AUTH_MAX_REQUESTS: u32 = 100;
pub const AUTH_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Every this many `allow` calls, expired windows are evicted so the map
/// tracks only recently seen clients instead of growing with every
/// distinct IP ever observed.
const SWEEP_INTERVAL: u64 = 1024;

/// Per-client fixed window counter. The first request in a window stamps
/// its start; counts reset when the window elapses.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    windows: Arc<DashMap<IpAddr, (Instant, u32)>>,
    calls: Arc<AtomicU64>,
    max_requests: u32,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            calls: Arc::new(AtomicU64::new(0)),
            max_requests,
            window,
        }
    }

    pub fn allow(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        // Sweep before taking the entry lock; retain and entry must not
        // overlap on the same shard
        if self.calls.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.windows.retain(|_, (start, _)| now.duration_since(*start) < self.window);
        }

        let mut entry = self.windows.entry(ip).or_insert((now, 0));
        let (start, count) = *entry;
        if now.duration_since(start) >= self.window {
            *entry = (now, 1);
            return true;
        }
        if count >= self.max_requests {
            return false;
        }
        *entry = (start, count + 1);
        true
    }
}

fn client_ip<B>(req: &Request<B>) -> IpAddr {
    // Honour the first hop of x-forwarded-for when running behind a proxy
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
    {
        return forwarded;
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn limit_auth_requests(
    State(state): State<ServerState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    if !state.auth_limiter.allow(ip) {
        warn!(client_ip = %ip, "auth rate limit exceeded");
        return ApiError::TooManyRequests.into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn allows_up_to_the_limit_then_denies() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.allow(ip(1)));
        assert!(limiter.allow(ip(1)));
        assert!(limiter.allow(ip(1)));
        assert!(!limiter.allow(ip(1)));
        // Other clients keep their own budget
        assert!(limiter.allow(ip(2)));
    }

    #[test]
    fn window_elapse_resets_the_count() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_millis(10));
        assert!(limiter.allow(ip(3)));
        assert!(!limiter.allow(ip(3)));
        std::thread::sleep(Duration::from_millis(15));
        assert!(limiter.allow(ip(3)));
    }

    #[test]
    fn expired_windows_are_evicted() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_millis(5));
        for last in 1..=20 {
            limiter.allow(ip(last));
        }
        assert_eq!(limiter.windows.len(), 20);
        std::thread::sleep(Duration::from_millis(10));

        // Enough traffic from one client to cross a sweep boundary
        for _ in 0..SWEEP_INTERVAL {
            limiter.allow(ip(99));
        }
        assert!(limiter.windows.len() <= 2, "stale windows kept: {}", limiter.windows.len());
    }

    #[test]
    fn forwarded_header_wins_over_socket_addr() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req), "203.0.113.9".parse::<IpAddr>().unwrap());
    }
}
