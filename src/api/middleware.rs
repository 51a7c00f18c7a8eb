//! Authentication and rate limiting for the HTTP API.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

const DEFAULT_RATE_LIMIT: u32 = 100;
/// Tracked clients above which `acquire` sweeps expired windows.
const SWEEP_THRESHOLD: usize = 1024;

/// Security settings loaded from environment variables.
#[derive(Clone, Debug, Default)]
pub struct SecurityConfig {
    /// Bearer token required on every request (IDEA_SHAPER_API_KEY)
    pub api_key: Option<String>,
    /// Allowed CORS origins (IDEA_SHAPER_CORS_ORIGINS, comma-separated)
    pub cors_origins: Option<Vec<String>>,
    /// Per-IP limiter, active only when an API key is configured
    pub rate_limiter: Option<RateLimiter>,
}

impl SecurityConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var("IDEA_SHAPER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let cors_origins = std::env::var("IDEA_SHAPER_CORS_ORIGINS").ok().map(|s| {
            s.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        });

        let rate_limit = std::env::var("IDEA_SHAPER_RATE_LIMIT")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT);

        // Remote deployments set a key; local use stays unthrottled.
        let rate_limiter = api_key
            .as_ref()
            .map(|_| RateLimiter::new(rate_limit, Duration::from_secs(60)));

        Self {
            api_key,
            cors_origins,
            rate_limiter,
        }
    }

    /// No authentication, permissive CORS (local development and tests).
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn with_rate_limit(mut self, max_requests: u32) -> Self {
        self.rate_limiter = Some(RateLimiter::new(max_requests, Duration::from_secs(60)));
        self
    }
}

/// Fixed-window request counter per client IP.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Arc<Mutex<HashMap<IpAddr, Window>>>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    used: u32,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one request from `ip`. When the window is exhausted, returns
    /// how long until it reopens.
    pub fn acquire(&self, ip: IpAddr) -> Result<(), Duration> {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter lock poisoned");
        if windows.len() >= SWEEP_THRESHOLD && !windows.contains_key(&ip) {
            self.sweep(&mut windows, now);
        }
        let window = windows.entry(ip).or_insert(Window { opened: now, used: 0 });

        let elapsed = now.duration_since(window.opened);
        if elapsed >= self.window {
            *window = Window { opened: now, used: 0 };
        }

        if window.used >= self.limit {
            return Err(self.window.saturating_sub(now.duration_since(window.opened)));
        }
        window.used += 1;
        Ok(())
    }

    /// Forget clients whose window has closed. Returns how many were dropped.
    pub fn cleanup(&self) -> usize {
        let mut windows = self.windows.lock().expect("rate limiter lock poisoned");
        self.sweep(&mut windows, Instant::now())
    }

    fn sweep(&self, windows: &mut HashMap<IpAddr, Window>, now: Instant) -> usize {
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.opened) < self.window);
        let dropped = before - windows.len();
        if dropped > 0 {
            tracing::debug!("Dropped {} expired rate limit windows", dropped);
        }
        dropped
    }
}

pub async fn auth_middleware(
    State(config): State<SecurityConfig>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected_key) = &config.api_key else {
        return Ok(next.run(request).await);
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match auth_header.map(|h| h.strip_prefix("Bearer ")) {
        Some(Some(token)) if token == expected_key.as_str() => Ok(next.run(request).await),
        Some(Some(_)) => {
            tracing::warn!("Invalid API key provided");
            Err(StatusCode::UNAUTHORIZED)
        }
        Some(None) => {
            tracing::warn!("Invalid Authorization header format");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = extract_client_ip(&request);

    match limiter.acquire(ip) {
        Ok(()) => next.run(request).await,
        Err(wait) => {
            tracing::warn!("Rate limit exceeded for {} (retry in {}s)", ip, wait.as_secs());
            let retry_after = wait.as_secs().max(1).to_string();
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after)],
            )
                .into_response()
        }
    }
}

/// Client IP from proxy headers, falling back to localhost.
fn extract_client_ip(request: &Request<Body>) -> IpAddr {
    let header_ip = |name: &str| -> Option<IpAddr> {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse().ok())
    };

    header_ip("X-Forwarded-For")
        .or_else(|| header_ip("X-Real-IP"))
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
