//! Rate limiting for the public mutating endpoints.
//!
//! [`RateLimiter`] is the seam the handlers throttle through: the in-memory
//! [`FixedWindowLimiter`] implements it today, and a shared external counter
//! (e.g. a key-value store with expiry) can replace it without changing
//! callers.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use postbox_core::error::CoreError;
use postbox_core::rate_limit::{FixedWindowLimiter, RateLimitDecision, RateLimitPolicy};

/// Sentinel key used when no client identity can be derived. Requests
/// without forwarding headers share one bucket rather than failing.
pub const UNKNOWN_CLIENT_KEY: &str = "unknown";

/// Swappable throttle checked by every public mutating handler.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check and count a request for `key` under `policy`.
    async fn check(&self, key: &str, policy: RateLimitPolicy) -> RateLimitDecision;
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn check(&self, key: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        FixedWindowLimiter::check(self, key, policy)
    }
}

/// Deny the request with [`CoreError::RateLimited`] when the budget is spent.
pub async fn enforce(
    limiter: &dyn RateLimiter,
    key: &str,
    policy: RateLimitPolicy,
) -> Result<(), CoreError> {
    let decision = limiter.check(key, policy).await;
    if decision.allowed {
        Ok(())
    } else {
        let retry_after_secs = decision.retry_after_secs.unwrap_or(1);
        tracing::warn!(key, retry_after_secs, "Rate limit exceeded");
        Err(CoreError::RateLimited { retry_after_secs })
    }
}

/// Client identity for rate limiting, derived from forwarding headers.
///
/// Prefers the first `x-forwarded-for` hop, falls back to `x-real-ip`, and
/// degrades to [`UNKNOWN_CLIENT_KEY`] -- extraction never fails a request.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = parts
            .headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let key = forwarded
            .or(real_ip)
            .unwrap_or(UNKNOWN_CLIENT_KEY)
            .to_string();

        Ok(ClientIp(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> ClientIp {
        let (mut parts, _) = request.into_parts();
        ClientIp::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn prefers_first_forwarded_hop() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.0, "203.0.113.7");
    }

    #[tokio::test]
    async fn falls_back_to_real_ip() {
        let request = Request::builder()
            .header("x-real-ip", "203.0.113.9")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.0, "203.0.113.9");
    }

    #[tokio::test]
    async fn degrades_to_unknown_without_headers() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await.0, UNKNOWN_CLIENT_KEY);
    }
}
