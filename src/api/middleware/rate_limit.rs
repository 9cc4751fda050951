//! Rate limiting middleware.
//!
//! Provides rate limiting for API endpoints using the governor crate.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter state
pub type RateLimiterState = Arc<
    RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
>;

const DEFAULT_REQUESTS_PER_MINUTE: u32 = 100;

/// Create a rate limiter with default settings (100 requests per minute)
pub fn create_rate_limiter() -> RateLimiterState {
    create_rate_limiter_with_quota(DEFAULT_REQUESTS_PER_MINUTE)
}

/// Create a rate limiter with custom quota
pub fn create_rate_limiter_with_quota(requests_per_minute: u32) -> RateLimiterState {
    let per_minute = NonZeroU32::new(requests_per_minute)
        .or(NonZeroU32::new(DEFAULT_REQUESTS_PER_MINUTE))
        .unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiterState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!("Rate limit exceeded for request: {}", request.uri());
            Err(StatusCode::TOO_MANY_REQUESTS)
        }
    }
}
