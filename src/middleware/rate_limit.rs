//! Global request rate limiting middleware.
//!
//! A single token bucket shared by every request:
//! 1. The bucket refills continuously at `per_second` tokens per second
//! 2. It never holds more than `burst` tokens
//! 3. Each request takes one token
//! 4. Requests that find the bucket empty are rejected with HTTP 429

use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Shared token bucket. Cloning shares the bucket.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<Bucket>>,
    per_second: f64,
    burst: f64,
}

impl RateLimiter {
    /// Create a limiter that starts with a full bucket.
    pub fn new(per_second: u32, burst: u32) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: burst,
                last_refill: Instant::now(),
            })),
            per_second: f64::from(per_second),
            burst,
        }
    }

    /// Take one token if available.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> bool {
        // Critical section never awaits; a poisoned lock still holds a valid bucket
        let mut bucket = self
            .bucket
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.per_second).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Rate limiting middleware function.
///
/// # Returns
///
/// - `Ok(Response)` if a token was available (calls next handler)
/// - `Err(AppError::RateLimited)` otherwise (returns 429)
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !limiter.try_acquire() {
        tracing::debug!(path = %request.uri().path(), "request rate limited");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}
