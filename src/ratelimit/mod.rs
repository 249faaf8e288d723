//! Fixed-window rate limiting keyed by route group and client address.

pub mod layer;
pub mod limiter;

pub use layer::{rate_limit_middleware, RateLimitGuard, RateLimitPolicy, RATE_LIMIT_MESSAGE};
pub use limiter::{RateCounter, RateLimitDecision, RateLimiter};
