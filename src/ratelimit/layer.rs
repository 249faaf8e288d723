// Per-surface rate-limit middleware

use axum::{
    extract::{Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::ratelimit::limiter::{RateLimitDecision, RateLimiter};
use crate::utils::response_handler::HandlerResponse;
use crate::utils::utils::{client_address, insert_prefixed_header};

pub const RATE_LIMIT_MESSAGE: &str = "You have exceeded your request rate";

/// Quota applied to one group of routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Names the route group in counter keys, e.g. `cp`
    pub scope: String,
    pub limit: u64,
    /// Window length in seconds
    pub period: u64,
    /// Prefix for the `RateLimit-*` headers
    pub header_prefix: String,
}

impl RateLimitPolicy {
    pub fn new(
        scope: impl Into<String>,
        limit: u64,
        period: u64,
        header_prefix: impl Into<String>,
    ) -> Self {
        Self {
            scope: scope.into(),
            limit,
            period,
            header_prefix: header_prefix.into(),
        }
    }

    /// Counter key for one client of this route group
    pub fn key(&self, client: &str) -> String {
        format!("{}/{}", self.scope, client)
    }
}

/// Middleware state: the shared limiter plus the policy of one route group
#[derive(Debug, Clone)]
pub struct RateLimitGuard {
    pub limiter: RateLimiter,
    pub policy: RateLimitPolicy,
}

impl RateLimitGuard {
    pub fn new(limiter: RateLimiter, policy: RateLimitPolicy) -> Self {
        Self { limiter, policy }
    }

    fn check(&self, parts: &Parts) -> RateLimitDecision {
        let key: String = self.policy.key(&client_address(parts));
        self.limiter.check(&key, self.policy.limit, self.policy.period)
    }

    fn apply_headers(&self, response: &mut Response, decision: &RateLimitDecision) {
        let prefix: &str = &self.policy.header_prefix;
        let headers = response.headers_mut();

        insert_prefixed_header(headers, prefix, "RateLimit-Remaining", &decision.remaining.to_string());
        insert_prefixed_header(headers, prefix, "RateLimit-Limit", &self.policy.limit.to_string());
        insert_prefixed_header(headers, prefix, "RateLimit-Reset", &decision.reset_at.to_string());
    }
}

/// Rejects requests over quota with 429 before any handler runs.
///
/// Every response that passes through carries the `RateLimit-*` headers.
pub async fn rate_limit_middleware(
    State(guard): State<RateLimitGuard>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let decision: RateLimitDecision = guard.check(&parts);

    let mut response: Response = if decision.allowed {
        next.run(Request::from_parts(parts, body)).await
    } else {
        warn!(
            scope = %guard.policy.scope,
            client = %client_address(&parts),
            reset_at = decision.reset_at,
            "Rejecting request over rate limit"
        );

        HandlerResponse::new(StatusCode::TOO_MANY_REQUESTS)
            .data(json!({
                "status": 429,
                "error": "too many requests",
                "message": RATE_LIMIT_MESSAGE
            }))
            .message(RATE_LIMIT_MESSAGE)
            .into_response()
    };

    guard.apply_headers(&mut response, &decision);
    response
}
