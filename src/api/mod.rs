/*
* HTTP surfaces.
*
* `/api/1.0` serves analysts, `/cp/1.0` serves the customer portal. Each
* surface has its own rate-limit quota, header prefix and audit module name.
*/

use std::time::Duration;
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        HeaderName, HeaderValue, Method,
    },
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::config::environment::EnvironmentVariables;
use crate::config::state::AppState;
use crate::ratelimit::{rate_limit_middleware, RateLimitGuard};

pub mod cp;
pub mod deliverables;
pub mod files;
pub mod fqdns;
pub mod index;
pub mod middleware;
pub mod organizations;
pub mod tags;
pub mod vulnerabilities;

use middleware::{audit_middleware, customer::ORGANIZATION_HEADER, require_json_middleware, AuditConfig};

pub const DO_PREFIX: &str = "/api/1.0";
pub const CP_PREFIX: &str = "/cp/1.0";

const CORS_MAX_AGE_SECONDS: u64 = 21600;

/// Analyst API, rate limited and audited under the `api` module
pub fn do_routes(state: &AppState) -> Router<AppState> {
    let guard: RateLimitGuard = RateLimitGuard::new(state.rate_limiter.clone(), state.do_rate_limit());
    let audit: AuditConfig = AuditConfig::new("api", state.environment.max_request_body_size);

    Router::new()
        .merge(index::index_routes())
        .merge(tags::tag_routes())
        .merge(organizations::organization_routes())
        .merge(vulnerabilities::vulnerability_routes())
        .merge(fqdns::fqdn_routes())
        .merge(deliverables::deliverable_routes())
        .merge(files::file_routes())
        .layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(audit, audit_middleware))
                .layer(from_fn_with_state(guard, rate_limit_middleware))
                .layer(from_fn(require_json_middleware)),
        )
}

/// Customer portal API, reachable from the portal front end through CORS
pub fn cp_routes(state: &AppState) -> Router<AppState> {
    let guard: RateLimitGuard = RateLimitGuard::new(state.rate_limiter.clone(), state.cp_rate_limit());
    let audit: AuditConfig = AuditConfig::new("cp", state.environment.max_request_body_size);

    cp::cp_resource_routes().layer(
        ServiceBuilder::new()
            .layer(cp_cors_layer(&state.environment))
            .layer(from_fn_with_state(audit, audit_middleware))
            .layer(from_fn_with_state(guard, rate_limit_middleware))
            .layer(from_fn(require_json_middleware)),
    )
}

/// Allows credentialed requests from the portal front end only
pub fn cp_cors_layer(env: &EnvironmentVariables) -> CorsLayer {
    let origins: Vec<HeaderValue> = match HeaderValue::from_str(env.cp_server.trim_end_matches('/')) {
        Ok(origin) => vec![origin],
        Err(_) => {
            warn!("CP_SERVER '{}' is not a valid origin, cross-origin requests are refused", env.cp_server);
            Vec::new()
        }
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            AUTHORIZATION,
            ORIGIN,
            HeaderName::from_static(ORGANIZATION_HEADER),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(CORS_MAX_AGE_SECONDS))
}
