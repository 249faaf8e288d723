// Landing handlers

use axum::http::StatusCode;
use serde_json::json;
use tracing::instrument;

use crate::utils::response_handler::HandlerResponse;

/// Every rule served under `/api/1.0`, as `METHOD path`
pub const ENDPOINTS: [&str; 34] = [
    "GET /api/1.0",
    "GET /api/1.0/teapot",
    "GET /api/1.0/tags",
    "POST /api/1.0/tags",
    "GET /api/1.0/tags/{id}",
    "PUT /api/1.0/tags/{id}",
    "DELETE /api/1.0/tags/{id}",
    "GET /api/1.0/organizations",
    "POST /api/1.0/organizations",
    "GET /api/1.0/organizations/{id}",
    "PUT /api/1.0/organizations/{id}",
    "DELETE /api/1.0/organizations/{id}",
    "GET /api/1.0/vulnerabilities",
    "POST /api/1.0/vulnerabilities",
    "GET /api/1.0/vulnerabilities/{id}",
    "PUT /api/1.0/vulnerabilities/{id}",
    "DELETE /api/1.0/vulnerabilities/{id}",
    "GET /api/1.0/fqdns",
    "POST /api/1.0/fqdns",
    "PUT /api/1.0/fqdns",
    "GET /api/1.0/fqdns/{fqdn}",
    "PUT /api/1.0/fqdns/{id}",
    "DELETE /api/1.0/fqdns/{id}",
    "GET /api/1.0/deliverables",
    "POST /api/1.0/deliverables",
    "PUT /api/1.0/deliverables",
    "GET /api/1.0/deliverables/{id}",
    "PUT /api/1.0/deliverables/{id}",
    "DELETE /api/1.0/deliverables/{id}",
    "GET /api/1.0/files",
    "POST /api/1.0/files",
    "PUT /api/1.0/files",
    "GET /api/1.0/files/{id}",
    "DELETE /api/1.0/files/{id}",
];

/// Lists the available endpoints
#[instrument]
pub async fn index() -> HandlerResponse {
    HandlerResponse::new(StatusCode::OK).data(json!({ "endpoints": &ENDPOINTS[..] }))
}

#[instrument]
pub async fn teapot() -> HandlerResponse {
    HandlerResponse::new(StatusCode::IM_A_TEAPOT).message("I'm a teapot")
}
