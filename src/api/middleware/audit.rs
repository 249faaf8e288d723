// Request audit trail: one `key="value"` line per request on the `audit` target

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{MatchedPath, Request, State},
    http::{request::Parts, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crate::utils::response_handler::HandlerResponse;
use crate::utils::utils::{addslashes, client_address, original_uri, request_origin};

const MASKED_PASSWORD: &str = "*********";
const ANONYMOUS: &str = "anonymous";

/// Who made the request, as established by an authentication layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    pub email: String,
}

/// Middleware state: the route group being audited and the body size cap
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub module: &'static str,
    pub max_body_size: usize,
}

impl AuditConfig {
    pub fn new(module: &'static str, max_body_size: usize) -> Self {
        Self { module, max_body_size }
    }
}

/// One audited request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub module: String,
    pub user: String,
    pub email: String,
    pub action: &'static str,
    pub data: String,
    pub url: String,
    pub endpoint: String,
    pub ip: String,
    pub status: String,
    pub timestamp: String,
}

impl AuditEntry {
    pub fn to_line(&self) -> String {
        [
            ("module", self.module.as_str()),
            ("user", self.user.as_str()),
            ("email", self.email.as_str()),
            ("action", self.action),
            ("data", self.data.as_str()),
            ("url", self.url.as_str()),
            ("endpoint", self.endpoint.as_str()),
            ("ip", self.ip.as_str()),
            ("status", self.status.as_str()),
            ("timestamp", self.timestamp.as_str()),
        ]
        .iter()
        .map(|(key, value)| format!("{key}=\"{value}\""))
        .collect::<Vec<String>>()
        .join(" ")
    }
}

/// Audit verb for a request method.
/// A `PUT` without path parameters targets the collection, which creates.
pub fn audit_action(method: &Method, has_path_params: bool) -> &'static str {
    match *method {
        Method::POST => "add",
        Method::PUT if !has_path_params => "add",
        Method::PUT | Method::PATCH => "edit",
        Method::GET | Method::HEAD => "view",
        Method::DELETE => "delete",
        Method::OPTIONS => "options",
        _ => "unknown",
    }
}

/// JSON body with any `password` field masked, escaped for the audit line.
/// Bodies that are not JSON are not recorded.
pub fn audit_data(body: &[u8]) -> String {
    let mut value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => return String::new(),
    };

    if let Some(password) = value.get_mut("password") {
        *password = Value::String(MASKED_PASSWORD.to_string());
    }

    addslashes(&value.to_string())
}

fn status_line(status: StatusCode) -> String {
    format!("{} {}", status.as_u16(), status.canonical_reason().unwrap_or_default())
}

fn request_entry(module: &str, parts: &Parts, data: String) -> AuditEntry {
    let endpoint: String = parts
        .extensions
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_default();
    let actor: Option<&Actor> = parts.extensions.get::<Actor>();

    AuditEntry {
        module: module.to_string(),
        user: actor.map_or_else(|| ANONYMOUS.to_string(), |actor| actor.name.clone()),
        email: actor.map(|actor| actor.email.clone()).unwrap_or_default(),
        action: audit_action(&parts.method, endpoint.contains('{')),
        data,
        url: format!("{}{}", request_origin(parts), original_uri(parts)),
        endpoint,
        ip: client_address(parts),
        status: String::new(),
        timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// Buffers the body for the audit line, runs the request and logs the outcome.
///
/// An `Actor` placed on the response by an inner layer wins over one found
/// on the request.
pub async fn audit_middleware(
    State(config): State<AuditConfig>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let bytes: Bytes = match to_bytes(body, config.max_body_size).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return HandlerResponse::new(StatusCode::PAYLOAD_TOO_LARGE)
                .message("Request Entity Too Large")
                .into_response();
        }
    };

    let mut entry: AuditEntry = request_entry(config.module, &parts, audit_data(&bytes));
    let response: Response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

    if let Some(actor) = response.extensions().get::<Actor>() {
        entry.user = actor.name.clone();
        entry.email = actor.email.clone();
    }
    entry.status = status_line(response.status());

    info!(target: "audit", "{}", entry.to_line());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_methods_to_actions() {
        assert_eq!(audit_action(&Method::POST, false), "add");
        assert_eq!(audit_action(&Method::PUT, true), "edit");
        assert_eq!(audit_action(&Method::PUT, false), "add");
        assert_eq!(audit_action(&Method::GET, true), "view");
        assert_eq!(audit_action(&Method::DELETE, true), "delete");
        assert_eq!(audit_action(&Method::OPTIONS, false), "options");
    }

    #[test]
    fn masks_passwords_and_escapes_quotes() {
        let data: String = audit_data(br#"{"email":"cert@example.org","password":"hunter2"}"#);

        assert!(!data.contains("hunter2"));
        assert!(data.contains(MASKED_PASSWORD));
        assert!(data.contains(r#"\"email\":\"cert@example.org\""#));
    }

    #[test]
    fn non_json_bodies_are_not_recorded() {
        assert_eq!(audit_data(b""), "");
        assert_eq!(audit_data(b"name=red"), "");
    }

    #[test]
    fn anonymous_requests_are_recorded_with_their_url() {
        let (parts, _) = axum::http::Request::builder()
            .method(Method::DELETE)
            .uri("/api/1.0/tags/4")
            .header("host", "do.test")
            .body(())
            .unwrap()
            .into_parts();

        let entry: AuditEntry = request_entry("api", &parts, String::new());

        assert_eq!(entry.user, "anonymous");
        assert_eq!(entry.action, "delete");
        assert_eq!(entry.url, "http://do.test/api/1.0/tags/4");
        assert_eq!(entry.email, "");
    }

    #[test]
    fn line_lists_every_field_in_order() {
        let entry: AuditEntry = AuditEntry {
            module: "cp".to_string(),
            user: "Jane".to_string(),
            email: "jane@example.org".to_string(),
            action: "view",
            data: String::new(),
            url: "http://cp.test/cp/1.0/fqdns".to_string(),
            endpoint: "/cp/1.0/fqdns".to_string(),
            ip: "10.0.0.1".to_string(),
            status: status_line(StatusCode::OK),
            timestamp: "2016-11-04 15:22:39".to_string(),
        };

        assert_eq!(
            entry.to_line(),
            "module=\"cp\" user=\"Jane\" email=\"jane@example.org\" action=\"view\" data=\"\" \
             url=\"http://cp.test/cp/1.0/fqdns\" endpoint=\"/cp/1.0/fqdns\" ip=\"10.0.0.1\" \
             status=\"200 OK\" timestamp=\"2016-11-04 15:22:39\""
        );
    }
}
