// JSON envelope shared by every route: `{status, code, data, messages, date}`.
// Handlers build a HandlerResponse; the wrapper middleware turns whatever
// comes back (handler output, extractor rejections, layer errors) into the envelope.

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue, Request, Response, StatusCode,
    },
    middleware::Next,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::utils::utils::to_two_space_indented_json;

/// Plain-text bodies of non-enveloped responses (mostly extractor
/// rejections) are kept as a message up to this size.
const MAX_PLAIN_MESSAGE_BYTES: usize = 4096;

/// Envelope sent to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseFormat {
    /// Upper-cased reason phrase, e.g. `NOT_FOUND`
    pub status: String,
    pub code: u16,
    pub data: Value,
    pub messages: Vec<String>,
    /// RFC 3339 time the response was produced
    pub date: String,
}

impl ResponseFormat {
    pub fn new(status: StatusCode, data: Value, messages: Vec<String>) -> Self {
        Self {
            status: status_label(status),
            code: status.as_u16(),
            data,
            messages,
            date: Utc::now().to_rfc3339(),
        }
    }
}

/// `418 I'm a teapot` becomes `I'M_A_TEAPOT`
pub fn status_label(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN STATUS")
        .to_uppercase()
        .replace(' ', "_")
}

/// What a handler answers: status, payload, messages and extra headers
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub status_code: StatusCode,
    pub data: Value,
    pub messages: Vec<String>,
    pub headers: HeaderMap,
}

impl HandlerResponse {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            data: Value::Null,
            messages: Vec::new(),
            headers: HeaderMap::new(),
        }
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Headers sent alongside the envelope, e.g. page navigation
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> axum::response::Response {
        let mut response: Response<Body> = Json(json!({
            "data": self.data,
            "messages": self.messages
        }))
        .into_response();

        *response.status_mut() = self.status_code;
        response.headers_mut().extend(self.headers.clone());

        // The wrapper reads the structured response back from here
        response.extensions_mut().insert(self);
        response
    }
}

/// Data and messages of a response that bypassed HandlerResponse
async fn plain_components(body: Body) -> (Value, Vec<String>) {
    match to_bytes(body, MAX_PLAIN_MESSAGE_BYTES).await {
        Ok(bytes) if !bytes.is_empty() => {
            let text: String = String::from_utf8_lossy(&bytes).trim().to_string();
            (Value::Null, vec![text])
        }
        _ => (Value::Null, Vec::new()),
    }
}

/// Middleware that wraps every response in the envelope
pub async fn response_wrapper(req: Request<Body>, next: Next) -> Response<Body> {
    let response: Response<Body> = next.run(req).await;
    let (mut parts, body) = response.into_parts();

    let (data, messages) = match parts.extensions.remove::<HandlerResponse>() {
        Some(handler) => (handler.data, handler.messages),
        None => plain_components(body).await,
    };

    let wrapped: ResponseFormat = ResponseFormat::new(parts.status, data, messages);

    match to_two_space_indented_json(&wrapped) {
        Ok(pretty) => debug!("\nFinal response:\n{}", pretty),
        Err(err) => error!("Failed to format response JSON: {:?}", err),
    }

    let json_body: Vec<u8> = serde_json::to_vec(&wrapped).unwrap_or_else(|_| b"{}".to_vec());

    // The inner body is replaced, so a stale length must not leak through
    parts.headers.remove(CONTENT_LENGTH);
    parts.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Response::from_parts(parts, Body::from(json_body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware::from_fn, routing::get, Router};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn created() -> HandlerResponse {
        HandlerResponse::new(StatusCode::CREATED)
            .data(json!({ "id": 7 }))
            .message("Tag added")
    }

    async fn envelope(app: Router) -> (Response<Body>, ResponseFormat) {
        let response: Response<Body> = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();

        (Response::from_parts(parts, Body::empty()), serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn wraps_handler_response_in_standard_format() {
        let app: Router = Router::new().route("/", get(created)).layer(from_fn(response_wrapper));
        let (response, body) = envelope(app).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body.status, "CREATED");
        assert_eq!(body.code, 201);
        assert_eq!(body.data["id"], 7);
        assert_eq!(body.messages, vec!["Tag added".to_string()]);
    }

    #[tokio::test]
    async fn plain_status_responses_get_null_data() {
        let app: Router = Router::new()
            .route("/", get(|| async { StatusCode::IM_A_TEAPOT }))
            .layer(from_fn(response_wrapper));
        let (_, body) = envelope(app).await;

        assert_eq!(body.status, "I'M_A_TEAPOT");
        assert_eq!(body.data, Value::Null);
        assert!(body.messages.is_empty());
    }

    #[tokio::test]
    async fn plain_text_rejections_become_messages() {
        let app: Router = Router::new()
            .route("/", get(|| async { (StatusCode::BAD_REQUEST, "Invalid URL: id is not a number") }))
            .layer(from_fn(response_wrapper));
        let (response, body) = envelope(app).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body.messages, vec!["Invalid URL: id is not a number".to_string()]);
    }

    #[tokio::test]
    async fn extra_headers_survive_wrapping() {
        let mut headers: HeaderMap = HeaderMap::new();
        headers.insert("do-page-current", HeaderValue::from_static("2"));

        let app: Router = Router::new()
            .route("/", get(move || async move { HandlerResponse::new(StatusCode::OK).headers(headers) }))
            .layer(from_fn(response_wrapper));
        let (response, _) = envelope(app).await;

        assert_eq!(response.headers()["do-page-current"], "2");
    }
}
