//! tests/global_errors/413.rs
//! Ensures that sending a large payload (> 2MB by default) triggers 413.

#[path = "../mod.rs"]
mod common;

use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn returns_413_when_payload_exceeds_global_limit() {
    let base_url: String = common::spawn_app();

    // Slightly larger than the 2MB default
    let oversized_payload: Vec<u8> = vec![b'X'; 2_097_152 + 100];

    let resp: reqwest::Response = reqwest::Client::new()
        .post(format!("{}/api/1.0/tags", base_url))
        .body(oversized_payload)
        .send()
        .await
        .expect("Failed to send large request.");

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "PAYLOAD_TOO_LARGE");
    assert_eq!(json["code"], 413);
}
