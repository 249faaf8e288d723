//! tests/global_errors/406.rs
//! Clients that refuse JSON get 406.

#[path = "../mod.rs"]
mod common;

use reqwest::{header::ACCEPT, StatusCode};
use serde_json::Value;

#[tokio::test]
async fn returns_406_when_json_is_not_acceptable() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/api/1.0", base_url))
        .header(ACCEPT, "text/html")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "NOT_ACCEPTABLE");
    assert_eq!(json["code"], 406);
}

#[tokio::test]
async fn json_clients_are_served() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/api/1.0", base_url))
        .header(ACCEPT, "application/json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::OK);
}
