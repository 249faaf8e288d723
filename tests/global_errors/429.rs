//! tests/global_errors/429.rs
//! Quota exhaustion answers 429; every response carries the quota headers.

#[path = "../mod.rs"]
mod common;

use reqwest::StatusCode;
use serde_json::Value;

use do_portal::config::environment::EnvironmentVariables;

fn header(resp: &reqwest::Response, name: &str) -> String {
    resp.headers()[name].to_str().unwrap().to_string()
}

#[tokio::test]
async fn returns_429_after_the_quota_is_spent() {
    let base_url: String = common::spawn_app_with(EnvironmentVariables {
        do_rate_limit: 2,
        do_rate_period: 3600,
        ..EnvironmentVariables::default()
    });
    let client: reqwest::Client = reqwest::Client::new();
    let url: String = format!("{}/api/1.0", base_url);

    let first: reqwest::Response = client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header(&first, "DO-RateLimit-Limit"), "2");
    assert_eq!(header(&first, "DO-RateLimit-Remaining"), "1");

    let second: reqwest::Response = client.get(&url).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(header(&second, "DO-RateLimit-Remaining"), "0");

    let third: reqwest::Response = client.get(&url).send().await.unwrap();
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&third, "DO-RateLimit-Remaining"), "0");
    assert_eq!(header(&third, "DO-RateLimit-Reset"), header(&first, "DO-RateLimit-Reset"));

    let json: Value = third.json().await.unwrap();
    assert_eq!(json["code"], 429);
    assert_eq!(json["data"]["error"], "too many requests");
    assert_eq!(json["data"]["message"], "You have exceeded your request rate");
}

#[tokio::test]
async fn surfaces_have_separate_quotas() {
    let base_url: String = common::spawn_app_with(EnvironmentVariables {
        do_rate_limit: 1,
        do_rate_period: 3600,
        ..EnvironmentVariables::default()
    });
    let client: reqwest::Client = reqwest::Client::new();

    let analyst: reqwest::Response = client.get(format!("{}/api/1.0", base_url)).send().await.unwrap();
    assert_eq!(analyst.status(), StatusCode::OK);

    // The customer portal quota is untouched by analyst traffic
    let customer: reqwest::Response = client.get(format!("{}/cp/1.0/fqdns", base_url)).send().await.unwrap();
    assert_eq!(customer.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(header(&customer, "CP-RateLimit-Limit"), "30");
    assert_eq!(header(&customer, "CP-RateLimit-Remaining"), "29");
}
