use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use policy_core::db::open_db_in_memory;
use policy_core::{seed_sample_data, FixedClock};
use policy_server::{create_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app(seed: bool) -> Router {
    let mut conn = open_db_in_memory().expect("in-memory store");
    if seed {
        seed_sample_data(&mut conn).expect("seed sample data");
    }
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    create_app(AppState::new(conn, Arc::new(FixedClock(today))))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("router error");
    let status = response.status();
    assert!(response.headers().contains_key("x-request-id"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn create_policy_returns_created_read_view() {
    let app = test_app(false);

    let (status, body) = send(
        &app,
        post_json(
            "/policies",
            json!({ "policyNumber": "NEW001", "premium": 150.25, "startDate": "2024-03-01" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["policyNumber"], "NEW001");
    assert_eq!(body["premium"], 150.25);
    assert_eq!(body["startDate"], "2024-03-01");
    assert_eq!(body["notes"], json!([]));

    let (status, listed) = send(&app, get("/policies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_policy_accepts_date_time_start_date() {
    let app = test_app(false);

    let (status, body) = send(
        &app,
        post_json(
            "/policies",
            json!({ "policyNumber": "NEW002", "premium": 99, "startDate": "2025-01-15T00:00:00" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["startDate"], "2025-01-15");
}

#[tokio::test]
async fn create_policy_rule_failures_return_bad_request_with_message() {
    let app = test_app(true);

    let cases = [
        (
            json!({ "policyNumber": "HSCX1001", "premium": -1, "startDate": "1900-01-01" }),
            "A policy with this policy number already exists.",
        ),
        (
            json!({ "policyNumber": "  ", "premium": 150, "startDate": "2024-03-01" }),
            "Policy number is required.",
        ),
        (
            json!({ "policyNumber": "NEW001", "premium": -50, "startDate": "2024-03-01" }),
            "Premium must be greater than zero.",
        ),
        (
            json!({ "policyNumber": "NEW001", "premium": 150, "startDate": "1900-01-01" }),
            "Start date must be within the last 10 years or next 10 years.",
        ),
        (
            json!({ "policyNumber": "NEW001", "premium": 150 }),
            "Start date must be within the last 10 years or next 10 years.",
        ),
    ];

    for (payload, message) in cases {
        let (status, body) = send(&app, post_json("/policies", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], message);
    }

    let (_, listed) = send(&app, get("/policies")).await;
    assert_eq!(listed.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn create_policy_preserves_exact_premium() {
    let app = test_app(false);

    let (status, body) = send(
        &app,
        post_json(
            "/policies",
            json!({ "policyNumber": "SUB-CENT", "premium": 0.004, "startDate": "2024-03-01" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["premium"], 0.004);

    let (status, body) = send(
        &app,
        post_json(
            "/policies",
            json!({ "policyNumber": "EXACT", "premium": 19.999, "startDate": "2024-03-01" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["premium"], 19.999);

    let request = Request::builder()
        .method("POST")
        .uri("/policies")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"policyNumber":"HUGE","premium":1e30,"startDate":"2024-03-01"}"#,
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, listed) = send(&app, get("/policies")).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_create_body_returns_bad_request() {
    let app = test_app(false);

    let request = Request::builder()
        .method("POST")
        .uri("/policies")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn list_policies_on_empty_store_returns_empty_array() {
    let app = test_app(false);

    let (status, body) = send(&app, get("/policies")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_policies_includes_notes() {
    let app = test_app(true);

    let (status, body) = send(&app, get("/policies")).await;

    assert_eq!(status, StatusCode::OK);
    let policies = body.as_array().unwrap();
    assert_eq!(policies.len(), 5);
    assert_eq!(policies[0]["policyNumber"], "HSCX1001");
    assert_eq!(policies[0]["notes"].as_array().unwrap().len(), 2);
    assert_eq!(
        policies[0]["notes"][0]["text"],
        "First note for policy 1"
    );
    assert_eq!(policies[0]["notes"][0]["policyId"], policies[0]["id"]);
    assert_eq!(policies[3]["notes"], json!([]));
}

#[tokio::test]
async fn get_policy_by_id_returns_policy_or_not_found() {
    let app = test_app(true);

    let (status, body) = send(&app, get("/policies/3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["policyNumber"], "HSCX1003");
    assert_eq!(body["premium"], 220.0);
    assert_eq!(body["notes"].as_array().unwrap().len(), 3);

    let (status, body) = send(&app, get("/policies/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, get("/policies/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_returns_policies_in_range_with_notes() {
    let app = test_app(true);

    let (status, body) = send(
        &app,
        post_empty("/policies/export?startDate=2024-04-01&endDate=2024-04-05"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|policy| policy["policyNumber"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["HSCX1001", "HSCX1002", "HSCX1005"]);
    assert_eq!(body[0]["notes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn export_with_no_matches_returns_empty_array() {
    let app = test_app(true);

    let (status, body) = send(
        &app,
        post_empty("/policies/export?startDate=2025-01-01T00:00:00&endDate=2025-12-31T00:00:00"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn export_with_one_bound_leaves_other_side_open() {
    let app = test_app(true);

    let numbers = |body: &Value| -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|policy| policy["policyNumber"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, body) = send(&app, post_empty("/policies/export?endDate=2024-03-31")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(numbers(&body), vec!["HSCX1003"]);

    let (status, body) = send(&app, post_empty("/policies/export?startDate=2024-04-05")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(numbers(&body), vec!["HSCX1002", "HSCX1004"]);

    let (status, body) = send(&app, post_empty("/policies/export")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn export_with_unparseable_date_returns_bad_request() {
    let app = test_app(true);

    let (status, body) = send(
        &app,
        post_empty("/policies/export?startDate=yesterday&endDate=2024-12-31"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn health_reports_version() {
    let app = test_app(false);

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}
