//! HTTP-level tests driving the axum router without binding a socket.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use bank_stress::api::{AppState, router};

fn app() -> Router {
    router(AppState::new(30, 16))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

async fn post_empty(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

fn approx(value: &Value, expected: f64) -> bool {
    value
        .as_f64()
        .is_some_and(|v| (v - expected).abs() <= 1e-6)
}

// =============================================================================
// STATIC ASSETS
// =============================================================================

#[tokio::test]
async fn test_index_is_served_without_caching() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Bank Stress Demonstrator"));
    assert!(html.contains("/app.js"));
}

#[tokio::test]
async fn test_app_js_has_javascript_content_type() {
    let response = app()
        .oneshot(Request::builder().uri("/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("application/javascript"));
}

#[tokio::test]
async fn test_app_js_keys_requests_by_tab_and_drops_stale_views() {
    let response = app()
        .oneshot(Request::builder().uri("/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let js = String::from_utf8(body.to_vec()).unwrap();
    assert!(js.contains("sessionStorage"));
    assert!(js.contains("/api/session/${SESSION_ID}"));
    assert!(js.contains("seq === latestRequest"));
    assert!(js.contains("field === activeField"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, json) = get(&app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, json) = get(&app(), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not found");
}

// =============================================================================
// STATELESS EVALUATION
// =============================================================================

#[tokio::test]
async fn test_stress_get_defaults_to_svb() {
    let (status, json) = get(&app(), "/api/stress").await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&json["score"], 67.55));
    assert_eq!(json["classification"]["label"], "At Risk");
    assert_eq!(json["classification"]["status"], "at-risk");
    assert!(approx(&json["durationLossPct"], 16.25));
    assert_eq!(json["contributions"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_stress_get_reads_query_overrides() {
    let (status, json) = get(
        &app(),
        "/api/stress?preset=stable&durationYears=10&rateShockPct=6",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&json["inputs"]["durationYears"], 10.0));
    assert!(approx(&json["inputs"]["uninsuredPct"], 25.0));
    assert!(approx(&json["durationLossPct"], 60.0));
}

#[tokio::test]
async fn test_stress_post_classifies_extremes() {
    let app = app();
    let (status, json) = post_json(
        &app,
        "/api/stress",
        json!({
            "rateShockPct": 6,
            "uninsuredPct": 100,
            "durationYears": 10,
            "unrealizedLossPctCap": 120,
            "withdrawalSpeed": 100,
            "concentration": 100
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&json["score"], 100.0));
    assert_eq!(json["classification"]["label"], "Critical");

    let (_, json) = post_json(&app, "/api/stress", json!({ "preset": "stable" })).await;
    assert_eq!(json["classification"]["label"], "Stable");
}

#[tokio::test]
async fn test_stress_clamps_out_of_range_values() {
    let (status, json) = post_json(
        &app(),
        "/api/stress",
        json!({ "rateShockPct": 40, "uninsuredPct": -50 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&json["normalized"]["rateShock"], 1.0));
    assert!(approx(&json["normalized"]["uninsured"], 0.0));
}

#[tokio::test]
async fn test_stress_unknown_preset_is_404() {
    let (status, json) = post_json(&app(), "/api/stress", json!({ "preset": "lehman" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("lehman"));
}

#[tokio::test]
async fn test_stress_malformed_body_is_400() {
    let (status, json) = post_json(&app(), "/api/stress", json!({ "rateShockPct": "high" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_presets_catalog() {
    let (status, json) = get(&app(), "/api/presets").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["presets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["svb", "stable", "rateShock", "run"]);
}

// =============================================================================
// SESSION
// =============================================================================

const TAB: &str = "/api/session/tab-1";

#[tokio::test]
async fn test_session_starts_with_one_history_point() {
    let (status, json) = get(&app(), TAB).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["history"].as_array().unwrap().len(), 1);
    assert_eq!(json["historyCapacity"], 30);
    assert_eq!(json["updates"], 1);
    assert!(approx(&json["inputs"]["rateShockPct"], 2.5));
}

#[tokio::test]
async fn test_session_input_change_merges_and_records() {
    let app = app();
    let (status, json) = post_json(
        &app,
        &format!("{TAB}/inputs"),
        json!({ "withdrawalSpeed": 10 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&json["inputs"]["withdrawalSpeed"], 10.0));
    assert!(approx(&json["inputs"]["uninsuredPct"], 80.0));
    assert_eq!(json["history"].as_array().unwrap().len(), 2);

    let (_, json) = get(&app, TAB).await;
    assert!(approx(&json["inputs"]["withdrawalSpeed"], 10.0));
}

#[tokio::test]
async fn test_two_clients_keep_independent_histories() {
    let app = app();
    for step in 0..3 {
        post_json(
            &app,
            "/api/session/first/inputs",
            json!({ "rateShockPct": 3.0 + step as f64 }),
        )
        .await;
    }
    post_empty(&app, "/api/session/second/preset/stable").await;

    let (_, first) = get(&app, "/api/session/first").await;
    let (_, second) = get(&app, "/api/session/second").await;

    assert_eq!(first["history"].as_array().unwrap().len(), 4);
    assert!(approx(&first["inputs"]["rateShockPct"], 5.0));
    assert_eq!(second["history"].as_array().unwrap().len(), 2);
    assert!(approx(&second["inputs"]["rateShockPct"], 0.5));
    assert_eq!(second["report"]["classification"]["label"], "Stable");
}

#[tokio::test]
async fn test_session_id_with_invalid_characters_is_400() {
    let (status, json) = get(&app(), "/api/session/not%20valid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("session id"));
}

#[tokio::test]
async fn test_session_history_is_capped_at_thirty() {
    let app = app();
    let mut last = Value::Null;
    for step in 0..31 {
        let (_, json) = post_json(
            &app,
            &format!("{TAB}/inputs"),
            json!({ "concentration": step as f64 * 3.0 }),
        )
        .await;
        last = json;
    }
    let history = last["history"].as_array().unwrap();
    assert_eq!(history.len(), 30);
    assert!(approx(history.last().unwrap(), last["report"]["score"].as_f64().unwrap()));
}

#[tokio::test]
async fn test_session_preset_replaces_all_inputs() {
    let app = app();
    post_json(&app, &format!("{TAB}/inputs"), json!({ "rateShockPct": 6 })).await;
    let (status, json) = post_empty(&app, &format!("{TAB}/preset/run")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&json["inputs"]["rateShockPct"], 3.0));
    assert!(approx(&json["inputs"]["withdrawalSpeed"], 98.0));
    assert_eq!(json["report"]["classification"]["label"], "Critical");
}

#[tokio::test]
async fn test_session_unknown_preset_is_404() {
    let (status, json) = post_empty(&app(), &format!("{TAB}/preset/lehman")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("lehman"));
}

#[tokio::test]
async fn test_session_reset() {
    let app = app();
    post_empty(&app, &format!("{TAB}/preset/stable")).await;
    post_empty(&app, &format!("{TAB}/preset/run")).await;
    let (status, json) = post_empty(&app, &format!("{TAB}/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["history"].as_array().unwrap().len(), 1);
    assert!(approx(&json["inputs"]["rateShockPct"], 2.5));
    assert_eq!(json["updates"], 1);
}
