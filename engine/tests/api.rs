use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use phishguard_engine::{
    engine::PhishingEngine,
    lexicon::SuspicionLexicon,
    model::StudentModel,
    record::FEATURE_SCHEMA,
    routes::{router, AppState},
    tld::KnownTlds,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/models/student.json");
    let model = StudentModel::load(path).unwrap();
    let engine = PhishingEngine::new(Arc::new(model), KnownTlds::builtin(), SuspicionLexicon::default(), 4096);
    router(AppState {
        engine: Arc::new(engine),
        metrics: None,
    })
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn predict_returns_verdict() {
    let (status, body) = post(
        app(),
        "/predict/",
        json!({"url": "https://paypal-login.verify-account.xyz", "timestamp": 1700000000000_i64}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://paypal-login.verify-account.xyz");
    assert_eq!(body["prediction"], 1);
    assert_eq!(body["phishing_probability"], 1.0);
    assert_eq!(body["risk_score"], 100.0);
}

#[tokio::test]
async fn predict_without_trailing_slash() {
    let (status, body) = post(app(), "/predict", json!({"url": "https://www.wikipedia.org"})).await;
    assert_eq!(status, StatusCode::OK);
    let p = body["phishing_probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&p));
    assert_eq!(body["prediction"], if p >= 0.5 { 1 } else { 0 });
}

#[tokio::test]
async fn predict_scores_empty_url() {
    let (status, body) = post(app(), "/predict/", json!({"url": ""})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "");
    assert!(body["phishing_probability"].as_f64().unwrap() >= 0.6);
    assert_eq!(body["prediction"], 1);
}

#[tokio::test]
async fn predict_rejects_oversized_url() {
    let url = format!("http://example.com/{}", "a".repeat(5000));
    let (status, body) = post(app(), "/predict", json!({ "url": url })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: URL longer than 4096 characters");
}

#[tokio::test]
async fn features_are_ordered() {
    let (status, body) = post(app(), "/features", json!({"url": "http://192.168.1.1/login"})).await;
    assert_eq!(status, StatusCode::OK);
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), FEATURE_SCHEMA.len());
    assert_eq!(body["IsDomainIP"], 1);
    assert_eq!(body["TLD"], "unknown");
    assert_eq!(body["TLDLength"], 7);
    assert_eq!(body["has_login"], 1);
    assert_eq!(body["Title"], "");
}

#[tokio::test]
async fn health_reports_model() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_version"], "phishguard-lr-2025.09");
    assert_eq!(body["known_tlds"], 667);
}

#[tokio::test]
async fn metrics_disabled_is_not_found() {
    let response = app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
