// tests/metrics.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use bizspark::config::{AppConfig, Credentials};

// Full in-process app, offline: no provider credentials, Google Trends off, mock AI.
async fn build_app() -> Router {
    let mut cfg = AppConfig::default();
    cfg.sources.google_trends_enabled = false;
    cfg.credentials = Credentials {
        ai_test_mode: Some("mock".into()),
        ..Default::default()
    };
    bizspark::app_with_config(cfg)
        .await
        .expect("app_with_config() should build Router in tests")
}

#[tokio::test]
async fn metrics_endpoint_contains_expected_series() {
    let app = build_app().await;

    let resp = app
        .clone()
        .oneshot(
            Request::post("/api/analyze")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"keyword":"반려동물 헬스케어"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "analyze_requests_total",
        "outcome=\"done\"",
        "collect_duration_ms",
        "collect_news_items",
        "synthesis_duration_ms",
        "collect_source_budget_ms",
    ] {
        assert!(text.contains(needle), "missing {needle} in:\n{text}");
    }
}

#[tokio::test]
async fn building_twice_reuses_the_recorder() {
    let a = build_app().await;
    let b = build_app().await;
    for app in [a, b] {
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
