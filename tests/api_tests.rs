use std::path::PathBuf;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    routing::get,
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use speechguard::state::AppState;
use speechguard::{ServerConfig, routes};

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "0.0.0.0".to_string(),
        port: 8000,
        sample_rate: 16000,
        chunk_duration_sec: 1.0,
        engine_timeout_secs: 3,
        stt_language: "ko".to_string(),
        deepgram_api_key: None,
        deepgram_model: "nova-2".to_string(),
        whisper_model_path: None,
        classifier_model_path: PathBuf::from("models/classifier.onnx"),
        classifier_tokenizer_path: PathBuf::from("models/tokenizer.json"),
        keywords_path: PathBuf::from("data/keywords.json"),
    }
}

fn test_app() -> Router {
    let app_state = AppState::with_engines(
        test_config(),
        None,
        None,
        vec!["씨발".to_string(), "fuck".to_string()],
    );

    Router::new()
        .route("/", get(speechguard::handlers::api::root))
        .merge(routes::api::create_api_router())
        .with_state(app_state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_root() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["service"], "speechguard");
    assert_eq!(json["endpoints"]["websocket"], "/ws/audio");
}

#[tokio::test]
async fn test_health_check() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "OK");
    assert_eq!(json["keywords_loaded"], 2);
    assert_eq!(json["stt_loaded"], false);
    assert_eq!(json["classifier_loaded"], false);
}

#[tokio::test]
async fn test_list_keywords() {
    let request = Request::builder()
        .uri("/keywords")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["keywords"], json!(["씨발", "fuck"]));
}

#[tokio::test]
async fn test_analyze_keyword_hit() {
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"text": "오늘 씨발 날씨가 좋다"}).to_string(),
        ))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["has_violation"], true);
    assert_eq!(json["confidence"], 1.0);
    assert_eq!(json["matched_keywords"], json!(["씨발"]));
    assert_eq!(json["method"], "keyword");
}

#[tokio::test]
async fn test_analyze_clean_text_without_classifier() {
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(json!({"text": "안녕하세요"}).to_string()))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["has_violation"], false);
    assert_eq!(json["confidence"], 0.0);
    // No classifier is configured, so keyword matching was the deciding
    // signal even though it found nothing.
    assert_eq!(json["method"], "keyword");
}

#[tokio::test]
async fn test_analyze_empty_text() {
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(json!({"text": "   "}).to_string()))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["has_violation"], false);
    assert_eq!(json["method"], "no_text");
    assert_eq!(json["matched_keywords"], json!([]));
}

#[tokio::test]
async fn test_analyze_oversized_text_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(json!({"text": "a".repeat(10_001)}).to_string()))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Bad request");
}

#[tokio::test]
async fn test_text_query_endpoint() {
    let request = Request::builder()
        .uri("/test?text=fuck%20this")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["text"], "fuck this");
    assert_eq!(json["has_violation"], true);
    assert_eq!(json["matched_keywords"], json!(["fuck"]));
}
