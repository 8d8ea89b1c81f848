//! Runs the remote backend against a local stand-in for the hosted model API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::Json,
    http::{HeaderMap, Request, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use image::{DynamicImage, Rgb, RgbImage};
use ml_dashboard::{
    models::{Polarity, Sentiment},
    remote::{RemoteBackend, CAPTION_MODEL, SENTIMENT_MODEL, TEXT_CLASSIFICATION_MODEL},
    router, AppState, ApiError, BackendKind, Config, InferenceBackend,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "hf_test_token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

async fn sst2(headers: HeaderMap, Json(payload): Json<Value>) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad token"})));
    }
    let text = payload["inputs"].as_str().unwrap_or_default();
    let (pos, neg) = if text.contains("great") { (0.98, 0.02) } else { (0.1, 0.9) };
    (
        StatusCode::OK,
        Json(json!([[{"label": "POSITIVE", "score": pos}, {"label": "NEGATIVE", "score": neg}]])),
    )
}

async fn roberta(Json(payload): Json<Value>) -> Json<Value> {
    let text = payload["inputs"].as_str().unwrap_or_default();
    let label = if text.contains("meh") { "neutral" } else { "LABEL_2" };
    Json(json!([[{"label": label, "score": 0.834}, {"label": "LABEL_0", "score": 0.1}]]))
}

async fn blip(Json(payload): Json<Value>) -> Json<Value> {
    assert!(payload["inputs"].as_str().is_some_and(|s| !s.is_empty()));
    Json(json!([{"generated_text": " a white square on a table "}]))
}

async fn loading() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "Model is currently loading")
}

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/models", addr)
}

async fn healthy_stub() -> String {
    let router = Router::new()
        .route(&format!("/models/{}", TEXT_CLASSIFICATION_MODEL), post(sst2))
        .route(&format!("/models/{}", SENTIMENT_MODEL), post(roberta))
        .route(&format!("/models/{}", CAPTION_MODEL), post(blip));
    spawn_stub(router).await
}

#[tokio::test]
async fn test_remote_text_classification() {
    let backend = RemoteBackend::new(healthy_stub().await, TOKEN).unwrap();

    let p = backend.classify_text("a great movie").await.unwrap();
    assert_eq!(p.label, Polarity::Positive);
    assert_eq!(p.confidence, 0.98);

    let p = backend.classify_text("a dull movie").await.unwrap();
    assert_eq!(p.label, Polarity::Negative);
    assert_eq!(p.confidence, 0.9);
}

#[tokio::test]
async fn test_remote_input_is_cut_to_window() {
    let text = format!("{} great", "x".repeat(600));

    let backend = RemoteBackend::new(healthy_stub().await, TOKEN).unwrap();
    let p = backend.classify_text(&text).await.unwrap();
    assert_eq!(p.label, Polarity::Negative);

    let backend = RemoteBackend::new(healthy_stub().await, TOKEN)
        .unwrap()
        .with_max_input_chars(1000);
    let p = backend.classify_text(&text).await.unwrap();
    assert_eq!(p.label, Polarity::Positive);
}

#[tokio::test]
async fn test_remote_sentiment_maps_raw_labels() {
    let backend = RemoteBackend::new(healthy_stub().await, TOKEN).unwrap();

    let s = backend.analyze_sentiment("loved it").await.unwrap();
    assert_eq!(s.label, Sentiment::Positive);
    assert_eq!(s.confidence, 0.83);

    let s = backend.analyze_sentiment("meh").await.unwrap();
    assert_eq!(s.label, Sentiment::Neutral);
}

#[tokio::test]
async fn test_remote_caption() {
    let backend = RemoteBackend::new(healthy_stub().await, TOKEN).unwrap();
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([250, 250, 250])));

    let caption = backend.caption_image(&img).await.unwrap();
    assert_eq!(caption.text, "a white square on a table");
    assert_eq!(caption.confidence, 0.95);
}

#[tokio::test]
async fn test_wrong_token_is_processing_error() {
    let backend = RemoteBackend::new(healthy_stub().await, "hf_wrong").unwrap();
    let err = backend.classify_text("great").await.unwrap_err();
    assert!(matches!(err, ApiError::Processing(_)));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_upstream_unavailable_is_processing_error() {
    let router = Router::new().route(&format!("/models/{}", SENTIMENT_MODEL), post(loading));
    let backend = RemoteBackend::new(spawn_stub(router).await, TOKEN).unwrap();

    let err = backend.analyze_sentiment("anything").await.unwrap_err();
    assert!(matches!(err, ApiError::Processing(_)));
    assert!(err.to_string().contains("Model is currently loading"));
}

#[tokio::test]
async fn test_router_serves_remote_backend() {
    let url = healthy_stub().await;
    let config = Config {
        backend: BackendKind::Remote,
        hf_api_url: url.clone(),
        hf_api_token: Some(TOKEN.to_string()),
        ..Config::default()
    };
    let backend = Arc::new(RemoteBackend::new(url, TOKEN).unwrap());
    let app = router(AppState::new(config, backend));

    let boundary = "remote-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"r.csv\"\r\nContent-Type: text/csv\r\n\r\ntext\ngreat stuff\nnot for me\n\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/predict/text-classification")
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["model_name"], "DistilBERT (Real AI Model)");
    assert_eq!(body["summary"]["positive"], 1);
    assert_eq!(body["summary"]["negative"], 1);
    assert_eq!(body["predictions"][1]["id"], 2);
}
