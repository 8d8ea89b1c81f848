use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{error, info, instrument, warn};

use crate::backend::InferenceBackend;
use crate::batch;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    ClassificationSummary, ImageCaptionResponse, Modality, ModelCatalog, Polarity, Sentiment,
    SentimentAnalysisResponse, SentimentSummary, TextClassificationResponse,
};

/// Multipart form field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn InferenceBackend>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn InferenceBackend>) -> Arc<Self> {
        Arc::new(Self { config, backend })
    }
}

struct Upload {
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        return Ok(Upload {
            filename,
            content_type,
            data,
        });
    }

    Err(ApiError::validation(format!(
        "Missing upload field '{}'",
        UPLOAD_FIELD
    )))
}

fn log_failure(endpoint: &str, err: &ApiError) {
    match err {
        ApiError::Validation(msg) | ApiError::TooLarge(msg) => {
            warn!("{} rejected upload: {}", endpoint, msg)
        }
        ApiError::Processing(msg) => error!("{} failed: {}", endpoint, msg),
    }
}

async fn home(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "ML Dashboard API - Production Ready!",
        "status": "running",
        "version": crate::VERSION,
        "backend": state.backend.kind().as_str(),
        "models_loaded": true,
        "endpoints": {
            "health": "/health",
            "models": "/api/models",
            "text_classification": "/api/predict/text-classification",
            "sentiment_analysis": "/api/predict/sentiment-analysis",
            "image_caption": "/api/predict/image-caption"
        }
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "models_loaded": true,
        "backend": state.backend.kind().as_str(),
    }))
}

async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelCatalog> {
    Json(ModelCatalog {
        models: state.backend.catalog(),
    })
}

#[instrument(skip(state, multipart))]
async fn predict_text_classification(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TextClassificationResponse>> {
    let modality = Modality::TextClassification;

    let result: Result<TextClassificationResponse> = async {
        let upload = read_upload(&mut multipart).await?;
        let rows = batch::read_text_rows(&upload.data)?;
        let scored = batch::run::<Polarity>(state.backend.as_ref(), &rows).await?;

        let summary = ClassificationSummary::tally(&scored);
        let total_predictions = scored.len();
        info!(
            filename = ?upload.filename,
            total_predictions,
            positive = summary.positive,
            negative = summary.negative,
            "Classified batch"
        );

        Ok(TextClassificationResponse {
            success: true,
            model: modality.id(),
            model_name: state.backend.card(modality).display_name,
            filename: upload.filename,
            total_predictions,
            summary,
            predictions: batch::first_records(scored, state.config.preview_limit),
        })
    }
    .await;

    result.map(Json).map_err(|e| {
        log_failure(modality.id(), &e);
        e
    })
}

#[instrument(skip(state, multipart))]
async fn predict_sentiment(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<SentimentAnalysisResponse>> {
    let modality = Modality::SentimentAnalysis;

    let result: Result<SentimentAnalysisResponse> = async {
        let upload = read_upload(&mut multipart).await?;
        let rows = batch::read_text_rows(&upload.data)?;
        let scored = batch::run::<Sentiment>(state.backend.as_ref(), &rows).await?;

        let summary = SentimentSummary::tally(&scored);
        let total_predictions = scored.len();
        info!(
            filename = ?upload.filename,
            total_predictions,
            positive = summary.positive,
            negative = summary.negative,
            neutral = summary.neutral,
            "Analyzed batch"
        );

        Ok(SentimentAnalysisResponse {
            success: true,
            model: modality.id(),
            model_name: state.backend.card(modality).display_name,
            filename: upload.filename,
            total_predictions,
            summary,
            predictions: batch::first_records(scored, state.config.preview_limit),
        })
    }
    .await;

    result.map(Json).map_err(|e| {
        log_failure(modality.id(), &e);
        e
    })
}

#[instrument(skip(state, multipart))]
async fn predict_image_caption(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ImageCaptionResponse>> {
    let modality = Modality::ImageCaption;

    let result: Result<ImageCaptionResponse> = async {
        let upload = read_upload(&mut multipart).await?;
        info!(
            "📸 Received file: {:?}, type: {:?}",
            upload.filename, upload.content_type
        );

        let is_image = upload
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(ApiError::validation(format!(
                "File must be an image. You uploaded: {}",
                upload.content_type.as_deref().unwrap_or("None")
            )));
        }

        let img = image::load_from_memory(&upload.data)?;
        info!("📸 Image size: {}x{}", img.width(), img.height());

        let caption = state.backend.caption_image(&img).await?;
        info!("📸 Generated caption: {}", caption.text);

        Ok(ImageCaptionResponse {
            success: true,
            model: modality.id(),
            model_name: state.backend.card(modality).display_name,
            filename: upload.filename,
            caption: caption.text,
            confidence: caption.confidence,
        })
    }
    .await;

    result.map(Json).map_err(|e| {
        log_failure(modality.id(), &e);
        e
    })
}

fn predict_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/text-classification", post(predict_text_classification))
        .route("/sentiment-analysis", post(predict_sentiment))
        .route("/image-caption", post(predict_image_caption))
}

/// Build the HTTP router. Prediction endpoints are served under both
/// `/api/predict` and `/predict`.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/api/models", get(list_models))
        .nest("/api/predict", predict_routes())
        .nest("/predict", predict_routes())
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

pub async fn serve(config: Config, backend: Arc<dyn InferenceBackend>) -> anyhow::Result<()> {
    let address = config.server_address();
    let app = router(AppState::new(config, backend));

    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!("🚀 Server running on http://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
