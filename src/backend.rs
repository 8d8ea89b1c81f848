use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;

use crate::config::{BackendKind, Config};
use crate::error::{ConfigError, Result};
use crate::heuristic::HeuristicBackend;
use crate::models::{Caption, Modality, ModelCard, ModelInfo, Polarity, Prediction, Sentiment};
use crate::remote::RemoteBackend;

/// An inference strategy behind the three prediction endpoints.
///
/// Built once at startup and shared read-only by every request.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn card(&self, modality: Modality) -> ModelCard;

    async fn classify_text(&self, text: &str) -> Result<Prediction<Polarity>>;

    async fn analyze_sentiment(&self, text: &str) -> Result<Prediction<Sentiment>>;

    async fn caption_image(&self, image: &DynamicImage) -> Result<Caption>;

    fn catalog(&self) -> Vec<ModelInfo> {
        Modality::ALL
            .iter()
            .map(|&modality| ModelInfo::new(modality, self.card(modality)))
            .collect()
    }
}

pub fn build_backend(config: &Config) -> std::result::Result<Arc<dyn InferenceBackend>, ConfigError> {
    match config.backend {
        BackendKind::Heuristic => Ok(Arc::new(HeuristicBackend::new())),
        BackendKind::Remote => {
            let token = config.hf_api_token.clone().ok_or_else(|| {
                ConfigError::Invalid("HF_API_TOKEN must be set for the remote backend".to_string())
            })?;
            let backend = RemoteBackend::new(config.hf_api_url.clone(), token)?
                .with_max_input_chars(config.max_input_chars);
            Ok(Arc::new(backend))
        }
    }
}
