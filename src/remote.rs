//! Hosted pretrained models reached over the Hugging Face inference API.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::DynamicImage;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::backend::InferenceBackend;
use crate::config::BackendKind;
use crate::error::{ApiError, ConfigError, Result};
use crate::models::{Caption, Modality, ModelCard, Polarity, Prediction, Sentiment};

pub const TEXT_CLASSIFICATION_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";
pub const SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";
pub const CAPTION_MODEL: &str = "Salesforce/blip-image-captioning-base";

/// BLIP returns no score; this is what the service has always reported.
pub const REMOTE_CAPTION_CONFIDENCE: f64 = 0.95;

/// Texts longer than this many characters are cut before they are sent.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 512;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const JPEG_QUALITY: u8 = 85;

#[derive(Deserialize, Debug, Clone)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Classification pipelines answer either `[[{..}, ..]]` or `[{..}, ..]`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ClassificationOutput {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationOutput {
    fn top(self) -> Option<LabelScore> {
        let scores = match self {
            ClassificationOutput::Nested(mut batches) => {
                if batches.is_empty() {
                    return None;
                }
                batches.swap_remove(0)
            }
            ClassificationOutput::Flat(scores) => scores,
        };
        scores.into_iter().max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

#[derive(Deserialize, Debug)]
struct GeneratedText {
    generated_text: String,
}

pub struct RemoteBackend {
    client: reqwest::Client,
    base_url: String,
    token: String,
    max_input_chars: usize,
}

impl RemoteBackend {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> std::result::Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::Backend(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Remote inference backend targeting {}", base_url);

        Ok(Self {
            client,
            base_url,
            token: token.into(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        })
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url, model)
    }

    async fn query<T>(&self, model: &str, payload: &serde_json::Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.model_url(model))
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let preview: String = body.chars().take(500).collect();
        debug!(model, %status, body = %preview, "Model API response");

        if !status.is_success() {
            return Err(ApiError::processing(format!(
                "Model API error {} from {}: {}",
                status, model, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::processing(format!("Unexpected response from {}: {}", model, e))
        })
    }

    async fn classify(&self, model: &str, text: &str) -> Result<LabelScore> {
        let inputs = truncate_chars(text, self.max_input_chars);
        let output: ClassificationOutput = self
            .query(model, &serde_json::json!({ "inputs": inputs }))
            .await?;
        output
            .top()
            .ok_or_else(|| ApiError::processing(format!("Model {} returned no labels", model)))
    }
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// SST-2 labels: `POSITIVE`/`NEGATIVE` or the raw `LABEL_1`/`LABEL_0`.
pub fn parse_polarity(label: &str) -> Result<Polarity> {
    match label.to_ascii_lowercase().as_str() {
        "positive" | "label_1" => Ok(Polarity::Positive),
        "negative" | "label_0" => Ok(Polarity::Negative),
        other => Err(ApiError::processing(format!("Unknown label '{}'", other))),
    }
}

/// Twitter-RoBERTa labels: names or `LABEL_0` (negative) to `LABEL_2` (positive).
pub fn parse_sentiment(label: &str) -> Result<Sentiment> {
    match label.to_ascii_lowercase().as_str() {
        "negative" | "label_0" => Ok(Sentiment::Negative),
        "neutral" | "label_1" => Ok(Sentiment::Neutral),
        "positive" | "label_2" => Ok(Sentiment::Positive),
        other => Err(ApiError::processing(format!("Unknown label '{}'", other))),
    }
}

fn encode_jpeg_base64(img: &DynamicImage) -> Result<String> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut jpeg_bytes = Vec::new();
    rgb.write_to(
        &mut Cursor::new(&mut jpeg_bytes),
        image::ImageOutputFormat::Jpeg(JPEG_QUALITY),
    )?;
    Ok(general_purpose::STANDARD.encode(&jpeg_bytes))
}

#[async_trait]
impl InferenceBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn card(&self, modality: Modality) -> ModelCard {
        match modality {
            Modality::TextClassification => ModelCard {
                display_name: "DistilBERT (Real AI Model)",
                description: "REAL DistilBERT model - Classify any text as positive or negative",
                model: TEXT_CLASSIFICATION_MODEL,
            },
            Modality::SentimentAnalysis => ModelCard {
                display_name: "RoBERTa (Real AI Model)",
                description: "REAL RoBERTa model - Advanced 3-class sentiment",
                model: SENTIMENT_MODEL,
            },
            Modality::ImageCaption => ModelCard {
                display_name: "BLIP (Salesforce)",
                description: "REAL BLIP model - Generate captions for ANY image",
                model: CAPTION_MODEL,
            },
        }
    }

    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn classify_text(&self, text: &str) -> Result<Prediction<Polarity>> {
        let top = self.classify(TEXT_CLASSIFICATION_MODEL, text).await?;
        Ok(Prediction::new(parse_polarity(&top.label)?, top.score))
    }

    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn analyze_sentiment(&self, text: &str) -> Result<Prediction<Sentiment>> {
        let top = self.classify(SENTIMENT_MODEL, text).await?;
        Ok(Prediction::new(parse_sentiment(&top.label)?, top.score))
    }

    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    async fn caption_image(&self, image: &DynamicImage) -> Result<Caption> {
        let image_base64 = encode_jpeg_base64(image)?;
        let outputs: Vec<GeneratedText> = self
            .query(CAPTION_MODEL, &serde_json::json!({ "inputs": image_base64 }))
            .await?;

        let text = outputs
            .into_iter()
            .next()
            .map(|o| o.generated_text.trim().to_string())
            .ok_or_else(|| ApiError::processing("No caption in response"))?;

        info!("Generated caption: {}", text);

        Ok(Caption {
            text,
            confidence: REMOTE_CAPTION_CONFIDENCE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("ab", 3), "ab");
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }

    #[test]
    fn test_parse_polarity() {
        assert_eq!(parse_polarity("POSITIVE").unwrap(), Polarity::Positive);
        assert_eq!(parse_polarity("LABEL_0").unwrap(), Polarity::Negative);
        assert!(parse_polarity("mixed").is_err());
    }

    #[test]
    fn test_parse_sentiment() {
        assert_eq!(parse_sentiment("LABEL_0").unwrap(), Sentiment::Negative);
        assert_eq!(parse_sentiment("LABEL_1").unwrap(), Sentiment::Neutral);
        assert_eq!(parse_sentiment("positive").unwrap(), Sentiment::Positive);
    }

    #[test]
    fn test_top_label_from_nested_output() {
        let output: ClassificationOutput = serde_json::from_str(
            r#"[[{"label":"NEGATIVE","score":0.12},{"label":"POSITIVE","score":0.88}]]"#,
        )
        .unwrap();
        let top = output.top().unwrap();
        assert_eq!(top.label, "POSITIVE");
        assert_eq!(top.score, 0.88);
    }

    #[test]
    fn test_top_label_from_flat_output() {
        let output: ClassificationOutput =
            serde_json::from_str(r#"[{"label":"neutral","score":0.6}]"#).unwrap();
        assert_eq!(output.top().unwrap().label, "neutral");
    }

    #[test]
    fn test_empty_output_has_no_top() {
        let output: ClassificationOutput = serde_json::from_str("[]").unwrap();
        assert!(output.top().is_none());
    }

    #[test]
    fn test_encode_jpeg_base64_is_decodable() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::new(8, 8));
        let encoded = encode_jpeg_base64(&img).unwrap();
        let bytes = general_purpose::STANDARD.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn test_model_url_trims_trailing_slash() {
        let backend = RemoteBackend::new("http://localhost:9000/models/", "t").unwrap();
        assert_eq!(
            backend.model_url(CAPTION_MODEL),
            "http://localhost:9000/models/Salesforce/blip-image-captioning-base"
        );
    }
}
