//! Rule-based inference used when no hosted models are configured.
//!
//! Text is scored by counting marker words from a fixed [`Lexicon`]; images
//! are captioned from their shape and average brightness. Everything here
//! is deterministic: the same input always produces the same output.

pub mod classify;
pub mod lexicon;
pub mod tokenizer;
pub mod vision;

use async_trait::async_trait;
use image::DynamicImage;

use crate::backend::InferenceBackend;
use crate::config::BackendKind;
use crate::error::Result;
use crate::models::{Caption, Modality, ModelCard, Polarity, Prediction, Sentiment};

pub use classify::{classify_binary, classify_sentiment};
pub use lexicon::{Lexicon, LEXICON_VERSION};
pub use tokenizer::normalize;
pub use vision::{describe, ImageDescription, Orientation, Tone};

pub struct HeuristicBackend {
    lexicon: &'static Lexicon,
}

impl HeuristicBackend {
    pub fn new() -> Self {
        Self {
            lexicon: Lexicon::standard(),
        }
    }
}

impl Default for HeuristicBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for HeuristicBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Heuristic
    }

    fn card(&self, modality: Modality) -> ModelCard {
        match modality {
            Modality::TextClassification => ModelCard {
                display_name: "Keyword Lexicon (Lightweight)",
                description: "Keyword rules - classify text as positive or negative",
                model: "lexicon-binary-v1",
            },
            Modality::SentimentAnalysis => ModelCard {
                display_name: "Keyword Lexicon (Lightweight)",
                description: "Keyword rules - 3-class sentiment with neutral",
                model: "lexicon-sentiment-v1",
            },
            Modality::ImageCaption => ModelCard {
                display_name: "Image Metadata (Lightweight)",
                description: "Describe an image from its orientation and brightness",
                model: "image-metadata-v1",
            },
        }
    }

    async fn classify_text(&self, text: &str) -> Result<Prediction<Polarity>> {
        Ok(classify_binary(self.lexicon, text))
    }

    async fn analyze_sentiment(&self, text: &str) -> Result<Prediction<Sentiment>> {
        Ok(classify_sentiment(self.lexicon, text))
    }

    async fn caption_image(&self, image: &DynamicImage) -> Result<Caption> {
        let description = describe(image);
        tracing::debug!(
            width = description.width,
            height = description.height,
            orientation = %description.orientation,
            tone = %description.tone,
            "Described image"
        );
        Ok(Caption {
            text: description.caption,
            confidence: description.confidence,
        })
    }
}
