use serde::Serialize;

/// Two-class label produced by text classification.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

/// Three-class label produced by sentiment analysis.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// A label with a confidence in `[0, 1]`, already rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction<L> {
    pub label: L,
    pub confidence: f64,
}

impl<L> Prediction<L> {
    pub fn new(label: L, confidence: f64) -> Self {
        Self {
            label,
            confidence: round_confidence(confidence),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

/// Round half to even at two decimals.
pub fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// The three prediction endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    TextClassification,
    SentimentAnalysis,
    ImageCaption,
}

impl Modality {
    pub const ALL: [Modality; 3] = [
        Modality::TextClassification,
        Modality::SentimentAnalysis,
        Modality::ImageCaption,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Modality::TextClassification => "text-classification",
            Modality::SentimentAnalysis => "sentiment-analysis",
            Modality::ImageCaption => "image-caption",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Modality::TextClassification => "Text Classification",
            Modality::SentimentAnalysis => "Sentiment Analysis",
            Modality::ImageCaption => "Image Captioning",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Modality::TextClassification | Modality::SentimentAnalysis => "NLP",
            Modality::ImageCaption => "Computer Vision",
        }
    }

    pub fn accepts(&self) -> &'static str {
        match self {
            Modality::TextClassification | Modality::SentimentAnalysis => {
                "CSV file with 'text' column"
            }
            Modality::ImageCaption => "Any image file (JPG, PNG, WebP, etc.)",
        }
    }
}

/// How a backend serves one modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCard {
    /// Shown as `model_name` in prediction responses.
    pub display_name: &'static str,
    pub description: &'static str,
    /// Upstream model identifier or rule-set name.
    pub model: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub status: &'static str,
    pub accepts: &'static str,
    pub model: &'static str,
}

impl ModelInfo {
    pub fn new(modality: Modality, card: ModelCard) -> Self {
        Self {
            id: modality.id(),
            name: modality.title(),
            description: card.description,
            kind: modality.category(),
            status: "active",
            accepts: modality.accepts(),
            model: card.model,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ModelCatalog {
    pub models: Vec<ModelInfo>,
}

// Response bodies

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ClassificationRecord {
    pub id: usize,
    pub text: String,
    pub prediction: Polarity,
    pub confidence: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SentimentRecord {
    pub id: usize,
    pub text: String,
    pub sentiment: Sentiment,
    pub score: f64,
}

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationSummary {
    pub positive: usize,
    pub negative: usize,
}

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentSummary {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Serialize, Debug)]
pub struct TextClassificationResponse {
    pub success: bool,
    pub model: &'static str,
    pub model_name: &'static str,
    pub filename: Option<String>,
    pub total_predictions: usize,
    pub summary: ClassificationSummary,
    pub predictions: Vec<ClassificationRecord>,
}

#[derive(Serialize, Debug)]
pub struct SentimentAnalysisResponse {
    pub success: bool,
    pub model: &'static str,
    pub model_name: &'static str,
    pub filename: Option<String>,
    pub total_predictions: usize,
    pub summary: SentimentSummary,
    pub predictions: Vec<SentimentRecord>,
}

#[derive(Serialize, Debug)]
pub struct ImageCaptionResponse {
    pub success: bool,
    pub model: &'static str,
    pub model_name: &'static str,
    pub filename: Option<String>,
    pub caption: String,
    pub confidence: f64,
}
