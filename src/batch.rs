//! CSV batch handling shared by the two text endpoints.

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;

use crate::backend::InferenceBackend;
use crate::error::{ApiError, Result};
use crate::models::{
    ClassificationRecord, ClassificationSummary, Polarity, Prediction, Sentiment,
    SentimentRecord, SentimentSummary,
};

pub const TEXT_COLUMN: &str = "text";
/// Displayed text is cut to this many characters, followed by `...`.
pub const PREVIEW_CHARS: usize = 100;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One non-empty input row. `id` is the 1-based position in the file, so
/// skipped rows leave gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow {
    pub id: usize,
    pub text: String,
}

/// A classified row, ready to be rendered as a response record.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow<L> {
    pub id: usize,
    pub text: String,
    pub prediction: Prediction<L>,
}

/// A label a backend can assign to a single text.
pub trait TextLabel: Copy + Send + Sized {
    fn predict<'a>(
        backend: &'a dyn InferenceBackend,
        text: &'a str,
    ) -> BoxFuture<'a, Result<Prediction<Self>>>;
}

impl TextLabel for Polarity {
    fn predict<'a>(
        backend: &'a dyn InferenceBackend,
        text: &'a str,
    ) -> BoxFuture<'a, Result<Prediction<Self>>> {
        backend.classify_text(text)
    }
}

impl TextLabel for Sentiment {
    fn predict<'a>(
        backend: &'a dyn InferenceBackend,
        text: &'a str,
    ) -> BoxFuture<'a, Result<Prediction<Self>>> {
        backend.analyze_sentiment(text)
    }
}

/// UTF-8 first (a leading BOM is dropped), Latin-1 otherwise.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Read the `text` column of an uploaded CSV, dropping blank cells.
///
/// A missing column is a validation error; anything else that goes wrong
/// while parsing fails the whole batch.
pub fn read_text_rows(bytes: &[u8]) -> Result<Vec<TextRow>> {
    let content = decode_text(bytes);
    if content.trim().is_empty() {
        return Err(ApiError::processing("No columns to parse from file"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(ApiError::processing("No columns to parse from file"));
    }

    let column = headers
        .iter()
        .position(|name| name == TEXT_COLUMN)
        .ok_or_else(|| ApiError::validation(format!("CSV must have a '{}' column", TEXT_COLUMN)))?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let text = record.get(column).unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }
        rows.push(TextRow {
            id: idx + 1,
            text: text.to_string(),
        });
    }

    Ok(rows)
}

pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Classify every row in order. The first failure aborts the batch.
pub async fn run<L: TextLabel>(
    backend: &dyn InferenceBackend,
    rows: &[TextRow],
) -> Result<Vec<ScoredRow<L>>> {
    let mut scored = Vec::with_capacity(rows.len());
    for row in rows {
        let prediction = L::predict(backend, &row.text).await?;
        scored.push(ScoredRow {
            id: row.id,
            text: preview(&row.text),
            prediction,
        });
    }
    Ok(scored)
}

impl ClassificationSummary {
    pub fn tally(rows: &[ScoredRow<Polarity>]) -> Self {
        rows.iter().fold(Self::default(), |mut summary, row| {
            match row.prediction.label {
                Polarity::Positive => summary.positive += 1,
                Polarity::Negative => summary.negative += 1,
            }
            summary
        })
    }
}

impl SentimentSummary {
    pub fn tally(rows: &[ScoredRow<Sentiment>]) -> Self {
        rows.iter().fold(Self::default(), |mut summary, row| {
            match row.prediction.label {
                Sentiment::Positive => summary.positive += 1,
                Sentiment::Negative => summary.negative += 1,
                Sentiment::Neutral => summary.neutral += 1,
            }
            summary
        })
    }
}

impl From<ScoredRow<Polarity>> for ClassificationRecord {
    fn from(row: ScoredRow<Polarity>) -> Self {
        Self {
            id: row.id,
            text: row.text,
            prediction: row.prediction.label,
            confidence: row.prediction.confidence,
        }
    }
}

impl From<ScoredRow<Sentiment>> for SentimentRecord {
    fn from(row: ScoredRow<Sentiment>) -> Self {
        Self {
            id: row.id,
            text: row.text,
            sentiment: row.prediction.label,
            score: row.prediction.confidence,
        }
    }
}

/// First `limit` rows as response records. Summaries are computed before
/// this cut and cover the whole batch.
pub fn first_records<L, R>(rows: Vec<ScoredRow<L>>, limit: usize) -> Vec<R>
where
    R: From<ScoredRow<L>>,
{
    rows.into_iter().take(limit).map(R::from).collect()
}
