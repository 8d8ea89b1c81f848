use crate::heuristic::lexicon::{Lexicon, MarkerCounts};
use crate::heuristic::tokenizer::normalize;
use crate::models::{Polarity, Prediction, Sentiment};

const NEUTRAL_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_STEP: f64 = 0.1;
const CONFIDENCE_CAP: f64 = 0.99;

/// Positive/negative decision over marker word counts.
///
/// Ties go to positive, including text with no marker words at all, which
/// comes out as positive with confidence 0.0.
pub fn classify_binary(lexicon: &Lexicon, text: &str) -> Prediction<Polarity> {
    binary_from_counts(lexicon.count(normalize(text)))
}

/// Positive/neutral/negative decision over the marker word imbalance.
///
/// Confidence starts at 0.5 and gains 0.1 per unmatched marker word, capped
/// at 0.99. A balanced text is neutral at exactly 0.5.
pub fn classify_sentiment(lexicon: &Lexicon, text: &str) -> Prediction<Sentiment> {
    sentiment_from_counts(lexicon.count(normalize(text)))
}

pub fn binary_from_counts(counts: MarkerCounts) -> Prediction<Polarity> {
    let total = (counts.positive + counts.negative).max(1) as f64;

    if counts.positive >= counts.negative {
        Prediction::new(Polarity::Positive, counts.positive as f64 / total)
    } else {
        Prediction::new(Polarity::Negative, counts.negative as f64 / total)
    }
}

pub fn sentiment_from_counts(counts: MarkerCounts) -> Prediction<Sentiment> {
    let score = counts.positive as i64 - counts.negative as i64;
    let strength = |imbalance: u64| {
        (NEUTRAL_CONFIDENCE + imbalance as f64 * CONFIDENCE_STEP).min(CONFIDENCE_CAP)
    };

    match score {
        s if s > 0 => Prediction::new(Sentiment::Positive, strength(s.unsigned_abs())),
        s if s < 0 => Prediction::new(Sentiment::Negative, strength(s.unsigned_abs())),
        _ => Prediction::new(Sentiment::Neutral, NEUTRAL_CONFIDENCE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> &'static Lexicon {
        Lexicon::standard()
    }

    #[test]
    fn test_binary_only_positive() {
        let p = classify_binary(lexicon(), "Great product, I love it. Best purchase!");
        assert_eq!(p.label, Polarity::Positive);
        assert_eq!(p.confidence, 1.0);
    }

    #[test]
    fn test_binary_tie_favors_positive() {
        let p = classify_binary(lexicon(), "good food, bad service");
        assert_eq!(p.label, Polarity::Positive);
        assert_eq!(p.confidence, 0.5);
    }

    #[test]
    fn test_binary_no_markers() {
        let p = classify_binary(lexicon(), "The package arrived on Tuesday.");
        assert_eq!(p.label, Polarity::Positive);
        assert_eq!(p.confidence, 0.0);
    }

    #[test]
    fn test_binary_negative_majority() {
        let p = classify_binary(lexicon(), "Terrible, awful, but the box was good");
        assert_eq!(p.label, Polarity::Negative);
        assert_eq!(p.confidence, 0.67);
    }

    #[test]
    fn test_binary_is_case_insensitive() {
        let p = classify_binary(lexicon(), "HORRIBLE");
        assert_eq!(p.label, Polarity::Negative);
        assert_eq!(p.confidence, 1.0);
    }

    #[test]
    fn test_sentiment_two_positive() {
        let p = classify_sentiment(lexicon(), "good and great");
        assert_eq!(p.label, Sentiment::Positive);
        assert_eq!(p.confidence, 0.7);
    }

    #[test]
    fn test_sentiment_neutral() {
        let p = classify_sentiment(lexicon(), "nothing to see here");
        assert_eq!(p.label, Sentiment::Neutral);
        assert_eq!(p.confidence, 0.5);

        let p = classify_sentiment(lexicon(), "happy and sad");
        assert_eq!(p.label, Sentiment::Neutral);
        assert_eq!(p.confidence, 0.5);
    }

    #[test]
    fn test_sentiment_confidence_is_capped() {
        let p = classify_sentiment(lexicon(), "good great excellent amazing love happy");
        assert_eq!(p.label, Sentiment::Positive);
        assert_eq!(p.confidence, 0.99);
    }

    #[test]
    fn test_sentiment_negative() {
        let p = classify_sentiment(lexicon(), "worst experience, poor support, sad");
        assert_eq!(p.label, Sentiment::Negative);
        assert_eq!(p.confidence, 0.8);
    }
}
