use std::collections::HashSet;
use std::sync::OnceLock;

use crate::models::Polarity;

/// Bumped whenever either word list changes; every score depends on them.
pub const LEXICON_VERSION: u32 = 1;

pub const POSITIVE_WORDS: [&str; 10] = [
    "good",
    "great",
    "excellent",
    "amazing",
    "love",
    "happy",
    "wonderful",
    "fantastic",
    "best",
    "awesome",
];

pub const NEGATIVE_WORDS: [&str; 10] = [
    "bad",
    "terrible",
    "awful",
    "hate",
    "worst",
    "poor",
    "horrible",
    "sad",
    "disappointing",
    "angry",
];

/// Marker word hits in one piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerCounts {
    pub positive: usize,
    pub negative: usize,
}

/// Two disjoint, immutable sets of marker words.
#[derive(Debug)]
pub struct Lexicon {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
}

impl Lexicon {
    /// The process-wide lexicon built from [`POSITIVE_WORDS`] and [`NEGATIVE_WORDS`].
    pub fn standard() -> &'static Lexicon {
        static LEXICON: OnceLock<Lexicon> = OnceLock::new();
        LEXICON.get_or_init(|| Lexicon {
            positive: POSITIVE_WORDS.into_iter().collect(),
            negative: NEGATIVE_WORDS.into_iter().collect(),
        })
    }

    /// Tokens are expected to be lowercased already.
    pub fn polarity(&self, token: &str) -> Option<Polarity> {
        if self.positive.contains(token) {
            Some(Polarity::Positive)
        } else if self.negative.contains(token) {
            Some(Polarity::Negative)
        } else {
            None
        }
    }

    pub fn count<I, S>(&self, tokens: I) -> MarkerCounts
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .fold(MarkerCounts::default(), |mut counts, token| {
                match self.polarity(token.as_ref()) {
                    Some(Polarity::Positive) => counts.positive += 1,
                    Some(Polarity::Negative) => counts.negative += 1,
                    None => {}
                }
                counts
            })
    }
}
