use std::sync::OnceLock;

use regex::Regex;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Za-z']+").expect("token pattern is valid"))
}

/// Split text into lowercase runs of ASCII letters and apostrophes.
///
/// Digits, punctuation and whitespace only separate tokens and never appear
/// in the output.
pub fn normalize(text: &str) -> Vec<String> {
    token_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}
