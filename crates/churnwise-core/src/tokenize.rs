//! Tokenizer shared by index construction and query parsing.
//!
//! Splits on every character that is not alphanumeric or `_`, lower-cases,
//! and drops tokens shorter than [`MIN_TOKEN_CHARS`].

/// Single-character tokens carry no signal for this corpus.
pub const MIN_TOKEN_CHARS: usize = 2;

pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
        .collect()
}
