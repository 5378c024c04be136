//! Unicode-aware tokenization with an English stopword list. No stemming.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// English stop words. Kept sorted for binary search.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Minimum token length in characters.
const MIN_TOKEN_LENGTH: usize = 2;

/// How one field's values are turned into terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Tokenizer {
    /// Unicode word segmentation, lower-cased, optional stopword removal
    Unicode {
        #[serde(default = "default_stopwords")]
        stopwords: bool,
    },
    /// Every value is a single term (category names, tags)
    Phrase,
}

fn default_stopwords() -> bool {
    true
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::Unicode { stopwords: true }
    }
}

impl Tokenizer {
    /// Append the terms of `text` to `out`.
    pub fn tokens_into(&self, text: &str, out: &mut Vec<String>) {
        match self {
            Self::Unicode { stopwords } => out.extend(tokenize(text, *stopwords)),
            Self::Phrase => out.extend(phrase(text)),
        }
    }
}

/// Split text on Unicode word boundaries and normalize the words.
///
/// Underscores separate words (slugs, category path steps).
pub fn tokenize(text: &str, stopwords: bool) -> Vec<String> {
    let text = text.replace('_', " ");
    text.unicode_words()
        .map(|word| word.to_lowercase())
        .filter(|token| token.chars().count() >= MIN_TOKEN_LENGTH)
        .filter(|token| !stopwords || !is_stop_word(token))
        .collect()
}

/// Whole-value term: underscores become spaces, surrounding whitespace trimmed.
pub fn phrase(text: &str) -> Option<String> {
    let term = text.replace('_', " ");
    let term = term.trim();
    if term.is_empty() {
        None
    } else {
        Some(term.to_string())
    }
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}
