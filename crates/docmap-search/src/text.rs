//! Keyword and excerpt extraction from plain text.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

/// Words too common to be useful search keywords.
const STOPWORDS: &[&str] = &[
    "a", "about", "all", "an", "and", "any", "are", "as", "at", "be", "been", "but", "by", "can",
    "did", "do", "does", "each", "for", "from", "had", "has", "have", "he", "her", "his", "how",
    "if", "in", "is", "it", "its", "more", "most", "no", "not", "of", "on", "or", "other", "our",
    "she", "so", "some", "such", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "those", "to", "was", "we", "were", "what", "when", "where", "which", "who",
    "why", "will", "with", "you", "your",
];

/// Top `max` words of the text by frequency.
///
/// Tokens are case-folded; single characters and stopwords are dropped.
/// Equal frequencies keep first-occurrence order, so the result is stable
/// for a given text.
#[must_use]
pub fn keywords(text: &str, max: usize) -> Vec<String> {
    let lowered = text.to_lowercase();

    let mut slot_by_word: HashMap<&str, usize> = HashMap::new();
    let mut counted: Vec<(&str, usize)> = Vec::new();
    for word in WORD.find_iter(&lowered).map(|m| m.as_str()) {
        if word.chars().count() < 2 || STOPWORDS.contains(&word) {
            continue;
        }
        match slot_by_word.get(word) {
            Some(&slot) => counted[slot].1 += 1,
            None => {
                slot_by_word.insert(word, counted.len());
                counted.push((word, 1));
            }
        }
    }

    counted.sort_by(|a, b| b.1.cmp(&a.1));
    counted
        .into_iter()
        .take(max)
        .map(|(word, _)| word.to_owned())
        .collect()
}

/// Leading `max_chars` characters of the text, with an ellipsis when
/// truncated.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_owned()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}
