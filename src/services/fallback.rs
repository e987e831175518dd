//! Degraded keyword search used when the intelligent pipeline fails.

use crate::models::{Catalog, Dish};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::info;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid word regex"));

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Articles, conjunctions & prepositions
        "a", "an", "the", "and", "or", "but", "if", "so", "than", "too", "very", "of", "at",
        "by", "for", "with", "about", "against", "between", "into", "through", "during",
        "before", "after", "above", "below", "to", "from", "up", "down", "in", "out", "on",
        "off", "over", "under", "again", "further", "then", "once",
        // Pronouns
        "i", "me", "my", "myself", "we", "our", "ours", "you", "your", "yours", "he", "him",
        "his", "she", "her", "hers", "it", "its", "they", "them", "their", "what", "which",
        "who", "whom", "this", "that", "these", "those",
        // Auxiliaries & contraction fragments
        "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "having", "do", "does", "did", "doing", "would", "should", "could", "can", "will",
        "might", "must", "m", "s", "t", "re", "ve", "ll", "d", "nt",
        // Quantifiers & fillers
        "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
        "nor", "not", "only", "own", "same", "just", "now", "here", "there", "when", "where",
        "why", "how", "something", "anything", "really", "please", "get", "make",
    ]
    .into_iter()
    .collect()
});

/// Lower-cased word tokens with stop words and punctuation removed.
pub fn tokenize(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|word| !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// Every dish where some query keyword occurs in category, description, name,
/// cuisine, characteristics or ingredients. Unranked and unbounded; dishes
/// come back in catalog order.
pub fn search<'a>(query: &str, catalog: &'a Catalog) -> Vec<&'a Dish> {
    let keywords = tokenize(query);
    if keywords.is_empty() {
        info!("Fallback search: no usable keywords in '{}'", query);
        return Vec::new();
    }

    let matches: Vec<&Dish> = catalog
        .dishes()
        .filter(|dish| {
            let fields = dish.fallback_fields();
            fields
                .iter()
                .any(|field| keywords.iter().any(|keyword| field.contains(keyword.as_str())))
        })
        .collect();

    info!(
        "Fallback search for {:?} matched {} dishes",
        keywords,
        matches.len()
    );
    matches
}
