use crate::services::emotion_analyzer::EmotionalContext;
use crate::services::lexicon::{EmotionCategory, Mood};
use std::collections::HashSet;

/// Filler words dropped from the query before it becomes direct keywords.
const QUERY_STOPWORDS: &[&str] = &["i", "am", "feel", "feeling", "like", "want", "need"];

/// Deduplicated keywords used for substring matching. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }
}

impl FromIterator<String> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let keywords = iter
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();
        Self { keywords }
    }
}

/// Whitespace tokens of the lower-cased query, minus the filler words.
/// Tokens are otherwise kept as-is (punctuation included).
pub fn direct_keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|word| !QUERY_STOPWORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// Moods whose food descriptors extend the keyword set for this context.
///
/// `mood` is detected but maps to no mood on purpose; see DESIGN.md.
pub fn contextual_moods(query: &str, context: &EmotionalContext) -> Vec<Mood> {
    let query_lower = query.to_lowercase();
    let mut moods: Vec<Mood> = context
        .emotions
        .iter()
        .filter_map(|emotion| match emotion {
            EmotionCategory::Stress | EmotionCategory::Comfort => Some(Mood::Stressed),
            EmotionCategory::Energy => {
                if query_lower.contains("tired") || query_lower.contains("sleepy") {
                    Some(Mood::Tired)
                } else {
                    Some(Mood::Energetic)
                }
            }
            EmotionCategory::Physical => Some(Mood::Jumpy),
            EmotionCategory::Mood => None,
        })
        .collect();

    if context.is_negative() {
        moods.push(Mood::Sad);
    }

    moods
}

pub fn generate(query: &str, context: &EmotionalContext) -> KeywordSet {
    let descriptors = contextual_moods(query, context)
        .into_iter()
        .flat_map(|mood| mood.foods().iter().map(|food| food.to_string()));

    direct_keywords(query).into_iter().chain(descriptors).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{Sentiment, NEGATIVE, POSITIVE};
    use crate::services::emotion_analyzer::detect_emotions;

    fn context(query: &str, label: &str) -> EmotionalContext {
        EmotionalContext::new(detect_emotions(query), Sentiment::new(label, 0.8))
    }

    #[test]
    fn test_stopwords_removed_tokens_kept_verbatim() {
        assert_eq!(
            direct_keywords("I feel jumpy and restless!"),
            vec!["jumpy", "and", "restless!"]
        );
        assert_eq!(direct_keywords("I'm hungry"), vec!["i'm", "hungry"]);
    }

    #[test]
    fn test_jumpy_query_gets_calming_descriptors() {
        let query = "I feel jumpy and restless";
        let keywords = generate(query, &context(query, POSITIVE));

        assert!(keywords.contains("calming foods"));
        assert!(keywords.contains("magnesium rich"));
        assert!(keywords.contains("jumpy"));
        assert!(!keywords.contains("feel"));
    }

    #[test]
    fn test_stress_and_comfort_share_descriptors_once() {
        let query = "I'm stressed and need comfort food";
        let keywords = generate(query, &context(query, POSITIVE));

        assert!(keywords.contains("warm soup"));
        assert!(keywords.contains("chocolate"));
        assert!(keywords.contains("tea"));
        assert_eq!(keywords.iter().filter(|k| *k == "comfort food").count(), 1);
    }

    #[test]
    fn test_energy_splits_on_tiredness() {
        let tired = "tired after the gym";
        let keywords = generate(tired, &context(tired, POSITIVE));
        assert!(keywords.contains("energy boosting"));
        assert!(!keywords.contains("spicy food"));

        let pumped = "pumped after the gym";
        let keywords = generate(pumped, &context(pumped, POSITIVE));
        assert!(keywords.contains("spicy food"));
        assert!(!keywords.contains("energy boosting"));
    }

    #[test]
    fn test_mood_category_adds_nothing() {
        let query = "happy day";
        let ctx = context(query, POSITIVE);
        assert_eq!(ctx.emotions, vec![EmotionCategory::Mood]);
        assert!(contextual_moods(query, &ctx).is_empty());

        let keywords = generate(query, &ctx);
        assert_eq!(keywords.len(), 2);
    }

    #[test]
    fn test_negative_sentiment_adds_sad_descriptors() {
        let query = "plain food";
        let keywords = generate(query, &context(query, NEGATIVE));
        assert!(keywords.contains("ice cream"));
        assert!(keywords.contains("sweet treats"));

        let keywords = generate(query, &context(query, POSITIVE));
        assert_eq!(keywords.iter().collect::<Vec<_>>(), vec!["plain", "food"]);
    }

    #[test]
    fn test_duplicate_tokens_collapse() {
        let set: KeywordSet = vec!["tea".to_string(), "tea".to_string(), "soup".to_string()]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }
}
