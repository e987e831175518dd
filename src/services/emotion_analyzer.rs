use crate::error::Result;
use crate::ml::{with_timeout, Sentiment, SentimentClassifier};
use crate::services::lexicon::EmotionCategory;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Emotional reading of one query. Rebuilt for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalContext {
    /// Detected categories, each at most once, in lexicon order
    pub emotions: Vec<EmotionCategory>,
    pub sentiment: Sentiment,
    pub confidence: f32,
}

impl EmotionalContext {
    pub fn new(emotions: Vec<EmotionCategory>, sentiment: Sentiment) -> Self {
        Self {
            emotions,
            confidence: sentiment.score,
            sentiment,
        }
    }

    pub fn has(&self, category: EmotionCategory) -> bool {
        self.emotions.contains(&category)
    }

    pub fn is_negative(&self) -> bool {
        self.sentiment.is_negative()
    }
}

/// Categories whose trigger phrases occur in the lower-cased query.
pub fn detect_emotions(query: &str) -> Vec<EmotionCategory> {
    let query_lower = query.to_lowercase();
    EmotionCategory::ALL
        .into_iter()
        .filter(|category| {
            category
                .triggers()
                .iter()
                .any(|trigger| query_lower.contains(trigger))
        })
        .collect()
}

#[derive(Clone)]
pub struct EmotionAnalyzer {
    classifier: Arc<dyn SentimentClassifier>,
    timeout: Duration,
}

impl EmotionAnalyzer {
    pub fn new(classifier: Arc<dyn SentimentClassifier>, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
        }
    }

    pub async fn analyze(&self, query: &str) -> Result<EmotionalContext> {
        let emotions = detect_emotions(query);

        // The classifier gets the query exactly as typed.
        let sentiment =
            with_timeout("sentiment classification", self.timeout, self.classifier.classify(query))
                .await?;

        info!(
            emotions = ?emotions,
            sentiment = %sentiment.label,
            confidence = sentiment.score,
            "Analyzed emotional context"
        );

        Ok(EmotionalContext::new(emotions, sentiment))
    }
}
