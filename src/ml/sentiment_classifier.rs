use crate::error::{ApiError, Result};
use crate::ml::huggingface_client::{HuggingFaceClient, InferenceRequest};
use crate::ml::{Sentiment, SentimentClassifier};
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

/// Sentiment from the HuggingFace text-classification pipeline.
#[derive(Clone)]
pub struct HuggingFaceSentimentClassifier {
    client: HuggingFaceClient,
    model_name: String,
}

impl HuggingFaceSentimentClassifier {
    pub fn new(client: HuggingFaceClient, model_name: impl Into<String>) -> Self {
        let model_name = model_name.into();
        info!("Using sentiment model: {}", model_name);
        Self { client, model_name }
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        let response = self
            .client
            .infer(&self.model_name, &InferenceRequest::new(text))
            .await?;

        let sentiment = top_sentiment(response)?;
        debug!(
            "Sentiment for '{}': {} ({:.3})",
            text, sentiment.label, sentiment.score
        );
        Ok(sentiment)
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// Pick the highest scoring label from `[[{label, score}, ...]]` or
/// `[{label, score}, ...]`.
pub fn top_sentiment(response: Value) -> Result<Sentiment> {
    let candidates = match response {
        Value::Array(mut outer) if matches!(outer.first(), Some(Value::Array(_))) => {
            outer.swap_remove(0)
        }
        other => other,
    };

    let scores: Vec<LabelScore> = serde_json::from_value(candidates)?;

    let best = scores
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| ApiError::ModelInvocation("Sentiment response is empty".to_string()))?;

    Ok(Sentiment::new(best.label, best.score))
}
