//! Model capabilities consumed by the recommendation pipeline.
//!
//! The pipeline only sees the two narrow traits below, so the hosted
//! HuggingFace backends and the offline backend are interchangeable, and
//! tests can plug in deterministic stubs.

pub mod huggingface_client;
pub mod huggingface_embedder;
pub mod offline;
pub mod sentiment_classifier;
pub mod similarity;

use crate::error::{ApiError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

pub use huggingface_client::HuggingFaceClient;
pub use huggingface_embedder::HuggingFaceEmbedder;
pub use offline::{HashingEmbedder, LexiconSentimentClassifier};
pub use sentiment_classifier::HuggingFaceSentimentClassifier;
pub use similarity::cosine_similarity;

pub const POSITIVE: &str = "POSITIVE";
pub const NEGATIVE: &str = "NEGATIVE";

/// Top label reported by a sentiment classifier, passed through unchanged.
///
/// Labels are whatever the model emits (`POSITIVE`, `neutral`, `LABEL_2`, ...);
/// only a negative label changes how a query is handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f32,
}

impl Sentiment {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.label.eq_ignore_ascii_case(NEGATIVE)
    }
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Sentiment>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

/// Run a model call with an upper time bound.
pub async fn with_timeout<T, F>(operation: &'static str, limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::ModelTimeout {
            operation,
            secs: limit.as_secs(),
        }),
    }
}
