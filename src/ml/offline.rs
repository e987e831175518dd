//! Network-free model backends for local development.
//!
//! Both are deterministic, so repeated calls with the same text always
//! produce the same label and the same vector.

use crate::error::Result;
use crate::ml::{Embedder, Sentiment, SentimentClassifier, NEGATIVE, POSITIVE};
use async_trait::async_trait;
use std::collections::HashSet;
use std::hash::Hasher;
use twox_hash::XxHash64;

const DEFAULT_DIMENSION: usize = 384;
const HASH_SEED: u64 = 0;

const POSITIVE_CUES: &[&str] = &[
    "good", "great", "happy", "excited", "love", "celebrate", "celebration", "energetic",
    "pumped", "amazing", "wonderful", "fun", "glad", "relaxed", "cozy", "fantastic",
];

const NEGATIVE_CUES: &[&str] = &[
    "sad", "down", "depressed", "stressed", "overwhelmed", "tense", "anxious", "tired",
    "sleepy", "restless", "jumpy", "fidgety", "bad", "awful", "terrible", "lonely", "angry",
    "exhausted", "worried", "upset", "hate", "pressure",
];

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Cue-word polarity classifier.
#[derive(Debug, Clone)]
pub struct LexiconSentimentClassifier {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
}

impl LexiconSentimentClassifier {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_CUES.iter().copied().collect(),
            negative: NEGATIVE_CUES.iter().copied().collect(),
        }
    }

    pub fn score(&self, text: &str) -> Sentiment {
        let (mut positive_hits, mut negative_hits) = (0u32, 0u32);
        for word in words(text) {
            if self.positive.contains(word.as_str()) {
                positive_hits += 1;
            } else if self.negative.contains(word.as_str()) {
                negative_hits += 1;
            }
        }

        let total = positive_hits + negative_hits;
        let positive_share = if total == 0 {
            0.5
        } else {
            positive_hits as f32 / total as f32
        };

        if positive_share >= 0.5 {
            Sentiment::new(POSITIVE, positive_share)
        } else {
            Sentiment::new(NEGATIVE, 1.0 - positive_share)
        }
    }
}

impl Default for LexiconSentimentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SentimentClassifier for LexiconSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        Ok(self.score(text))
    }
}

/// Signed feature-hashing bag-of-words embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for word in words(text) {
            let mut hasher = XxHash64::with_seed(HASH_SEED);
            hasher.write(word.as_bytes());
            let hash = hasher.finish();

            let index = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        "offline-feature-hashing"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }
}
