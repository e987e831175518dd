use crate::error::{ApiError, Result};
use crate::ml::huggingface_client::{HuggingFaceClient, InferenceRequest};
use crate::ml::Embedder;
use async_trait::async_trait;
use log::{debug, info};
use ndarray::{Array2, Axis};
use serde_json::Value;

const BATCH_SIZE_LIMIT: usize = 8;
const MAX_TEXT_PREVIEW_LENGTH: usize = 100;

/// Sentence embeddings from the HuggingFace feature-extraction pipeline.
#[derive(Clone)]
pub struct HuggingFaceEmbedder {
    client: HuggingFaceClient,
    model_name: String,
}

impl HuggingFaceEmbedder {
    pub fn new(client: HuggingFaceClient, model_name: impl Into<String>) -> Self {
        let model_name = model_name.into();
        info!("Using embedding model: {}", model_name);
        Self { client, model_name }
    }

    fn preprocess_text(text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return "empty text".to_string();
        }
        trimmed.to_string()
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = Self::preprocess_text(text);
        debug!(
            "Encoding text (length: {}): {}",
            input.len(),
            input.chars().take(MAX_TEXT_PREVIEW_LENGTH).collect::<String>()
        );

        let response = self
            .client
            .infer(&self.model_name, &InferenceRequest::new(input.as_str()))
            .await?;

        extract_embedding(&response)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE_LIMIT) {
            let inputs: Vec<String> = chunk.iter().map(|t| Self::preprocess_text(t)).collect();
            let response = self
                .client
                .infer(&self.model_name, &InferenceRequest::new(&inputs))
                .await?;

            let rows = response.as_array().ok_or_else(|| {
                ApiError::ModelInvocation("Batch embedding response is not an array".to_string())
            })?;

            if rows.len() != inputs.len() {
                return Err(ApiError::ModelInvocation(format!(
                    "Requested {} embeddings, received {}",
                    inputs.len(),
                    rows.len()
                )));
            }

            for row in rows {
                embeddings.push(extract_embedding(row)?);
            }
        }

        debug!("Encoded batch of {} texts", embeddings.len());
        Ok(embeddings)
    }
}

/// Pull a sentence vector out of the shapes the inference API returns.
///
/// - `[f32]` pooled sentence embedding
/// - `[[f32]]` either one pooled row or per-token rows (mean-pooled)
/// - `[[[f32]]]` per-token rows for a batch of one (mean-pooled)
/// - `{"embedding": [f32]}` / `{"embeddings": [[f32]]}`
pub fn extract_embedding(value: &Value) -> Result<Vec<f32>> {
    match value {
        Value::Array(items) if items.is_empty() => Err(ApiError::ModelInvocation(
            "Received empty array from model".to_string(),
        )),
        Value::Array(items) => match &items[0] {
            Value::Number(_) => to_vector(items),
            Value::Array(inner) if matches!(inner.first(), Some(Value::Array(_))) => {
                mean_pool(inner)
            }
            Value::Array(_) if items.len() == 1 => extract_embedding(&items[0]),
            Value::Array(_) => mean_pool(items),
            other => Err(ApiError::ModelInvocation(format!(
                "Unexpected embedding element: {}",
                other
            ))),
        },
        Value::Object(map) => {
            if let Some(embedding) = map.get("embedding") {
                return extract_embedding(embedding);
            }
            match map.get("embeddings").and_then(Value::as_array) {
                Some(rows) if !rows.is_empty() => extract_embedding(&rows[0]),
                _ => Err(ApiError::ModelInvocation(
                    "Failed to extract embedding from response".to_string(),
                )),
            }
        }
        other => Err(ApiError::ModelInvocation(format!(
            "Unexpected embedding response: {}",
            other
        ))),
    }
}

fn to_vector(items: &[Value]) -> Result<Vec<f32>> {
    items
        .iter()
        .map(|v| {
            v.as_f64().map(|f| f as f32).ok_or_else(|| {
                ApiError::ModelInvocation(format!("Non-numeric embedding value: {}", v))
            })
        })
        .collect()
}

/// Average token vectors into one sentence vector.
fn mean_pool(rows: &[Value]) -> Result<Vec<f32>> {
    let vectors = rows
        .iter()
        .map(|row| match row {
            Value::Array(items) => to_vector(items),
            other => Err(ApiError::ModelInvocation(format!(
                "Unexpected token vector: {}",
                other
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    let dim = vectors.first().map(Vec::len).unwrap_or(0);
    if dim == 0 {
        return Err(ApiError::ModelInvocation(
            "Token vectors are empty".to_string(),
        ));
    }

    if let Some(row) = vectors.iter().find(|row| row.len() != dim) {
        return Err(ApiError::ModelInvocation(format!(
            "Ragged token vectors: expected width {}, got {}",
            dim,
            row.len()
        )));
    }

    let tokens = vectors.len();
    let flat: Vec<f32> = vectors.into_iter().flatten().collect();
    let matrix = Array2::from_shape_vec((tokens, dim), flat)?;

    matrix
        .mean_axis(Axis(0))
        .map(|pooled| pooled.to_vec())
        .ok_or_else(|| ApiError::ModelInvocation("Cannot pool zero tokens".to_string()))
}
