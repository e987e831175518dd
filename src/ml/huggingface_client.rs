use crate::config::HuggingFaceConfig;
use crate::error::{ApiError, Result};
use log::{debug, info, warn};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_CONNECTION_TIMEOUT_SECONDS: u64 = 15;

/// Thin wrapper around the HuggingFace Inference API shared by the
/// embedding and sentiment backends.
#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry_attempts: u32,
    retry_delay_ms: u64,
}

impl HuggingFaceClient {
    pub fn new(config: &HuggingFaceConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ApiError::Config(
                "HuggingFace API key is empty".to_string(),
            ));
        }

        info!(
            "Initializing HuggingFace client at {} (timeout: {}s, retries: {})",
            config.base_url, config.timeout_secs, config.retry_attempts
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECONDS))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_attempts: config.retry_attempts.max(1),
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    /// POST `body` to the model endpoint, retrying with exponential backoff.
    pub async fn infer<B: Serialize + ?Sized>(
        &self,
        model: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let url = self.model_url(model);
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            match self.try_infer(&url, model, body).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt < self.retry_attempts {
                        let delay = self.retry_delay_ms * 2u64.pow(attempt - 1);
                        warn!(
                            "HuggingFace request to {} failed (attempt {}/{}): {}. Retrying in {}ms",
                            model, attempt, self.retry_attempts, e, delay
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ApiError::ModelInvocation(format!("All retry attempts failed for {}", model))
        }))
    }

    async fn try_infer<B: Serialize + ?Sized>(
        &self,
        url: &str,
        model: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                ApiError::ModelInvocation(format!("Failed to send request to {}: {}", model, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                404 => ApiError::ModelInvocation(format!("Model not found: {}", model)),
                401 | 403 => ApiError::ModelInvocation(
                    "Authentication failed. Please check your HuggingFace API key.".to_string(),
                ),
                429 => ApiError::ModelInvocation(
                    "Rate limit exceeded on the HuggingFace Inference API".to_string(),
                ),
                _ => ApiError::ModelInvocation(format!(
                    "HuggingFace API returned {} for {}: {}",
                    status, model, text
                )),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::ModelInvocation(format!("Failed to read response: {}", e)))?;
        debug!("Received {} bytes from {}", text.len(), model);

        Ok(serde_json::from_str(&text)?)
    }
}

/// Request envelope understood by the hosted inference pipelines.
#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a, T: Serialize + ?Sized> {
    pub inputs: &'a T,
    pub options: InferenceOptions,
}

#[derive(Debug, Serialize)]
pub struct InferenceOptions {
    pub wait_for_model: bool,
    pub use_cache: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            wait_for_model: true,
            use_cache: true,
        }
    }
}

impl<'a, T: Serialize + ?Sized> InferenceRequest<'a, T> {
    pub fn new(inputs: &'a T) -> Self {
        Self {
            inputs,
            options: InferenceOptions::default(),
        }
    }
}
