use crate::error::{ApiError, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub ml: MlConfig,
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// Which backend answers sentiment and embedding calls.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    #[default]
    HuggingFace,
    Offline,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MlConfig {
    #[serde(default)]
    pub provider: ModelProvider,
    /// Upper bound for a single sentiment or embedding call
    #[serde(default = "default_ml_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub precompute_embeddings: bool,
    #[serde(default = "default_embedding_concurrency")]
    pub embedding_concurrency: usize,
}

impl MlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::default(),
            timeout_secs: default_ml_timeout_secs(),
            precompute_embeddings: false,
            embedding_concurrency: default_embedding_concurrency(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HuggingFaceConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,
    #[serde(default = "default_hf_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            embedding_model: default_embedding_model(),
            sentiment_model: default_sentiment_model(),
            timeout_secs: default_hf_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/dishes.json")
}

fn default_ml_timeout_secs() -> u64 {
    30
}

fn default_embedding_concurrency() -> usize {
    4
}

fn default_base_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_sentiment_model() -> String {
    "distilbert/distilbert-base-uncased-finetuned-sst-2-english".to_string()
}

fn default_hf_timeout_secs() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Config {
    /// Load configuration from `config.toml`, `config.<RUN_ENV>.toml` and
    /// `APP_*` environment variables (`__` separates nested keys), in that
    /// order of precedence.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Config = ConfigBuilder::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name(&format!("config.{}", run_env)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ml.provider == ModelProvider::HuggingFace
            && self.huggingface.api_key.trim().is_empty()
        {
            return Err(ApiError::Config(
                "huggingface.api_key (APP_HUGGINGFACE__API_KEY) must be set when ml.provider = huggingface"
                    .to_string(),
            ));
        }

        if self.ml.timeout_secs == 0 {
            return Err(ApiError::Config(
                "ml.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.ml.embedding_concurrency == 0 {
            return Err(ApiError::Config(
                "ml.embedding_concurrency must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Settings suitable for running without network access.
    pub fn offline(catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            server: ServerConfig::default(),
            catalog: CatalogConfig {
                path: catalog_path.into(),
            },
            ml: MlConfig {
                provider: ModelProvider::Offline,
                ..MlConfig::default()
            },
            huggingface: HuggingFaceConfig::default(),
        }
    }
}
