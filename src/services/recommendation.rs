use crate::error::{ApiError, Result};
use crate::models::{Catalog, Dish};
use crate::services::fallback;
use crate::services::ranking::{Ranking, RankingEngine};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Which strategy produced a `/search` result.
#[derive(Debug)]
pub enum SearchOutcome<'a> {
    /// The full emotion + keyword + similarity pipeline ran.
    Ranked(Ranking<'a>),
    /// The pipeline failed; results come from plain substring matching.
    Degraded {
        results: Vec<&'a Dish>,
        cause: ApiError,
    },
}

impl<'a> SearchOutcome<'a> {
    pub fn dishes(&self) -> Vec<&'a Dish> {
        match self {
            SearchOutcome::Ranked(ranking) => ranking.results.iter().map(|r| r.dish).collect(),
            SearchOutcome::Degraded { results, .. } => results.clone(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SearchOutcome::Degraded { .. })
    }
}

pub struct RecommendationService {
    catalog: Arc<Catalog>,
    engine: RankingEngine,
    prewarmed: AtomicBool,
}

impl RecommendationService {
    pub fn new(catalog: Arc<Catalog>, engine: RankingEngine) -> Self {
        Self {
            catalog,
            engine,
            prewarmed: AtomicBool::new(false),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Ranked recommendations, degrading to keyword search on any failure.
    pub async fn search(&self, query: &str) -> SearchOutcome<'_> {
        match self.engine.rank(query).await {
            Ok(ranking) => SearchOutcome::Ranked(ranking),
            Err(e) => {
                error!("Intelligent search failed for '{}': {}. Using fallback search", query, e);
                SearchOutcome::Degraded {
                    results: fallback::search(query, &self.catalog),
                    cause: e,
                }
            }
        }
    }

    /// Ranked recommendations with no degraded path.
    pub async fn smart_search(&self, query: &str) -> Result<Ranking<'_>> {
        self.engine.rank(query).await.map_err(|e| {
            error!("Smart search failed for '{}': {}", query, e);
            e
        })
    }

    /// Fill the dish-embedding cache ahead of the first request.
    ///
    /// Returns true if this call did the warm-up.
    pub async fn prewarm(&self) -> Result<bool> {
        if self.prewarmed.load(Ordering::Acquire) {
            debug!("RecommendationService already prewarmed, skipping");
            return Ok(false);
        }

        info!("Warming up RecommendationService...");
        let embeddings = self.engine.scorer().dish_embeddings().await.map_err(|e| {
            warn!("Prewarm could not embed the catalog: {}", e);
            e
        })?;

        let first = !self.prewarmed.swap(true, Ordering::AcqRel);
        info!(
            "RecommendationService warmed up with {} dish embeddings",
            embeddings.len()
        );
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{Embedder, HashingEmbedder, LexiconSentimentClassifier};
    use crate::services::{EmotionAnalyzer, SemanticScorer};
    use async_trait::async_trait;
    use std::time::Duration;

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        fn model_name(&self) -> &str {
            "broken"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(ApiError::ModelInvocation("embedding service raised".to_string()))
        }
    }

    fn service(embedder: Arc<dyn Embedder>) -> RecommendationService {
        let catalog = Arc::new(
            Catalog::from_json(
                r#"{
                    "soup": {"name": "Miso Soup", "description": "warm soup with tofu", "categoryName": "Soup", "dish_characteristics": ["comfort food"]},
                    "cake": {"name": "Lava Cake", "description": "molten chocolate", "categoryName": "Dessert"},
                    "salad": {"name": "Citrus Salad", "description": "fresh and zesty", "categoryName": "Salad"}
                }"#,
            )
            .unwrap(),
        );
        let timeout = Duration::from_secs(5);
        let engine = RankingEngine::new(
            catalog.clone(),
            EmotionAnalyzer::new(Arc::new(LexiconSentimentClassifier::new()), timeout),
            SemanticScorer::new(embedder, catalog.clone(), timeout, 2),
        );
        RecommendationService::new(catalog, engine)
    }

    #[tokio::test]
    async fn test_search_ranks_when_pipeline_works() {
        let service = service(Arc::new(HashingEmbedder::default()));
        let outcome = service.search("I'm stressed and need comfort food").await;

        assert!(!outcome.is_degraded());
        let dishes = outcome.dishes();
        assert_eq!(dishes.len(), 3);
        assert_eq!(dishes[0].name, "Miso Soup");
    }

    #[tokio::test]
    async fn test_search_degrades_on_embedding_failure() {
        let service = service(Arc::new(BrokenEmbedder));
        let outcome = service.search("chocolate please").await;

        match &outcome {
            SearchOutcome::Degraded { results, cause } => {
                assert!(cause.is_model_failure());
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].name, "Lava Cake");
            }
            SearchOutcome::Ranked(_) => panic!("expected degraded outcome"),
        }
    }

    #[tokio::test]
    async fn test_smart_search_has_no_fallback() {
        let service = service(Arc::new(BrokenEmbedder));
        assert!(service.smart_search("chocolate").await.is_err());
    }

    #[tokio::test]
    async fn test_prewarm_runs_once() {
        let service = service(Arc::new(HashingEmbedder::default()));
        assert!(service.prewarm().await.unwrap());
        assert!(!service.prewarm().await.unwrap());
    }

    #[tokio::test]
    async fn test_prewarm_failure_is_reported() {
        let service = service(Arc::new(BrokenEmbedder));
        assert!(service.prewarm().await.is_err());
    }
}
