use crate::error::Result;
use crate::ml::{cosine_similarity, with_timeout, Embedder};
use crate::models::{Catalog, Dish};
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

const EMBEDDING_CHUNK_SIZE: usize = 8;

/// Cosine similarity between a query and catalog dishes.
///
/// Dish embeddings do not depend on the query, so they are computed once
/// and reused for the lifetime of the (immutable) catalog.
pub struct SemanticScorer {
    embedder: Arc<dyn Embedder>,
    catalog: Arc<Catalog>,
    timeout: Duration,
    concurrency: usize,
    dish_embeddings: OnceCell<Vec<Vec<f32>>>,
}

impl SemanticScorer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        catalog: Arc<Catalog>,
        timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            embedder,
            catalog,
            timeout,
            concurrency: concurrency.max(1),
            dish_embeddings: OnceCell::new(),
        }
    }

    pub fn is_warm(&self) -> bool {
        self.dish_embeddings.initialized()
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        with_timeout("query embedding", self.timeout, self.embedder.embed(query)).await
    }

    /// Similarity of a single dish to the query, embedding both from scratch.
    pub async fn score(&self, query: &str, dish: &Dish) -> Result<f32> {
        let query_embedding = self.embed_query(query).await?;
        let dish_embedding = with_timeout(
            "dish embedding",
            self.timeout,
            self.embedder.embed(&dish.representation()),
        )
        .await?;
        cosine_similarity(&query_embedding, &dish_embedding)
    }

    /// Similarity of every catalog dish to the query, in catalog order.
    pub async fn similarities(&self, query: &str) -> Result<Vec<f32>> {
        let query_embedding = self.embed_query(query).await?;
        let dish_embeddings = self.dish_embeddings().await?;

        dish_embeddings
            .iter()
            .map(|dish_embedding| cosine_similarity(&query_embedding, dish_embedding))
            .collect()
    }

    /// Cached dish embeddings, computed on first use. A failed attempt
    /// leaves the cache empty so the next call retries.
    pub async fn dish_embeddings(&self) -> Result<&[Vec<f32>]> {
        let embeddings = self
            .dish_embeddings
            .get_or_try_init(|| self.compute_dish_embeddings())
            .await?;
        Ok(embeddings.as_slice())
    }

    async fn compute_dish_embeddings(&self) -> Result<Vec<Vec<f32>>> {
        info!(
            "Embedding {} dishes with {} (concurrency {})",
            self.catalog.len(),
            self.embedder.model_name(),
            self.concurrency
        );

        let representations: Vec<String> =
            self.catalog.dishes().map(Dish::representation).collect();

        let chunks: Vec<Vec<String>> = representations
            .chunks(EMBEDDING_CHUNK_SIZE)
            .map(<[String]>::to_vec)
            .collect();

        // `buffered` yields in submission order, keeping embeddings aligned
        // with catalog order regardless of completion order.
        let batches: Vec<Vec<Vec<f32>>> = futures::stream::iter(chunks)
            .map(|chunk| async move {
                with_timeout(
                    "dish embedding",
                    self.timeout,
                    self.embedder.embed_batch(&chunk),
                )
                .await
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let embeddings: Vec<Vec<f32>> = batches.into_iter().flatten().collect();
        debug!("Cached {} dish embeddings", embeddings.len());
        Ok(embeddings)
    }
}
