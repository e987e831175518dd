use crate::error::{ApiError, Result};
use crate::models::{Catalog, Dish};
use crate::services::emotion_analyzer::{EmotionAnalyzer, EmotionalContext};
use crate::services::keyword_generator::{self, KeywordSet};
use crate::services::semantic_scorer::SemanticScorer;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

pub const SEMANTIC_WEIGHT: f32 = 0.6;
/// Applied to the raw match count, which is not normalised, so several
/// keyword hits can outweigh any similarity difference.
pub const KEYWORD_WEIGHT: f32 = 0.4;
pub const TOP_N: usize = 5;

/// A dish with the scores that placed it in the ranking.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDish<'a> {
    pub dish: &'a Dish,
    pub similarity: f32,
    pub keyword_matches: usize,
    pub score: f32,
    pub reasoning: String,
}

impl<'a> ScoredDish<'a> {
    pub fn new(dish: &'a Dish, similarity: f32, keyword_matches: usize) -> Self {
        Self {
            dish,
            similarity,
            keyword_matches,
            score: combined_score(similarity, keyword_matches),
            reasoning: format!(
                "Semantic similarity: {:.3}, Keyword matches: {}",
                similarity, keyword_matches
            ),
        }
    }
}

pub fn combined_score(similarity: f32, keyword_matches: usize) -> f32 {
    SEMANTIC_WEIGHT * similarity + KEYWORD_WEIGHT * keyword_matches as f32
}

/// Number of keywords found (case-insensitively, as substrings) in any of the
/// dish's name, description, category, ingredients or characteristics.
/// Each keyword counts at most once.
pub fn keyword_score(dish: &Dish, keywords: &KeywordSet) -> usize {
    let fields = dish.ranking_fields();
    keywords
        .iter()
        .filter(|keyword| {
            let keyword = keyword.to_lowercase();
            fields.iter().any(|field| field.contains(&keyword))
        })
        .count()
}

fn sort_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

/// Sort by combined score, highest first, and keep the top `limit`.
/// The sort is stable, so equal scores keep catalog order. NaN scores sort
/// last.
pub fn select_top(mut scored: Vec<ScoredDish<'_>>, limit: usize) -> Vec<ScoredDish<'_>> {
    scored.sort_by(|a, b| sort_key(b.score).total_cmp(&sort_key(a.score)));
    scored.truncate(limit);
    scored
}

/// Output of one intelligent ranking pass.
#[derive(Debug, Clone)]
pub struct Ranking<'a> {
    pub context: EmotionalContext,
    pub keywords: KeywordSet,
    pub results: Vec<ScoredDish<'a>>,
}

pub struct RankingEngine {
    catalog: Arc<Catalog>,
    analyzer: EmotionAnalyzer,
    scorer: SemanticScorer,
}

impl RankingEngine {
    pub fn new(catalog: Arc<Catalog>, analyzer: EmotionAnalyzer, scorer: SemanticScorer) -> Self {
        Self {
            catalog,
            analyzer,
            scorer,
        }
    }

    pub fn scorer(&self) -> &SemanticScorer {
        &self.scorer
    }

    pub async fn rank(&self, query: &str) -> Result<Ranking<'_>> {
        let context = self.analyzer.analyze(query).await?;
        let keywords = keyword_generator::generate(query, &context);
        info!("Generated {} keywords for '{}'", keywords.len(), query);
        debug!(keywords = ?keywords.iter().collect::<Vec<_>>(), "Keyword set");

        let similarities = self.scorer.similarities(query).await?;
        if similarities.len() != self.catalog.len() {
            return Err(ApiError::Pipeline(format!(
                "Got {} similarities for {} dishes",
                similarities.len(),
                self.catalog.len()
            )));
        }

        let scored: Vec<ScoredDish<'_>> = self
            .catalog
            .dishes()
            .zip(similarities)
            .map(|(dish, similarity)| {
                let scored = ScoredDish::new(dish, similarity, keyword_score(dish, &keywords));
                debug!(
                    "Scored '{}': similarity={:.3}, keyword_matches={}, score={:.3}",
                    dish.name, scored.similarity, scored.keyword_matches, scored.score
                );
                scored
            })
            .collect();

        let results = select_top(scored, TOP_N);
        info!(
            "Ranked {} dishes for '{}', top: {:?}",
            results.len(),
            query,
            results.first().map(|r| r.dish.name.as_str())
        );

        Ok(Ranking {
            context,
            keywords,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{
        Embedder, HashingEmbedder, Sentiment, SentimentClassifier, POSITIVE,
    };
    use crate::services::lexicon::EmotionCategory;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::time::Duration;

    fn dish(name: &str, description: &str, characteristics: &[&str]) -> Dish {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "description": description,
            "categoryName": "Main",
            "dish_characteristics": characteristics,
            "main_ingredients": [],
        }))
        .unwrap()
    }

    fn keywords(words: &[&str]) -> KeywordSet {
        words.iter().map(|w| w.to_string()).collect()
    }

    struct Neutral;

    #[async_trait]
    impl SentimentClassifier for Neutral {
        async fn classify(&self, _text: &str) -> Result<Sentiment> {
            Ok(Sentiment::new(POSITIVE, 0.7))
        }
    }

    /// Every text maps to the same direction, so similarity is always 1.
    struct ConstantEmbedder;

    #[async_trait]
    impl Embedder for ConstantEmbedder {
        fn model_name(&self) -> &str {
            "constant"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 1.0])
        }
    }

    fn engine(catalog: Catalog, embedder: Arc<dyn Embedder>) -> RankingEngine {
        let catalog = Arc::new(catalog);
        let timeout = Duration::from_secs(5);
        RankingEngine::new(
            catalog.clone(),
            EmotionAnalyzer::new(Arc::new(Neutral), timeout),
            SemanticScorer::new(embedder, catalog, timeout, 2),
        )
    }

    #[test]
    fn test_reasoning_format() {
        let d = dish("Tea", "", &[]);
        let scored = ScoredDish::new(&d, 0.12345, 2);
        assert_eq!(
            scored.reasoning,
            "Semantic similarity: 0.123, Keyword matches: 2"
        );
        assert!((scored.score - (0.6 * 0.12345 + 0.8)).abs() < 1e-6);
    }

    #[test]
    fn test_keyword_counts_once_per_keyword() {
        let d = dish("Calming Tea", "a calming herbal tea", &["calming"]);
        assert_eq!(keyword_score(&d, &keywords(&["calming", "tea", "beef"])), 2);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let d = dish("Magnesium Rich Bowl", "Spinach", &[]);
        assert_eq!(keyword_score(&d, &keywords(&["magnesium rich", "SPINACH"])), 2);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let dishes: Vec<Dish> = (0..7).map(|i| dish(&format!("D{}", i), "", &[])).collect();
        let scored = dishes.iter().map(|d| ScoredDish::new(d, 0.5, 0)).collect();

        let top = select_top(scored, TOP_N);
        let names: Vec<_> = top.iter().map(|s| s.dish.name.as_str()).collect();
        assert_eq!(names, vec!["D0", "D1", "D2", "D3", "D4"]);
    }

    #[test]
    fn test_nan_scores_sort_last() {
        let dishes: Vec<Dish> = (0..4).map(|i| dish(&format!("D{}", i), "", &[])).collect();
        let scored = vec![
            ScoredDish::new(&dishes[0], f32::NAN, 0),
            ScoredDish::new(&dishes[1], 0.2, 0),
            ScoredDish::new(&dishes[2], 0.9, 0),
            ScoredDish::new(&dishes[3], 0.2, 0),
        ];

        let top = select_top(scored, TOP_N);
        let names: Vec<_> = top.iter().map(|s| s.dish.name.as_str()).collect();
        assert_eq!(names, vec!["D2", "D1", "D3", "D0"]);
    }

    #[tokio::test]
    async fn test_rank_favors_calming_dishes_for_jumpy_query() {
        let catalog = Catalog::new(vec![
            ("steak".to_string(), dish("Steak", "grilled beef", &["hearty"])),
            (
                "chamomile".to_string(),
                dish("Chamomile Rice", "soothing bowl", &["calming foods", "magnesium rich"]),
            ),
            ("fries".to_string(), dish("Fries", "crispy potatoes", &["salty"])),
        ]);

        let engine = engine(catalog, Arc::new(ConstantEmbedder));
        let ranking = engine
            .rank("I feel jumpy and restless")
            .await
            .unwrap();

        assert_eq!(ranking.context.emotions, vec![EmotionCategory::Physical]);
        assert!(ranking.keywords.contains("calming foods"));
        assert_eq!(ranking.results[0].dish.name, "Chamomile Rice");
        assert_eq!(ranking.results[0].keyword_matches, 2);
        assert_eq!(ranking.results.len(), 3);
    }

    #[tokio::test]
    async fn test_plain_query_scores_from_similarity_and_direct_tokens() {
        let catalog = Catalog::new(vec![
            ("a".to_string(), dish("Rice", "steamed", &[])),
            ("b".to_string(), dish("Noodles", "boiled", &[])),
        ]);

        let engine = engine(catalog, Arc::new(HashingEmbedder::default()));
        let ranking = engine
            .rank("plain food")
            .await
            .unwrap();

        assert!(ranking.context.emotions.is_empty());
        for result in &ranking.results {
            assert_eq!(result.keyword_matches, 0);
            assert!((result.score - 0.6 * result.similarity).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_empty_catalog_ranks_nothing() {
        let engine = engine(Catalog::default(), Arc::new(ConstantEmbedder));
        let ranking = engine
            .rank("anything")
            .await
            .unwrap();
        assert!(ranking.results.is_empty());
    }

    proptest! {
        #[test]
        fn prop_top_is_bounded_and_sorted(
            entries in prop::collection::vec((-1.0f32..=1.0, 0usize..10), 0..30)
        ) {
            let dishes: Vec<Dish> = (0..entries.len()).map(|i| dish(&i.to_string(), "", &[])).collect();
            let scored = dishes
                .iter()
                .zip(&entries)
                .map(|(d, (sim, kw))| ScoredDish::new(d, *sim, *kw))
                .collect();

            let top = select_top(scored, TOP_N);
            prop_assert!(top.len() <= TOP_N);
            prop_assert_eq!(top.len(), entries.len().min(TOP_N));
            for pair in top.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }

        #[test]
        fn prop_combined_score_is_monotonic(
            sim in -1.0f32..=1.0,
            delta in 0.0f32..=1.0,
            kw in 0usize..50,
        ) {
            prop_assert!(combined_score(sim + delta, kw) >= combined_score(sim, kw));
            prop_assert!(combined_score(sim, kw + 1) >= combined_score(sim, kw));
        }

        #[test]
        fn prop_keyword_score_bounded_by_set_size(
            words in prop::collection::vec("[a-z]{1,6}", 0..12),
            description in "[a-z ]{0,40}",
        ) {
            let d = dish("name", &description, &[]);
            let set: KeywordSet = words.into_iter().collect();
            prop_assert!(keyword_score(&d, &set) <= set.len());
        }
    }
}
