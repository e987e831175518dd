pub mod emotion_analyzer;
pub mod explanation;
pub mod fallback;
pub mod keyword_generator;
pub mod lexicon;
pub mod ranking;
pub mod recommendation;
pub mod semantic_scorer;

// Re-export public types
pub use emotion_analyzer::{EmotionAnalyzer, EmotionalContext};
pub use keyword_generator::KeywordSet;
pub use lexicon::{EmotionCategory, Mood};
pub use ranking::{Ranking, RankingEngine, ScoredDish};
pub use recommendation::{RecommendationService, SearchOutcome};
pub use semantic_scorer::SemanticScorer;
