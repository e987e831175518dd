pub mod health;
pub mod prewarm;
pub mod search;
pub mod smart_search;

pub use health::health_check;
pub use prewarm::prewarm as prewarm_endpoint;
pub use search::search_config;
pub use smart_search::smart_search_config;
