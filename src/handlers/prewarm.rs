//! Prewarm endpoint to avoid paying for catalog embedding on the first search

use crate::services::RecommendationService;
use actix_web::{get, web, HttpResponse};
use log::{info, warn};
use serde_json::json;

/// Fill the dish-embedding cache ahead of real traffic.
///
/// Always answers 200: a model failure here only means the first search will
/// try again, so it is reported as `partial` rather than as an error.
#[get("/prewarm")]
pub async fn prewarm(recommendation_service: web::Data<RecommendationService>) -> HttpResponse {
    info!("Prewarming dish embeddings...");

    match recommendation_service.prewarm().await {
        Ok(was_first) => {
            let message = if was_first {
                "Dish embeddings computed"
            } else {
                "Dish embeddings already cached"
            };

            HttpResponse::Ok().json(json!({
                "status": "ok",
                "message": message,
                "first_prewarm": was_first,
                "dishes": recommendation_service.catalog().len(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
        }
        Err(e) => {
            warn!("Prewarm partially completed with warning: {}", e);

            HttpResponse::Ok().json(json!({
                "status": "partial",
                "message": "Dish embeddings not available yet",
                "warning": e.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
        }
    }
}
