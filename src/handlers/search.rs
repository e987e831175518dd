use crate::{
    error::ApiError,
    models::{SearchRequest, SearchResponse},
    services::{RecommendationService, SearchOutcome},
};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use log::{info, warn};

pub fn search_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/search").route(web::post().to(search)));
}

/// Emotion-aware dish search.
///
/// Responds 200 with the ranked top dishes. If the ranking pipeline fails the
/// response is still a `{query, result}` body built by keyword fallback, but
/// with status 500 so clients can tell the results are degraded.
pub async fn search(
    request: Json<SearchRequest>,
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let query = request.query().ok_or(ApiError::MissingQuery)?;
    info!("Search request: '{}'", query);

    let outcome = recommendation_service.search(query).await;
    let body = SearchResponse {
        query,
        result: outcome.dishes(),
    };

    match outcome {
        SearchOutcome::Ranked(_) => Ok(HttpResponse::Ok().json(body)),
        SearchOutcome::Degraded { cause, .. } => {
            warn!(
                "Serving {} fallback results for '{}' after: {}",
                body.result.len(),
                query,
                cause
            );
            Ok(HttpResponse::InternalServerError().json(body))
        }
    }
}
