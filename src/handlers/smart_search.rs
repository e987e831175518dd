use crate::{
    error::ApiError,
    models::{SearchRequest, SmartSearchItem, SmartSearchResponse},
    services::{explanation, RecommendationService},
};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use log::info;

pub fn smart_search_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/smart-search").route(web::post().to(smart_search)));
}

/// Ranked search with the emotional analysis, an explanation and per-dish
/// reasoning. There is no fallback; pipeline failures surface as 500.
pub async fn smart_search(
    request: Json<SearchRequest>,
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let query = request.query().ok_or(ApiError::MissingQuery)?;
    info!("Smart search request: '{}'", query);

    let ranking = recommendation_service.smart_search(query).await?;
    let explanation = explanation::explain(query, &ranking.context);
    let result: Vec<SmartSearchItem<'_>> =
        ranking.results.into_iter().map(SmartSearchItem::from).collect();

    Ok(HttpResponse::Ok().json(SmartSearchResponse {
        query,
        emotional_analysis: ranking.context,
        explanation,
        total_found: result.len(),
        result,
    }))
}
