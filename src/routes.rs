use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::error::ApiError;
use crate::handlers::{health_check, prewarm_endpoint, search_config, smart_search_config};

/// Configure all routes for the API
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(prewarm_endpoint)
        .configure(search_config)
        .configure(smart_search_config);
}

/// JSON extractor settings shared by the search endpoints: unreadable bodies
/// become a 400 with an `error` field instead of actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidInput(err.to_string()).into()
}
