use actix_web::{HttpResponse, web};

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

pub mod overtime;

/// Extractor failures answer with the same envelope as every other error.
pub fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    );
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::body(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(extractor_configs)
        .route("/health", web::get().to(health))
        .service(web::scope("/api/v1").configure(overtime::configure));
}
