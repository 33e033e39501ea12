use actix_web::web;

use crate::handlers::{overtime, stats};

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Fixed paths first so they are not captured by "/{id}"
    cfg.service(
        web::scope("/ot")
            .route("", web::get().to(overtime::list_overtime))
            .route("", web::post().to(overtime::bulk_create))
            .route("/pending-count", web::get().to(overtime::pending_count))
            .route(
                "/notifications",
                web::get().to(overtime::pending_notifications),
            )
            .route("/stats/day", web::get().to(stats::get_day_stats))
            .route("/stats/week", web::get().to(stats::get_week_stats))
            .route("/{id}", web::get().to(overtime::get_overtime))
            .route("/{id}", web::patch().to(overtime::update_overtime))
            .route("/{id}/audit", web::get().to(overtime::get_audit_trail))
            .route("/{id}/approve", web::post().to(overtime::approve_overtime))
            .route("/{id}/reject", web::post().to(overtime::reject_overtime)),
    );
}
