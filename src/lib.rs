use std::sync::Arc;

use actix_web::web;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;
pub use database::repositories::OvertimeStore;
pub use services::{OvertimeService, OvertimeStatsService};

#[derive(Clone)]
pub struct AppState {
    pub overtime_service: OvertimeService,
    pub stats_service: OvertimeStatsService,
}

impl AppState {
    pub fn new(store: Arc<dyn OvertimeStore>) -> Self {
        Self {
            overtime_service: OvertimeService::new(store.clone()),
            stats_service: OvertimeStatsService::new(store),
        }
    }

    /// Registers the services as app data for handlers to extract.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.overtime_service.clone()))
            .app_data(web::Data::new(self.stats_service.clone()));
    }
}
