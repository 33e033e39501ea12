use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Result;

use ot_service::config::StoreBackend;
use ot_service::database::{
    init_database,
    repositories::{InMemoryOvertimeStore, OvertimeStore, PgOvertimeRepository},
};
use ot_service::middleware::{RequestIdMiddleware, RequestInfoMiddleware};
use ot_service::{AppState, Config, routes};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("Starting overtime service...");

    let config = Config::from_env()?;
    log::info!(
        "Configuration loaded (environment: {}, store: {:?})",
        config.environment,
        config.store_backend
    );

    let store: Arc<dyn OvertimeStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = init_database(&config.database_url).await?;
            log::info!("Database initialized");
            Arc::new(PgOvertimeRepository::new(pool))
        }
        StoreBackend::Memory => {
            if config.is_production() {
                log::warn!("In-memory store selected in production; records will not persist");
            }
            Arc::new(InMemoryOvertimeStore::new())
        }
    };

    let app_state = AppState::new(store);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        let state = app_state.clone();
        App::new()
            .app_data(config_data.clone())
            .configure(|cfg| state.configure(cfg))
            .wrap(RequestInfoMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(
                Cors::default()
                    .allowed_origin(&config.client_base_url)
                    .allowed_methods(vec!["GET", "POST", "PATCH", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
