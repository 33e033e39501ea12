#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::name::en::Name;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};

use ot_service::config::Config;
use ot_service::database::repositories::InMemoryOvertimeStore;
use ot_service::handlers::shared::ApiResponse;
use ot_service::services::auth::Claims;
use ot_service::AppState;

/// Builds an initialised test service around an in-memory store.
///
/// Expands to `(app, config)`.
macro_rules! test_app {
    () => {{
        let (state, config) = common::test_state();
        let config_data = actix_web::web::Data::new(config.clone());
        let app = actix_web::test::init_service(
            actix_web::App::new()
                .app_data(config_data)
                .configure(|cfg| state.configure(cfg))
                .configure(ot_service::routes::configure),
        )
        .await;
        (app, config)
    }};
}

pub fn setup_test_env() {
    unsafe {
        env::set_var("RUST_LOG", "debug");
    }
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_state() -> (AppState, Config) {
    setup_test_env();
    let state = AppState::new(Arc::new(InMemoryOvertimeStore::new()));
    (state, Config::test_config())
}

// Mock data generators
pub struct MockData;

impl MockData {
    pub fn employee_id() -> String {
        format!("EMP-{}", (1000..9999).fake::<u32>())
    }

    pub fn lead_name() -> String {
        Name().fake()
    }

    pub fn row(shift: &str, in_time: &str, out_time: &str) -> Value {
        json!({
            "employeeId": Self::employee_id(),
            "shift": shift,
            "inTime": in_time,
            "outTime": out_time,
        })
    }

    pub fn bulk(work_date: &str, rows: Vec<Value>) -> Value {
        json!({ "workDate": work_date, "rows": rows })
    }
}

// Authentication helpers
pub struct AuthHelper;

impl AuthHelper {
    pub fn create_test_token(actor_id: &str, config: &Config) -> String {
        let claims = Claims {
            sub: actor_id.to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .expect("Failed to sign test token")
    }

    pub fn create_expired_token(actor_id: &str, config: &Config) -> String {
        let claims = Claims {
            sub: actor_id.to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .expect("Failed to sign test token")
    }

    pub fn auth_header(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", token))
    }
}

// Test assertion helpers
pub struct TestAssertions;

impl TestAssertions {
    pub fn assert_success_response<T>(body: &[u8]) -> T
    where
        T: serde::de::DeserializeOwned,
    {
        let response: ApiResponse<T> =
            serde_json::from_slice(body).expect("Failed to parse JSON response");

        assert!(
            response.success,
            "Expected successful response but got error: {:?}",
            response.message
        );
        response.data.expect("Expected data in successful response")
    }

    pub fn assert_error_response(body: &[u8]) -> String {
        let response: ApiResponse<Value> =
            serde_json::from_slice(body).expect("Failed to parse JSON response");

        assert!(!response.success, "Expected error response");
        response.message.expect("Expected message in error response")
    }
}
