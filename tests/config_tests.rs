use std::env;

use ot_service::config::{Config, StoreBackend};
use pretty_assertions::assert_eq;
use serial_test::serial;

mod common;

const KEYS: [&str; 7] = [
    "DATABASE_URL",
    "JWT_SECRET",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "CLIENT_BASE_URL",
    "STORE_BACKEND",
];

fn snapshot() -> Vec<(&'static str, Option<String>)> {
    KEYS.iter().map(|k| (*k, env::var(k).ok())).collect()
}

fn restore(original: Vec<(&'static str, Option<String>)>) {
    unsafe {
        for (key, value) in original {
            match value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn test_config_from_env_with_defaults() {
    common::setup_test_env();
    let original = snapshot();

    unsafe {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://@localhost:5432/overtime");
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.environment, "development");
    assert_eq!(config.client_base_url, "http://localhost:3000");
    assert_eq!(config.store_backend, StoreBackend::Postgres);

    restore(original);
}

#[test]
#[serial]
fn test_config_from_env_with_custom_values() {
    common::setup_test_env();
    let original = snapshot();

    unsafe {
        env::set_var("DATABASE_URL", "postgres://ot:ot@db:5432/ot");
        env::set_var("JWT_SECRET", "test-secret");
        env::set_var("HOST", "0.0.0.0");
        env::set_var("PORT", "3000");
        env::set_var("ENVIRONMENT", "production");
        env::set_var("CLIENT_BASE_URL", "https://ot.example.com");
        env::set_var("STORE_BACKEND", "Memory");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://ot:ot@db:5432/ot");
    assert_eq!(config.jwt_secret, "test-secret");
    assert_eq!(config.server_address(), "0.0.0.0:3000");
    assert!(config.is_production());
    assert_eq!(config.client_base_url, "https://ot.example.com");
    assert_eq!(config.store_backend, StoreBackend::Memory);

    restore(original);
}

#[test]
#[serial]
fn test_config_invalid_port_falls_back() {
    let original = snapshot();

    unsafe {
        env::set_var("PORT", "invalid_port");
        env::remove_var("STORE_BACKEND");
    }

    let config = Config::from_env_only().unwrap();
    assert_eq!(config.port, 8080);

    restore(original);
}

#[test]
#[serial]
fn test_config_unknown_store_backend_is_an_error() {
    let original = snapshot();

    unsafe {
        env::set_var("STORE_BACKEND", "redis");
    }

    assert!(Config::from_env_only().is_err());

    restore(original);
}

#[test]
fn test_config_environment_detection() {
    let mut config = Config::test_config();
    assert!(!config.is_production());
    assert!(!config.is_development());

    config.environment = "development".to_string();
    assert!(config.is_development());
}
