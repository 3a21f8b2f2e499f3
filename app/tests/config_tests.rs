//! Tests for config.rs
//!
//! Environment-driven, so every test runs serially with its variables scoped
//! by temp-env.

#![cfg(feature = "ssr")]
#![allow(clippy::unwrap_used, clippy::float_cmp)]

use app::api_impl::booking_config_dto;
use app::config::AppConfig;
use app::error::BookingError;
use serial_test::serial;
use temp_env::with_vars;

const VARS: [&str; 7] = [
    "DISTANCE_API_URL",
    "PLACES_API_KEY",
    "SERVICE_COUNTRY",
    "DEFAULT_DISTANCE_KM",
    "DISTANCE_TIMEOUT_SECS",
    "DETAILED_SUBMIT",
    "BIND_ADDR",
];

/// Every known variable unset, then `overrides` applied.
fn env(overrides: &[(&'static str, &'static str)]) -> Vec<(&'static str, Option<&'static str>)> {
    VARS.iter()
        .map(|name| {
            let value = overrides
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| *v);
            (*name, value)
        })
        .collect()
}

fn config_error(result: Result<AppConfig, BookingError>) -> String {
    match result {
        Err(BookingError::Config(msg)) => msg,
        Err(other) => format!("unexpected error: {other}"),
        Ok(_) => "unexpected success".to_string(),
    }
}

#[test]
#[serial]
fn test_defaults() {
    with_vars(
        env(&[("DISTANCE_API_URL", "https://backend.example/distance")]),
        || {
            let config = AppConfig::from_env().unwrap();
            assert_eq!(config.distance_api_url, "https://backend.example/distance");
            assert_eq!(config.places_api_key, None);
            assert_eq!(config.service_country, "in");
            assert_eq!(config.default_distance_km, 100.0);
            assert_eq!(config.distance_timeout_secs, 10);
            assert!(!config.detailed_submit);
            assert_eq!(config.bind_addr, "127.0.0.1:3000");
        },
    );
}

#[test]
#[serial]
fn test_all_values_overridden() {
    with_vars(
        env(&[
            ("DISTANCE_API_URL", "http://localhost:8080/distance"),
            ("PLACES_API_KEY", "abc123"),
            ("SERVICE_COUNTRY", "IN"),
            ("DEFAULT_DISTANCE_KM", "75.5"),
            ("DISTANCE_TIMEOUT_SECS", "3"),
            ("DETAILED_SUBMIT", "true"),
            ("BIND_ADDR", "0.0.0.0:8000"),
        ]),
        || {
            let config = AppConfig::from_env().unwrap();
            assert_eq!(config.places_api_key.as_deref(), Some("abc123"));
            assert_eq!(config.service_country, "in");
            assert_eq!(config.default_distance_km, 75.5);
            assert_eq!(config.distance_timeout_secs, 3);
            assert!(config.detailed_submit);
            assert_eq!(config.bind_addr, "0.0.0.0:8000");
        },
    );
}

#[test]
#[serial]
fn test_missing_distance_url_is_error() {
    with_vars(env(&[]), || {
        assert!(config_error(AppConfig::from_env()).contains("DISTANCE_API_URL"));
    });
}

#[test]
#[serial]
fn test_blank_places_key_means_no_key() {
    with_vars(
        env(&[
            ("DISTANCE_API_URL", "http://localhost/distance"),
            ("PLACES_API_KEY", "   "),
        ]),
        || {
            assert_eq!(AppConfig::from_env().unwrap().places_api_key, None);
        },
    );
}

#[test]
#[serial]
fn test_invalid_country_is_error() {
    with_vars(
        env(&[
            ("DISTANCE_API_URL", "http://localhost/distance"),
            ("SERVICE_COUNTRY", "IND"),
        ]),
        || {
            assert!(config_error(AppConfig::from_env()).contains("SERVICE_COUNTRY"));
        },
    );
}

#[test]
#[serial]
fn test_non_positive_default_distance_is_error() {
    for bad in ["0", "-5", "abc", "NaN"] {
        let vars = vec![
            ("DISTANCE_API_URL", Some("http://localhost/distance")),
            ("DEFAULT_DISTANCE_KM", Some(bad)),
        ];
        with_vars(vars, || {
            assert!(
                config_error(AppConfig::from_env()).contains("DEFAULT_DISTANCE_KM"),
                "{bad} should be rejected"
            );
        });
    }
}

#[test]
#[serial]
fn test_unparsable_detailed_submit_is_error() {
    with_vars(
        env(&[
            ("DISTANCE_API_URL", "http://localhost/distance"),
            ("DETAILED_SUBMIT", "yes please"),
        ]),
        || {
            assert!(config_error(AppConfig::from_env()).contains("DETAILED_SUBMIT"));
        },
    );
}

#[test]
#[serial]
fn test_public_dto_omits_backend_url() {
    with_vars(
        env(&[
            ("DISTANCE_API_URL", "http://internal:9000/distance"),
            ("PLACES_API_KEY", "browser-key"),
        ]),
        || {
            let dto = booking_config_dto(&AppConfig::from_env().unwrap());
            assert_eq!(dto.places_api_key.as_deref(), Some("browser-key"));
            assert_eq!(dto.default_distance_km, 100.0);
            let json = serde_json::to_string(&dto).unwrap();
            assert!(!json.contains("internal:9000"));
        },
    );
}
