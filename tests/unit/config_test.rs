//! Tests for configuration validation and loading

use std::collections::HashMap;
use std::time::Duration;

use station_queue::config::station::{ENV_CARS, ENV_PUMPS, ENV_RUN_SECS, ENV_SERVICE_MS};
use station_queue::config::StationConfig;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_default_config_is_valid() {
    let config = StationConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.pumps, 2);
    assert_eq!(config.cars, 10);
    assert_eq!(config.run_duration(), Duration::from_secs(30));
}

#[test]
fn test_zero_pumps_rejected() {
    let err = StationConfig::default().with_pumps(0).validate().unwrap_err();
    assert!(err.contains("pumps"));
}

#[test]
fn test_zero_cars_rejected() {
    assert!(StationConfig::default().with_cars(0).validate().is_err());
}

#[test]
fn test_zero_run_rejected() {
    let config = StationConfig::default().with_run_duration(Duration::from_millis(500));
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_service_time_allowed() {
    let config = StationConfig::default().with_service_time(Duration::ZERO);
    assert!(config.validate().is_ok());
    assert_eq!(config.service_time(), Duration::ZERO);
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "pumps": 3,
        "cars": 12,
        "service_time_ms": 25,
        "run_secs": 5
    }"#;

    let config = StationConfig::from_json_str(json).unwrap();
    assert_eq!(config.pumps, 3);
    assert_eq!(config.cars, 12);
    assert_eq!(config.service_time(), Duration::from_millis(25));
    assert_eq!(config.run_secs, 5);
}

#[test]
fn test_config_from_partial_json_uses_defaults() {
    let config = StationConfig::from_json_str(r#"{ "pumps": 4 }"#).unwrap();
    assert_eq!(config.pumps, 4);
    assert_eq!(config.cars, StationConfig::default().cars);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(StationConfig::from_json_str(r#"{ "pumps": 0 }"#).is_err());
    assert!(StationConfig::from_json_str("not json").unwrap_err().starts_with("parse error"));
}

#[test]
fn test_config_from_lookup() {
    let config = StationConfig::from_lookup(lookup(&[
        (ENV_PUMPS, "1"),
        (ENV_CARS, " 3 "),
        (ENV_SERVICE_MS, "5"),
        (ENV_RUN_SECS, "2"),
    ]))
    .unwrap();
    assert_eq!(
        config,
        StationConfig {
            pumps: 1,
            cars: 3,
            service_time_ms: 5,
            run_secs: 2,
        }
    );
}

#[test]
fn test_config_from_lookup_rejects_garbage() {
    let err = StationConfig::from_lookup(lookup(&[(ENV_CARS, "many")])).unwrap_err();
    assert!(err.contains(ENV_CARS));
}

#[test]
fn test_config_from_empty_lookup_is_default() {
    assert_eq!(
        StationConfig::from_lookup(|_| None).unwrap(),
        StationConfig::default()
    );
}
