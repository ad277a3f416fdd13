//! Tests for configuration validation

use tickloop::config::{LoopConfig, DEFAULT_DURATION_MS, MAX_DURATION_MS};

#[test]
fn test_loop_config_validation() {
    let valid = LoopConfig {
        duration_ms: 250,
        name: Some("ingest".to_string()),
    };
    assert!(valid.validate().is_ok());
}

#[test]
fn test_loop_config_zero_duration_is_valid() {
    let unpaced = LoopConfig::default().unpaced();
    assert_eq!(unpaced.duration_ms, 0);
    assert!(unpaced.validate().is_ok());
}

#[test]
fn test_loop_config_invalid_duration() {
    let invalid = LoopConfig::default().with_duration_ms(MAX_DURATION_MS + 1);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_loop_config_blank_name() {
    let invalid = LoopConfig::default().with_name("   ");
    assert!(invalid.validate().is_err());
}

#[test]
fn test_loop_config_from_json() {
    let json = r#"{
        "duration_ms": 40,
        "name": "poller"
    }"#;

    let config = LoopConfig::from_json_str(json).unwrap();
    assert_eq!(config.duration_ms, 40);
    assert_eq!(config.name.as_deref(), Some("poller"));
}

#[test]
fn test_loop_config_from_json_defaults() {
    let config = LoopConfig::from_json_str("{}").unwrap();
    assert_eq!(config.duration_ms, DEFAULT_DURATION_MS);
    assert!(config.name.is_none());
}

#[test]
fn test_loop_config_from_json_invalid() {
    assert!(LoopConfig::from_json_str(r#"{"duration_ms": -1}"#).is_err());
    assert!(LoopConfig::from_json_str("not json").is_err());
}

#[test]
fn test_loop_config_round_trips_through_json() {
    let config = LoopConfig::default().with_duration_ms(7).with_name("rt");
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(LoopConfig::from_json_str(&json).unwrap(), config);
}
