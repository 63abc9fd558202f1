//! Tests for configuration loading, validation and clamping.

use scope_common::config::{ScopeConfig, MIN_DURATION_SECS, MIN_RESOLUTION};
use std::io::Write;

#[test]
fn test_from_json_partial_uses_defaults() {
    let config = ScopeConfig::from_json(r#"{"display_resolution": 256, "ring_count": 5}"#).unwrap();
    assert_eq!(config.display_resolution, 256);
    assert_eq!(config.ring_count, 5);
    assert_eq!(config.trail_steps, ScopeConfig::default().trail_steps);
}

#[test]
fn test_from_json_invalid_is_error() {
    assert!(ScopeConfig::from_json("{not json").is_err());
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"sweep_cycle_duration_secs": 2.0, "ring_color": [1, 2, 3, 4]}}"#).unwrap();

    let config = ScopeConfig::from_file(file.path()).unwrap();
    assert_eq!(config.sweep_cycle_duration_secs, 2.0);
    assert_eq!(config.ring_color.to_bytes(), [1, 2, 3, 4]);
}

#[test]
fn test_from_file_missing() {
    assert!(ScopeConfig::from_file("/definitely/not/here.json").is_err());
}

#[test]
fn test_validate_reports_bad_values() {
    let config = ScopeConfig {
        display_resolution: 0,
        persistence_duration_secs: -1.0,
        decay_tick_interval_secs: 0.0,
        range_nm: 0.0,
        ..Default::default()
    };
    let problems = config.validate();
    assert_eq!(problems.len(), 4, "{:?}", problems);
}

#[test]
fn test_sanitized_clamps_to_safe_minimums() {
    let config = ScopeConfig {
        display_resolution: 2,
        sweep_cycle_duration_secs: 0.0,
        persistence_duration_secs: -5.0,
        decay_tick_interval_secs: f32::NAN,
        trail_steps: 0,
        range_nm: -3.0,
        ..Default::default()
    }
    .sanitized();

    assert_eq!(config.display_resolution, MIN_RESOLUTION);
    assert_eq!(config.sweep_cycle_duration_secs, MIN_DURATION_SECS);
    assert_eq!(config.persistence_duration_secs, MIN_DURATION_SECS);
    assert!(config.decay_tick_interval_secs > 0.0);
    assert_eq!(config.trail_steps, 1);
    assert_eq!(config.range_nm, ScopeConfig::default().range_nm);
    assert!(config.validate().is_empty());
}

#[test]
fn test_sanitized_leaves_valid_config_untouched() {
    let config = ScopeConfig::default();
    assert_eq!(config.sanitized(), config);
}

#[test]
fn test_scenario_sweep_velocity() {
    let config = ScopeConfig {
        display_resolution: 512,
        sweep_cycle_duration_secs: 4.0,
        ..Default::default()
    };
    assert!((config.angular_velocity() - 90.0).abs() < 1e-6);
}

#[test]
fn test_from_env_overrides_defaults() {
    std::env::set_var("SCOPE_RING_COUNT", "7");
    std::env::set_var("SCOPE_GLOW", "false");
    std::env::set_var("SCOPE_RANGE_NM", "not-a-number");

    let config = ScopeConfig::from_env();

    std::env::remove_var("SCOPE_RING_COUNT");
    std::env::remove_var("SCOPE_GLOW");
    std::env::remove_var("SCOPE_RANGE_NM");

    assert_eq!(config.ring_count, 7);
    assert!(!config.glow_enabled);
    // Unparsable values keep the default
    assert_eq!(config.range_nm, ScopeConfig::default().range_nm);
}
