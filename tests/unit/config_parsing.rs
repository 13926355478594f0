//! Unit tests for TOML configuration parsing.

use stepper_ramp::config::{load_config, parse_config, SystemConfig};
use stepper_ramp::error::{ConfigError, Error};

/// Test parsing a fully specified stepper configuration from TOML.
#[test]
fn test_parse_stepper_config() {
    let toml_str = r#"
[steppers.stepper1]
ticks_per_second = 16000000
acceleration_steps_per_sec2 = 8000
min_step_interval_us = 125
min_command_ticks = 48000
invert_direction = false
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let stepper = config.stepper("stepper1").expect("Stepper not found");

    assert_eq!(stepper.ticks_per_second, 16_000_000);
    assert_eq!(stepper.acceleration.unwrap().value(), 8_000);
    assert_eq!(stepper.min_step_interval.unwrap().value(), 125);
    assert_eq!(stepper.min_step_ticks().unwrap().value(), 2_000);
    assert_eq!(stepper.min_command_ticks().value(), 48_000);
    assert!(!stepper.invert_direction);
}

/// Test that omitted fields fall back to their defaults.
#[test]
fn test_parse_defaults() {
    let toml_str = r#"
[steppers.bare]
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let stepper = config.stepper("bare").expect("Stepper not found");

    assert_eq!(stepper.ticks_per_second, 16_000_000);
    assert!(stepper.acceleration.is_none());
    assert!(stepper.min_step_interval.is_none());
    assert_eq!(stepper.min_command_ticks().value(), 32_000);
    assert!(!stepper.invert_direction);
}

/// Test multiple named steppers and name listing.
#[test]
fn test_parse_multiple_steppers() {
    let toml_str = r#"
[steppers.x]
acceleration_steps_per_sec2 = 1000

[steppers.y]
acceleration_steps_per_sec2 = 2000
invert_direction = true
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let mut names: Vec<&str> = config.stepper_names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["x", "y"]);
    assert!(config.stepper("y").unwrap().invert_direction);
    assert!(config.stepper("z").is_none());
}

/// Test that a negative acceleration parses but fails validation.
#[test]
fn test_parse_config_validates() {
    let toml_str = r#"
[steppers.x]
acceleration_steps_per_sec2 = -100
"#;

    let parsed: Result<SystemConfig, _> = toml::from_str(toml_str);
    assert!(parsed.is_ok());

    assert_eq!(
        parse_config(toml_str).unwrap_err(),
        Error::Config(ConfigError::InvalidAcceleration(-100))
    );
}

/// Test that malformed TOML is reported as a parse error.
#[test]
fn test_malformed_toml_rejected() {
    let toml_str = r#"
[steppers.x]
acceleration_steps_per_sec2 = "fast"
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}

/// Test loading a configuration file from disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join("stepper_ramp_load_config_test.toml");
    std::fs::write(
        &path,
        "[steppers.z]\nacceleration_steps_per_sec2 = 500\nmin_step_interval_us = 1000\n",
    )
    .expect("Failed to write config file");

    let config = load_config(&path).expect("Failed to load config");
    let _ = std::fs::remove_file(&path);

    let stepper = config.stepper("z").expect("Stepper not found");
    assert_eq!(stepper.min_step_ticks().unwrap().value(), 16_000);
}
