//! Unit tests for configuration validation.

use stepper_ramp::config::{validate_config, SystemConfig};
use stepper_ramp::error::{ConfigError, Error};

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = r#"
[steppers.stepper1]
acceleration_steps_per_sec2 = 10000
min_step_interval_us = 100
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a zero acceleration.
#[test]
fn test_zero_acceleration_rejected() {
    let toml_str = r#"
[steppers.stepper1]
acceleration_steps_per_sec2 = 0
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidAcceleration(0)))
    );
}

/// Test validation fails for a speed limit beyond the timer range.
#[test]
fn test_speed_limit_out_of_range() {
    // 2 s between steps is more than 255 * 65535 ticks at 16 MHz.
    let toml_str = r#"
[steppers.stepper1]
min_step_interval_us = 2000000
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidSpeed(32_000_000)))
    );
}

/// Test validation fails for a timer too slow for microsecond timing.
#[test]
fn test_slow_timer_rejected() {
    let toml_str = r#"
[steppers.stepper1]
ticks_per_second = 1000
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidTicksPerSecond(1000)))
    ));
}

/// Test that an empty configuration is valid.
#[test]
fn test_empty_config_is_valid() {
    let config = SystemConfig::default();
    assert!(validate_config(&config).is_ok());
}
