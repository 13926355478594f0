//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{StepperConfig, SystemConfig};

/// Slowest step timer accepted: 1 tick per microsecond.
pub const MIN_TICKS_PER_SECOND: u32 = 1_000_000;

/// Validate a system configuration.
///
/// Checks every stepper:
/// - Timer frequency is at least [`MIN_TICKS_PER_SECOND`]
/// - Acceleration, if given, is positive
/// - Speed limit and command duration, if given, fit a queue entry
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (_name, stepper) in config.steppers.iter() {
        validate_stepper(stepper)?;
    }
    Ok(())
}

/// Validate one stepper configuration.
pub fn validate_stepper(config: &StepperConfig) -> Result<()> {
    if config.ticks_per_second < MIN_TICKS_PER_SECOND {
        return Err(Error::Config(ConfigError::InvalidTicksPerSecond(
            config.ticks_per_second,
        )));
    }

    if let Some(accel) = config.acceleration {
        accel.check_positive()?;
    }

    if let Some(ticks) = config.min_step_ticks() {
        ticks.check_range()?;
    }

    config.min_command_ticks().check_range()?;

    Ok(())
}
