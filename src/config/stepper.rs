//! Stepper configuration from TOML.

use serde::Deserialize;

use super::units::{Microseconds, StepsPerSecSquared, Ticks};

/// Timer frequency of the classic 16 MHz AVR step timer.
pub const DEFAULT_TICKS_PER_SECOND: u32 = 16_000_000;

/// Configuration of one stepper channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepperConfig {
    /// Frequency of the step timer.
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,

    /// Acceleration in steps/s². A move needs one.
    #[serde(default, rename = "acceleration_steps_per_sec2")]
    pub acceleration: Option<StepsPerSecSquared>,

    /// Speed limit as the minimum time between steps. A move needs one.
    #[serde(default, rename = "min_step_interval_us")]
    pub min_step_interval: Option<Microseconds>,

    /// Minimum duration of one queued command. Defaults to 2 ms.
    #[serde(default)]
    pub min_command_ticks: Option<Ticks>,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,
}

fn default_ticks_per_second() -> u32 {
    DEFAULT_TICKS_PER_SECOND
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            acceleration: None,
            min_step_interval: None,
            min_command_ticks: None,
            invert_direction: false,
        }
    }
}

impl StepperConfig {
    /// Minimum command duration in ticks.
    pub fn min_command_ticks(&self) -> Ticks {
        self.min_command_ticks
            .unwrap_or(Ticks(self.ticks_per_second / 500))
    }

    /// Speed limit in ticks, if configured.
    pub fn min_step_ticks(&self) -> Option<Ticks> {
        self.min_step_interval
            .map(|us| us.to_ticks(self.ticks_per_second))
    }
}
