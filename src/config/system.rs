//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use crate::error::{ConfigError, Error, Result};

use super::stepper::StepperConfig;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemConfig {
    /// Named stepper configurations.
    pub steppers: FnvIndexMap<String<32>, StepperConfig, 8>,
}

impl SystemConfig {
    /// Get a stepper configuration by name.
    pub fn stepper(&self, name: &str) -> Option<&StepperConfig> {
        self.steppers
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Get a stepper configuration by name, failing with `StepperNotFound`.
    pub fn require_stepper(&self, name: &str) -> Result<&StepperConfig> {
        self.stepper(name).ok_or_else(|| {
            Error::Config(ConfigError::StepperNotFound(
                String::try_from(name).unwrap_or_default(),
            ))
        })
    }

    /// List all stepper names.
    pub fn stepper_names(&self) -> impl Iterator<Item = &str> {
        self.steppers.keys().map(|s| s.as_str())
    }
}
