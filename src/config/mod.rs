//! Configuration module for stepper-ramp.
//!
//! Provides types for loading and validating stepper configurations from TOML
//! files (with `std` feature) or pre-parsed data.

mod stepper;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use stepper::{StepperConfig, DEFAULT_TICKS_PER_SECOND};
pub use system::SystemConfig;
pub use validation::{validate_config, validate_stepper, MIN_TICKS_PER_SECOND};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

pub use units::{Microseconds, StepsPerSecSquared, Ticks};
