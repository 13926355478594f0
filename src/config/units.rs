//! Unit types for timing quantities.
//!
//! Keeps timer ticks, microseconds and accelerations apart in configuration
//! and at API boundaries.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::queue::ABSOLUTE_MAX_TICKS;

/// Duration in timer ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct Ticks(pub u32);

impl Ticks {
    /// Create a new Ticks value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Check that the value fits a single queue entry.
    ///
    /// # Errors
    ///
    /// `InvalidSpeed` if 0 or above [`ABSOLUTE_MAX_TICKS`].
    pub fn check_range(self) -> Result<Self, ConfigError> {
        if self.0 == 0 || self.0 > ABSOLUTE_MAX_TICKS {
            Err(ConfigError::InvalidSpeed(self.0))
        } else {
            Ok(self)
        }
    }
}

/// Duration in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct Microseconds(pub u32);

impl Microseconds {
    /// Create a new Microseconds value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Convert to ticks of a timer at `ticks_per_second`, saturating.
    pub fn to_ticks(self, ticks_per_second: u32) -> Ticks {
        let ticks = u64::from(self.0) * u64::from(ticks_per_second) / 1_000_000;
        Ticks(u32::try_from(ticks).unwrap_or(u32::MAX))
    }
}

/// Acceleration in steps per second squared.
///
/// Signed so that a negative configured value can be reported as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct StepsPerSecSquared(pub i32);

impl StepsPerSecSquared {
    /// Create a new StepsPerSecSquared value.
    #[inline]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Check that the acceleration is positive.
    ///
    /// # Errors
    ///
    /// `InvalidAcceleration` if `<= 0`.
    pub fn check_positive(self) -> Result<Self, ConfigError> {
        if self.0 > 0 {
            Ok(self)
        } else {
            Err(ConfigError::InvalidAcceleration(self.0))
        }
    }
}
