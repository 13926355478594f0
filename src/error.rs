//! Error types for stepper-ramp.
//!
//! Every error is raised synchronously by the application-side call that
//! introduced the bad input. The real-time command generation has no error path.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-ramp operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration or ramp parameter error
    Config(ConfigError),
    /// Command queue rejected an entry
    Queue(QueueError),
    /// Pulse output error
    Motor(MotorError),
}

/// Configuration and ramp parameter errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Acceleration must be > 0
    InvalidAcceleration(i32),
    /// A move was requested before an acceleration was set
    MissingAcceleration,
    /// A move was requested before a speed limit was set
    MissingSpeedLimit,
    /// Speed limit in ticks per step must be in `1..=ABSOLUTE_MAX_TICKS`
    InvalidSpeed(u32),
    /// Timer frequency is too low to time steps
    InvalidTicksPerSecond(u32),
    /// Stepper name not found in configuration
    StepperNotFound(heapless::String<32>),
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

impl ConfigError {
    /// Check whether this is one of the missing-configuration errors.
    #[inline]
    pub fn is_missing_configuration(&self) -> bool {
        matches!(self, ConfigError::MissingAcceleration | ConfigError::MissingSpeedLimit)
    }
}

/// Command queue errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// No free slot left
    QueueFull,
    /// Tick count above the timer's absolute maximum
    TicksOutOfRange(u32),
    /// Step count above the per-command maximum
    StepsOutOfRange(u8),
}

/// Pulse output errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Pin operation failed
    PinError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Queue(e) => write!(f, "Queue error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAcceleration(v) => write!(f, "Invalid acceleration: {}. Must be > 0", v),
            ConfigError::MissingAcceleration => write!(f, "Acceleration not set"),
            ConfigError::MissingSpeedLimit => write!(f, "Speed limit not set"),
            ConfigError::InvalidSpeed(v) => write!(f, "Invalid speed: {} ticks per step", v),
            ConfigError::InvalidTicksPerSecond(v) => write!(f, "Invalid timer frequency: {} ticks/s", v),
            ConfigError::StepperNotFound(name) => write!(f, "Stepper '{}' not found", name),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::QueueFull => write!(f, "Command queue is full"),
            QueueError::TicksOutOfRange(t) => write!(f, "Tick count {} out of range", t),
            QueueError::StepsOutOfRange(s) => write!(f, "Step count {} out of range", s),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<QueueError> for Error {
    fn from(e: QueueError) -> Self {
        Error::Queue(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for QueueError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}
