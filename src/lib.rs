//! # stepper-ramp
//!
//! Acceleration-ramp generation for stepper motors, split between an
//! application context and a real-time context.
//!
//! ## Features
//!
//! - **Log-domain math**: ramp speeds computed with additions and table lookups only
//! - **Lock-free command queue**: single producer, single consumer, fixed capacity
//! - **Double-buffered parameters**: edits become visible to the real-time side as a unit
//! - **Split handles**: `RampGenerator::split` yields a `RampControl` for the
//!   application and a `RampFeeder` for the timer context, sharing only atomics
//! - **Exact landing**: moves end on the requested position, step for step
//! - **embedded-hal 1.0**: reference pulse emitter over `OutputPin` and `DelayNs`
//! - **no_std compatible**: no heap allocation anywhere
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_ramp::{NoInterrupts, StepPulser, Stepper};
//!
//! // Load configuration from TOML
//! let config = stepper_ramp::load_config("steppers.toml")?;
//! let mut stepper = Stepper::from_system_config(&config, "x_axis", NoInterrupts)?;
//!
//! let mut pulser = StepPulser::new(
//!     step_pin,
//!     dir_pin,
//!     delay,
//!     stepper.ticks_per_second(),
//!     stepper.invert_direction(),
//! );
//!
//! stepper.move_to(20_000)?;
//! stepper.run_to_completion(&mut pulser)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Logging macros are textually scoped: keep this declaration first.
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod fixed_log;
pub mod motor;
pub mod queue;
pub mod ramp;

// Re-exports for ergonomic API
pub use config::{validate_config, StepperConfig, SystemConfig};
pub use error::{Error, Result};
pub use fixed_log::LogValue;
pub use motor::{CriticalSection, NoInterrupts, PulseEmitter, StepPulser, Stepper};
pub use queue::{
    CommandQueue, Direction, QueueEntry, ABSOLUTE_MAX_TICKS, MAX_STEPS_PER_COMMAND, QUEUE_LEN,
};
pub use ramp::{RampControl, RampFeeder, RampGenerator, RampState};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Microseconds, StepsPerSecSquared, Ticks};
