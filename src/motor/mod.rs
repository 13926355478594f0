//! Motor module for stepper-ramp.
//!
//! Provides the application-side stepper facade, the hardware traits it is
//! generic over and a blocking reference pulse emitter.

mod hal;
mod pulser;
mod stepper;

pub use hal::{CriticalSection, NoInterrupts, PulseEmitter};
pub use pulser::StepPulser;
pub use stepper::Stepper;
