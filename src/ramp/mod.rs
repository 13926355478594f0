//! Ramp generator module for stepper-ramp.
//!
//! Produces a trapezoidal (or triangular) speed profile as a stream of
//! [`QueueEntry`](crate::queue::QueueEntry) commands. All speed math runs in
//! the log domain so the real-time side needs no multiplication or division.
//! [`RampGenerator::split`] yields a [`RampControl`] for the application and a
//! [`RampFeeder`] for the real-time context.

mod calculator;
mod control;
mod feeder;
mod generator;
mod handoff;
mod parameters;
mod state;

pub use control::RampControl;
pub use feeder::RampFeeder;
pub use generator::RampGenerator;
pub use handoff::RampHandoff;
pub use parameters::{RampParameters, RampSnapshot};
pub use state::{NextCommand, RampRunningState, RampState};
