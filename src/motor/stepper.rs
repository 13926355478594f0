//! Stepper facade.
//!
//! Owns the ramp generator and the command queue of one stepper channel and
//! exposes the application-side API. Every access that has to be observed as a
//! unit by the real-time side runs inside the injected [`CriticalSection`].
//!
//! When the application and the timer interrupt cannot share a `Stepper`, use
//! [`RampGenerator::split`] and [`CommandQueue::split`] directly instead.

use heapless::String;

use crate::config::{validate_stepper, StepperConfig, SystemConfig};
use crate::error::{Error, Result};
use crate::queue::{CommandQueue, Direction, QueueEntry};
use crate::ramp::{RampGenerator, RampState};

use super::hal::{CriticalSection, NoInterrupts, PulseEmitter};

/// One stepper channel: ramp generator plus command queue.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_ramp::{NoInterrupts, Stepper};
///
/// let mut stepper = Stepper::new(16_000_000, 32_000, NoInterrupts);
/// stepper.set_acceleration(10_000)?;
/// stepper.set_speed_in_us(100)?;
/// stepper.move_to(20_000)?;
/// stepper.run_to_completion(&mut pulser)?;
/// ```
pub struct Stepper<C: CriticalSection = NoInterrupts> {
    name: String<32>,
    ramp: RampGenerator,
    queue: CommandQueue,
    cs: C,
    ticks_per_second: u32,
    invert_direction: bool,
}

impl<C: CriticalSection> Stepper<C> {
    /// Create an unconfigured stepper at position 0.
    pub fn new(ticks_per_second: u32, min_command_ticks: u32, cs: C) -> Self {
        Self {
            name: String::new(),
            ramp: RampGenerator::new(ticks_per_second, min_command_ticks),
            queue: CommandQueue::new(),
            cs,
            ticks_per_second,
            invert_direction: false,
        }
    }

    /// Create a stepper from a validated configuration.
    ///
    /// # Errors
    ///
    /// Any validation error of `config`.
    pub fn from_config(name: &str, config: &StepperConfig, cs: C) -> Result<Self> {
        validate_stepper(config)?;

        let mut stepper = Self::new(
            config.ticks_per_second,
            config.min_command_ticks().value(),
            cs,
        );
        stepper.name = String::try_from(name).unwrap_or_default();
        stepper.invert_direction = config.invert_direction;

        if let Some(accel) = config.acceleration {
            stepper.set_acceleration(accel.value())?;
        }
        if let Some(ticks) = config.min_step_ticks() {
            stepper.set_speed_in_ticks(ticks.value())?;
        }

        debug!(
            "stepper {}: {} ticks/s",
            stepper.name.as_str(),
            config.ticks_per_second
        );
        Ok(stepper)
    }

    /// Create the stepper named `name` in a system configuration.
    ///
    /// # Errors
    ///
    /// `StepperNotFound` or any validation error.
    pub fn from_system_config(config: &SystemConfig, name: &str, cs: C) -> Result<Self> {
        let stepper = config.require_stepper(name)?;
        Self::from_config(name, stepper, cs)
    }

    /// Reset to idle at position 0 with an empty queue and no parameters.
    pub fn init(&mut self) {
        self.cs.with(|| {
            self.ramp.init();
            self.queue = CommandQueue::new();
        });
    }

    /// Get the stepper name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Timer frequency the queue entries refer to.
    #[inline]
    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Whether the direction pin logic is inverted for this channel.
    #[inline]
    pub fn invert_direction(&self) -> bool {
        self.invert_direction
    }

    // Parameters

    /// Set the acceleration in steps/s².
    ///
    /// # Errors
    ///
    /// `InvalidAcceleration` if `accel <= 0`.
    pub fn set_acceleration(&mut self, accel: i32) -> Result<()> {
        self.ramp.control().set_acceleration(accel).map_err(|e| {
            warn!("stepper: acceleration {} rejected", accel);
            Error::from(e)
        })
    }

    /// Set the speed limit as the minimum timer ticks between steps.
    ///
    /// # Errors
    ///
    /// `InvalidSpeed` if out of range.
    pub fn set_speed_in_ticks(&mut self, min_step_ticks: u32) -> Result<()> {
        self.ramp.control().set_speed_in_ticks(min_step_ticks).map_err(|e| {
            warn!("stepper: speed {} ticks rejected", min_step_ticks);
            Error::from(e)
        })
    }

    /// Set the speed limit as the minimum microseconds between steps.
    ///
    /// # Errors
    ///
    /// `InvalidSpeed` if out of range.
    pub fn set_speed_in_us(&mut self, min_step_us: u32) -> Result<()> {
        self.ramp.control().set_speed_in_us(min_step_us).map_err(|e| {
            warn!("stepper: speed {} us rejected", min_step_us);
            Error::from(e)
        })
    }

    /// Make acceleration and speed changes effective for the running motion.
    pub fn apply_speed_acceleration(&mut self) {
        self.cs.with(|| self.ramp.control().apply_speed_acceleration());
    }

    // Motion

    /// Run without a target in `direction` until stopped.
    ///
    /// # Errors
    ///
    /// `MissingAcceleration` or `MissingSpeedLimit`.
    pub fn start_run(&mut self, direction: Direction) -> Result<()> {
        self.cs
            .with(|| self.ramp.control().start_run(direction))
            .map_err(Error::from)
    }

    /// Run up until stopped.
    ///
    /// # Errors
    ///
    /// `MissingAcceleration` or `MissingSpeedLimit`.
    pub fn run_forward(&mut self) -> Result<()> {
        self.start_run(Direction::CountUp)
    }

    /// Run down until stopped.
    ///
    /// # Errors
    ///
    /// `MissingAcceleration` or `MissingSpeedLimit`.
    pub fn run_backward(&mut self) -> Result<()> {
        self.start_run(Direction::CountDown)
    }

    /// Move to the absolute `position`.
    ///
    /// # Errors
    ///
    /// `MissingAcceleration` or `MissingSpeedLimit`.
    pub fn move_to(&mut self, position: i32) -> Result<()> {
        self.cs
            .with(|| {
                let end = self.queue.end();
                self.ramp.control().move_to(position, &end)
            })
            .map_err(Error::from)
    }

    /// Move by `delta` steps from where the stepper is heading.
    ///
    /// # Errors
    ///
    /// `MissingAcceleration` or `MissingSpeedLimit`.
    pub fn move_by(&mut self, delta: i32) -> Result<()> {
        self.cs
            .with(|| {
                let end = self.queue.end();
                self.ramp.control().move_by(delta, &end)
            })
            .map_err(Error::from)
    }

    /// Shift the target of a running move by `delta`.
    pub fn advance_target_position(&mut self, delta: i32) {
        self.cs
            .with(|| self.ramp.control().advance_target_position(delta));
    }

    /// Ramp down to rest.
    pub fn stop_ramp(&mut self) {
        self.cs.with(|| self.ramp.control().stop_ramp());
    }

    /// Stop without ramping down. Entries already queued still run.
    pub fn stop_immediately(&self) {
        debug!("stepper: immediate stop");
        self.ramp.stop_immediately();
    }

    // Status

    /// Signed acceleration of the current phase.
    pub fn current_acceleration(&self) -> i32 {
        self.cs.with(|| self.ramp.current_acceleration())
    }

    /// Position the motor has reached: the sum of every popped entry.
    pub fn current_position(&self) -> i32 {
        self.queue.position()
    }

    /// Position after every queued command has run.
    pub fn position_after_commands_completed(&self) -> i32 {
        self.cs.with(|| self.queue.end().position)
    }

    /// Redefine the current position. A running move keeps its remaining distance.
    pub fn set_current_position(&mut self, position: i32) {
        self.cs.with(|| {
            let delta = position.wrapping_sub(self.queue.position());
            self.queue.set_position(position);
            self.ramp.control().advance_target_position(delta);
        });
    }

    /// Check if the ramp generator is active.
    pub fn is_running(&self) -> bool {
        self.cs.with(|| self.ramp.is_running())
    }

    /// Phase of the profile.
    pub fn ramp_state(&self) -> RampState {
        self.cs.with(|| self.ramp.ramp_state())
    }

    /// Target of the current (or last) move.
    pub fn target_position(&self) -> i32 {
        self.ramp.parameters().target_position()
    }

    /// Ramp generator, read-only.
    #[inline]
    pub fn ramp(&self) -> &RampGenerator {
        &self.ramp
    }

    // Queue

    /// Append a raw entry, bypassing the ramp generator.
    ///
    /// # Errors
    ///
    /// `QueueFull`, `TicksOutOfRange` or `StepsOutOfRange`.
    pub fn add_queue_entry(&mut self, entry: QueueEntry) -> Result<()> {
        self.cs
            .with(|| self.queue.push(entry))
            .map_err(Error::from)
    }

    /// Check if no entry is queued.
    pub fn is_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Check if no further entry can be queued.
    pub fn is_queue_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Command queue, read-only.
    #[inline]
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    // Real-time side

    /// Top up the queue from the ramp generator. Returns the entries added.
    pub fn fill_queue(&mut self) -> usize {
        self.ramp.feeder().fill_queue(&mut self.queue)
    }

    /// Take the next entry for the pulse emitter.
    pub fn pop_command(&mut self) -> Option<QueueEntry> {
        self.queue.pop()
    }

    /// Drive fill, pop and emit until the ramp is idle and the queue is drained.
    ///
    /// Does not return in keep-running mode until a stop is requested from
    /// another context.
    ///
    /// # Errors
    ///
    /// The first error reported by `emitter`.
    pub fn run_to_completion<E: PulseEmitter>(&mut self, emitter: &mut E) -> Result<()> {
        loop {
            self.fill_queue();
            match self.pop_command() {
                Some(entry) => emitter.emit(&entry)?,
                None => return Ok(()),
            }
        }
    }
}

impl<C: CriticalSection> core::fmt::Debug for Stepper<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stepper")
            .field("name", &self.name.as_str())
            .field("ramp", &self.ramp)
            .field("queue", &self.queue)
            .finish()
    }
}
