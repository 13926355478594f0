//! Application half of the ramp generator.

use crate::config::Microseconds;
use crate::error::ConfigError;
use crate::queue::{Direction, QueueEnd};

use super::handoff::RampHandoff;
use super::parameters::RampParameters;
use super::state::RampState;

/// Event carried by a published record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    None,
    Start,
    Stop,
}

/// Application-side handle: stages parameters and starts or stops motions.
///
/// Obtained from [`RampGenerator::split`](super::RampGenerator::split) or
/// [`RampGenerator::control`](super::RampGenerator::control). Nothing here
/// touches the real-time state directly; requests travel through the shared
/// [`RampHandoff`] and take effect on the real-time side's next round.
#[derive(Debug)]
pub struct RampControl<'a> {
    ticks_per_second: u32,
    parameters: &'a mut RampParameters,
    published: &'a mut RampParameters,
    handoff: &'a RampHandoff,
}

impl<'a> RampControl<'a> {
    pub(crate) fn new(
        ticks_per_second: u32,
        parameters: &'a mut RampParameters,
        published: &'a mut RampParameters,
        handoff: &'a RampHandoff,
    ) -> Self {
        Self {
            ticks_per_second,
            parameters,
            published,
            handoff,
        }
    }

    /// Set the acceleration in steps/s². Takes effect on the next move or on
    /// [`apply_speed_acceleration`](Self::apply_speed_acceleration).
    ///
    /// # Errors
    ///
    /// `InvalidAcceleration` if `accel <= 0`.
    pub fn set_acceleration(&mut self, accel: i32) -> Result<(), ConfigError> {
        self.parameters.set_acceleration(accel)
    }

    /// Set the speed limit as the minimum timer ticks between steps.
    ///
    /// # Errors
    ///
    /// `InvalidSpeed` if `ticks` is 0 or above the timer range.
    pub fn set_speed_in_ticks(&mut self, ticks: u32) -> Result<(), ConfigError> {
        self.parameters.set_speed_in_ticks(ticks)
    }

    /// Set the speed limit as the minimum microseconds between steps.
    ///
    /// # Errors
    ///
    /// `InvalidSpeed` if the converted tick count is out of range.
    pub fn set_speed_in_us(&mut self, min_step_us: u32) -> Result<(), ConfigError> {
        let ticks = Microseconds::new(min_step_us).to_ticks(self.ticks_per_second);
        self.parameters.set_speed_in_ticks(ticks.value())
    }

    /// Make pending acceleration and speed changes effective for the running motion.
    pub fn apply_speed_acceleration(&mut self) {
        if self.parameters.is_dirty() {
            self.publish_staged(Request::None);
        }
    }

    /// Check that a move can be started.
    ///
    /// # Errors
    ///
    /// `MissingAcceleration` or `MissingSpeedLimit`.
    pub fn check_valid_config(&self) -> Result<(), ConfigError> {
        self.parameters.check_valid_config()
    }

    /// Start running without a target in `direction`.
    ///
    /// # Errors
    ///
    /// `MissingAcceleration` or `MissingSpeedLimit`.
    pub fn start_run(&mut self, direction: Direction) -> Result<(), ConfigError> {
        self.check_valid_config()?;
        debug!("ramp: run {}", direction);
        self.parameters.set_keep_running(direction);
        self.start();
        Ok(())
    }

    /// Move to the absolute `position`.
    ///
    /// `queue_end` is the position the already queued commands lead to. A
    /// request for the position the generator is already heading to (or
    /// resting at) is not a restart.
    ///
    /// # Errors
    ///
    /// `MissingAcceleration` or `MissingSpeedLimit`.
    pub fn move_to(&mut self, position: i32, queue_end: &QueueEnd) -> Result<(), ConfigError> {
        self.check_valid_config()?;
        let running_free = self.is_running() && self.parameters.keep_running;
        let current = self.heading_to(queue_end);
        self.parameters.set_target_position(position);
        if position == current && !running_free {
            // Nothing new; pending speed edits still apply.
            self.publish_staged(Request::None);
            return Ok(());
        }
        debug!("ramp: move to {}", position);
        self.start();
        Ok(())
    }

    /// Move by `delta` steps relative to where the generator is heading.
    ///
    /// # Errors
    ///
    /// `MissingAcceleration` or `MissingSpeedLimit`.
    pub fn move_by(&mut self, delta: i32, queue_end: &QueueEnd) -> Result<(), ConfigError> {
        let current = self.heading_to(queue_end);
        self.move_to(current.wrapping_add(delta), queue_end)
    }

    /// Shift the target of a running move by `delta`. No effect when idle or
    /// in keep-running mode.
    pub fn advance_target_position(&mut self, delta: i32) {
        if !self.is_running() || self.parameters.keep_running {
            return;
        }
        let target = self.parameters.target_position.wrapping_add(delta);
        self.parameters.set_target_position(target);
        self.start();
    }

    /// Ramp down to rest. The target of a move is abandoned.
    ///
    /// Staged speed and acceleration edits are not applied by this call.
    pub fn stop_ramp(&mut self) {
        debug!("ramp: graceful stop");
        let mut record = *self.published;
        record.clear_events();
        self.send(record, Request::Stop);
    }

    /// Request an immediate stop. Voids any move requested before this call.
    pub fn stop_immediately(&self) {
        self.handoff.request_stop();
    }

    /// Check if an immediate stop is pending.
    #[inline]
    pub fn is_stop_pending(&self) -> bool {
        self.handoff.is_stop_pending()
    }

    /// Signed acceleration of the current phase: positive while speeding up
    /// upward or slowing down downward, 0 while coasting or idle.
    ///
    /// Reports the most recently set acceleration, applied or not.
    pub fn current_acceleration(&self) -> i32 {
        current_acceleration(&*self.parameters, self.handoff)
    }

    /// Check if the generator is producing commands or about to.
    pub fn is_running(&self) -> bool {
        is_running(&*self.published, self.handoff)
    }

    /// Phase reported by the real-time side.
    #[inline]
    pub fn ramp_state(&self) -> RampState {
        self.handoff.status().0
    }

    /// Staged parameters.
    #[inline]
    pub fn parameters(&self) -> &RampParameters {
        &*self.parameters
    }

    /// Target of the current (or last) move.
    #[inline]
    pub fn target_position(&self) -> i32 {
        self.parameters.target_position
    }

    fn heading_to(&self, queue_end: &QueueEnd) -> i32 {
        if self.is_running() && !self.parameters.keep_running {
            self.parameters.target_position
        } else {
            queue_end.position
        }
    }

    fn start(&mut self) {
        self.handoff.mark_incomplete_stop();
        self.publish_staged(Request::Start);
    }

    fn publish_staged(&mut self, request: Request) {
        let record = *self.parameters;
        self.parameters.dirty = false;
        self.send(record, request);
    }

    fn send(&mut self, mut record: RampParameters, request: Request) {
        match request {
            Request::Start => record.request_start(),
            Request::Stop => record.request_stop(),
            Request::None => {}
        }
        if !self.handoff.is_consumed() {
            record.carry_events(&*self.published);
        }
        self.handoff.publish(&record);
        *self.published = record;
    }
}

pub(super) fn current_acceleration(parameters: &RampParameters, handoff: &RampHandoff) -> i32 {
    let accel = i32::try_from(parameters.acceleration.unwrap_or(0)).unwrap_or(i32::MAX);
    match handoff.status() {
        (RampState::Accelerating, Direction::CountUp)
        | (RampState::Decelerating, Direction::CountDown) => accel,
        (RampState::Accelerating, Direction::CountDown)
        | (RampState::Decelerating, Direction::CountUp) => -accel,
        _ => 0,
    }
}

pub(super) fn is_running(published: &RampParameters, handoff: &RampHandoff) -> bool {
    // The acknowledgement is read before the status it follows.
    let start_pending = published.start_requested && !handoff.is_consumed();
    start_pending || handoff.status().0 != RampState::Idle
}
