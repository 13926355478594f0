//! Ramp parameters and their real-time snapshot.
//!
//! The application side edits [`RampParameters`]. Edits become visible to the
//! real-time side only when they are published: on its next round the
//! real-time side copies the record into its [`RampSnapshot`] and precomputes
//! the log-domain constants the command computation needs.

use crate::error::ConfigError;
use crate::fixed_log::LogValue;
use crate::queue::{Direction, ABSOLUTE_MAX_TICKS, MAX_STEPS_PER_COMMAND};

/// Application-side ramp parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampParameters {
    pub(crate) target_position: i32,
    pub(crate) acceleration: Option<u32>,
    pub(crate) min_travel_ticks: Option<u32>,
    pub(crate) keep_running: bool,
    pub(crate) keep_running_direction: Direction,
    pub(crate) start_requested: bool,
    pub(crate) stop_requested: bool,
    pub(crate) dirty: bool,
}

impl Default for RampParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl RampParameters {
    /// Empty parameter set: no acceleration, no speed limit, target 0.
    pub const fn new() -> Self {
        Self {
            target_position: 0,
            acceleration: None,
            min_travel_ticks: None,
            keep_running: false,
            keep_running_direction: Direction::CountUp,
            start_requested: false,
            stop_requested: false,
            dirty: false,
        }
    }

    /// Set the acceleration in steps/s².
    ///
    /// # Errors
    ///
    /// `InvalidAcceleration` if `accel <= 0`. Nothing changes in that case.
    pub fn set_acceleration(&mut self, accel: i32) -> Result<(), ConfigError> {
        let accel = u32::try_from(accel)
            .ok()
            .filter(|a| *a > 0)
            .ok_or(ConfigError::InvalidAcceleration(accel))?;
        if self.acceleration != Some(accel) {
            self.acceleration = Some(accel);
            self.dirty = true;
        }
        Ok(())
    }

    /// Set the speed limit as the minimum timer ticks between steps.
    ///
    /// # Errors
    ///
    /// `InvalidSpeed` if `ticks` is 0 or above [`ABSOLUTE_MAX_TICKS`].
    pub fn set_speed_in_ticks(&mut self, ticks: u32) -> Result<(), ConfigError> {
        if ticks == 0 || ticks > ABSOLUTE_MAX_TICKS {
            return Err(ConfigError::InvalidSpeed(ticks));
        }
        if self.min_travel_ticks != Some(ticks) {
            self.min_travel_ticks = Some(ticks);
            self.dirty = true;
        }
        Ok(())
    }

    /// Switch to target mode with a new absolute target.
    pub fn set_target_position(&mut self, position: i32) {
        self.target_position = position;
        self.keep_running = false;
        self.dirty = true;
    }

    /// Switch to keep-running mode in `direction`.
    pub fn set_keep_running(&mut self, direction: Direction) {
        self.keep_running = true;
        self.keep_running_direction = direction;
        self.dirty = true;
    }

    /// Ask the real-time side to activate the generator.
    pub(crate) fn request_start(&mut self) {
        self.start_requested = true;
        self.stop_requested = false;
    }

    /// Ask the real-time side to ramp down to rest.
    pub(crate) fn request_stop(&mut self) {
        self.stop_requested = true;
        self.start_requested = false;
    }

    pub(crate) fn clear_events(&mut self) {
        self.start_requested = false;
        self.stop_requested = false;
        self.dirty = false;
    }

    /// Keep the events of an earlier record that was never taken over.
    /// Events already set on `self` take precedence.
    pub(crate) fn carry_events(&mut self, earlier: &RampParameters) {
        self.dirty |= earlier.dirty;
        if !self.start_requested && !self.stop_requested {
            self.start_requested = earlier.start_requested;
            self.stop_requested = earlier.stop_requested;
        }
    }

    /// Check that a move can be started with these parameters.
    ///
    /// # Errors
    ///
    /// `MissingAcceleration`, then `MissingSpeedLimit`.
    pub fn check_valid_config(&self) -> Result<(), ConfigError> {
        if self.acceleration.is_none() {
            return Err(ConfigError::MissingAcceleration);
        }
        if self.min_travel_ticks.is_none() {
            return Err(ConfigError::MissingSpeedLimit);
        }
        Ok(())
    }

    /// Configured acceleration in steps/s².
    #[inline]
    pub fn acceleration(&self) -> Option<u32> {
        self.acceleration
    }

    /// Configured speed limit in ticks per step.
    #[inline]
    pub fn min_travel_ticks(&self) -> Option<u32> {
        self.min_travel_ticks
    }

    /// Absolute target in target mode.
    #[inline]
    pub fn target_position(&self) -> i32 {
        self.target_position
    }

    /// Check for keep-running mode.
    #[inline]
    pub fn keep_running(&self) -> bool {
        self.keep_running
    }

    /// Direction used in keep-running mode.
    #[inline]
    pub fn keep_running_direction(&self) -> Direction {
        self.keep_running_direction
    }

    /// Check for edits that have not been transferred yet.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Real-time copy of the ramp parameters plus precomputed constants.
///
/// Speeds are handled through the ramp index `n`: the number of steps an
/// acceleration from rest needs to reach a speed. With `T` ticks per second
/// and acceleration `a`, the step period at index `n` is `T / sqrt(2·a·n)` and
/// the index of a step period `t` is `T² / (2·a·t²)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampSnapshot {
    parameters: RampParameters,
    log_ticks_per_second: LogValue,
    log_min_command_ticks: LogValue,
    log_two_acceleration: LogValue,
    log_first_step_ticks: LogValue,
    min_travel_ticks: u32,
    max_ramp_up_steps: u32,
}

impl RampSnapshot {
    /// Snapshot for a timer running at `ticks_per_second`, batching steps so
    /// one command lasts about `min_command_ticks`.
    pub fn new(ticks_per_second: u32, min_command_ticks: u32) -> Self {
        let mut snapshot = Self {
            parameters: RampParameters::new(),
            log_ticks_per_second: LogValue::from_u32(ticks_per_second),
            log_min_command_ticks: LogValue::from_u32(min_command_ticks),
            log_two_acceleration: LogValue::ZERO,
            log_first_step_ticks: LogValue::ZERO,
            min_travel_ticks: ABSOLUTE_MAX_TICKS,
            max_ramp_up_steps: 1,
        };
        snapshot.load(&RampParameters::new());
        snapshot
    }

    /// Take over `parameters` and refresh the derived constants.
    pub(crate) fn load(&mut self, parameters: &RampParameters) {
        self.parameters = *parameters;
        let acceleration = parameters.acceleration.unwrap_or(1);
        self.min_travel_ticks = parameters.min_travel_ticks.unwrap_or(ABSOLUTE_MAX_TICKS);
        self.log_two_acceleration = LogValue::from_u32(acceleration).shl(1);
        self.log_first_step_ticks = self
            .log_ticks_per_second
            .multiply(self.log_two_acceleration.reciprocal_sqrt());
        self.max_ramp_up_steps = self.stopping_distance(self.min_travel_ticks).max(1);
    }

    /// Parameters in effect.
    #[inline]
    pub fn parameters(&self) -> &RampParameters {
        &self.parameters
    }

    /// Acceleration in effect, 0 when none is configured.
    #[inline]
    pub fn acceleration(&self) -> u32 {
        self.parameters.acceleration.unwrap_or(0)
    }

    /// Ticks per step at the speed limit.
    #[inline]
    pub fn min_travel_ticks(&self) -> u32 {
        self.min_travel_ticks
    }

    /// Ramp index of the speed limit.
    #[inline]
    pub fn max_ramp_up_steps(&self) -> u32 {
        self.max_ramp_up_steps
    }

    /// Ticks per step at ramp index `ramp_up_steps`, clamped to the speed
    /// limit and the timer range.
    pub fn ticks_at(&self, ramp_up_steps: u32) -> u32 {
        self.braking_ticks_at(ramp_up_steps).max(self.min_travel_ticks)
    }

    /// Ticks per step at ramp index `ramp_up_steps`, clamped to the timer
    /// range only. Used while slowing down from above the speed limit.
    pub fn braking_ticks_at(&self, ramp_up_steps: u32) -> u32 {
        let log_n = LogValue::from_u32(ramp_up_steps.max(1));
        self.log_first_step_ticks
            .multiply(log_n.reciprocal_sqrt())
            .to_u32()
            .clamp(1, ABSOLUTE_MAX_TICKS)
    }

    /// Steps needed to stop from a step period of `ticks`.
    pub fn stopping_distance(&self, ticks: u32) -> u32 {
        if ticks == 0 {
            return 0;
        }
        self.log_ticks_per_second
            .square()
            .multiply(LogValue::from_u32(ticks).reciprocal_square())
            .divide(self.log_two_acceleration)
            .to_u32()
    }

    /// Steps to batch into one command at step period `curr_ticks`.
    ///
    /// Always 1 from rest so the first steps follow the ramp closely.
    pub fn steps_per_command(&self, curr_ticks: u32, ramp_up_steps: u32) -> u32 {
        if ramp_up_steps == 0 || curr_ticks == 0 {
            return 1;
        }
        let steps = self
            .log_min_command_ticks
            .divide(LogValue::from_u32(curr_ticks))
            .to_u16();
        u32::from(steps).clamp(1, u32::from(MAX_STEPS_PER_COMMAND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(accel: i32, ticks: u32) -> RampSnapshot {
        let mut params = RampParameters::new();
        params.set_acceleration(accel).unwrap();
        params.set_speed_in_ticks(ticks).unwrap();
        let mut snapshot = RampSnapshot::new(16_000_000, 32_000);
        snapshot.load(&params);
        snapshot
    }

    #[test]
    fn test_set_acceleration_rejects_non_positive() {
        let mut params = RampParameters::new();
        assert_eq!(params.set_acceleration(0), Err(ConfigError::InvalidAcceleration(0)));
        assert_eq!(params.set_acceleration(-5), Err(ConfigError::InvalidAcceleration(-5)));
        assert_eq!(params.acceleration(), None);
        assert!(!params.is_dirty());

        params.set_acceleration(1000).unwrap();
        assert_eq!(params.acceleration(), Some(1000));
        assert!(params.is_dirty());
    }

    #[test]
    fn test_set_speed_range() {
        let mut params = RampParameters::new();
        assert_eq!(params.set_speed_in_ticks(0), Err(ConfigError::InvalidSpeed(0)));
        assert_eq!(
            params.set_speed_in_ticks(ABSOLUTE_MAX_TICKS + 1),
            Err(ConfigError::InvalidSpeed(ABSOLUTE_MAX_TICKS + 1))
        );
        params.set_speed_in_ticks(ABSOLUTE_MAX_TICKS).unwrap();
        assert_eq!(params.min_travel_ticks(), Some(ABSOLUTE_MAX_TICKS));
    }

    #[test]
    fn test_check_valid_config_order() {
        let mut params = RampParameters::new();
        assert_eq!(params.check_valid_config(), Err(ConfigError::MissingAcceleration));
        params.set_speed_in_ticks(1600).unwrap();
        assert_eq!(params.check_valid_config(), Err(ConfigError::MissingAcceleration));
        params.set_acceleration(10_000).unwrap();
        assert!(params.check_valid_config().is_ok());

        let mut params = RampParameters::new();
        params.set_acceleration(10_000).unwrap();
        assert_eq!(params.check_valid_config(), Err(ConfigError::MissingSpeedLimit));
    }

    #[test]
    fn test_start_and_stop_requests_replace_each_other() {
        let mut params = RampParameters::new();
        params.request_start();
        params.request_stop();
        assert!(params.stop_requested);
        assert!(!params.start_requested);
    }

    #[test]
    fn test_carry_events_keeps_newer_request() {
        let mut earlier = RampParameters::new();
        earlier.set_acceleration(500).unwrap();
        earlier.request_start();

        let mut record = RampParameters::new();
        record.carry_events(&earlier);
        assert!(record.start_requested);
        assert!(record.dirty);

        let mut record = RampParameters::new();
        record.request_stop();
        record.carry_events(&earlier);
        assert!(record.stop_requested);
        assert!(!record.start_requested);

        record.clear_events();
        assert!(!record.stop_requested && !record.dirty);
    }

    #[test]
    fn test_ramp_constants() {
        // v = 10_000 steps/s at a = 10_000 steps/s² needs v²/2a = 5000 steps.
        let snapshot = configured(10_000, 1600);
        assert_eq!(snapshot.max_ramp_up_steps(), 5000);
        assert_eq!(snapshot.stopping_distance(3200), 1250);

        // First step: T / sqrt(2a) ≈ 113_137 ticks.
        let first = snapshot.ticks_at(1);
        assert!((112_000..=114_500).contains(&first), "first step {}", first);
        assert_eq!(snapshot.ticks_at(0), first);

        let top = snapshot.ticks_at(5000);
        assert!((1600..=1610).contains(&top), "top {}", top);
        assert_eq!(snapshot.ticks_at(1_000_000), 1600);
        assert!(snapshot.braking_ticks_at(20_000) < 1600);
    }

    #[test]
    fn test_ticks_decrease_with_ramp_index() {
        let snapshot = configured(10_000, 1600);
        let mut previous = u32::MAX;
        for n in [1, 2, 4, 16, 100, 1000, 4000] {
            let ticks = snapshot.ticks_at(n);
            assert!(ticks <= previous);
            previous = ticks;
        }
    }

    #[test]
    fn test_slow_ramp_clamps_to_timer_range() {
        let snapshot = configured(1, ABSOLUTE_MAX_TICKS);
        assert_eq!(snapshot.ticks_at(1), ABSOLUTE_MAX_TICKS);
        assert_eq!(snapshot.max_ramp_up_steps(), 1);
    }

    #[test]
    fn test_steps_per_command() {
        let snapshot = configured(10_000, 1600);
        assert_eq!(snapshot.steps_per_command(113_000, 0), 1);
        assert_eq!(snapshot.steps_per_command(0, 10), 1);
        assert_eq!(snapshot.steps_per_command(113_000, 1), 1);
        assert_eq!(snapshot.steps_per_command(1600, 5000), 20);
        assert_eq!(snapshot.steps_per_command(10, 5000), u32::from(MAX_STEPS_PER_COMMAND));
    }
}
