//! Ramp generator.
//!
//! [`RampGenerator`] owns the state of one stepper's ramp and hands it out as
//! two halves. [`RampControl`] is used from the application context: it stages
//! parameters and requests motions. [`RampFeeder`] is used from the real-time
//! context: it keeps the command queue topped up. The halves share nothing but
//! a [`RampHandoff`] of atomics, so they can live in different contexts without
//! a lock.
//!
//! ```rust,ignore
//! let mut ramp = RampGenerator::new(16_000_000, 32_000);
//! let mut queue = CommandQueue::new();
//! let (mut control, mut feeder) = ramp.split();
//! let (mut producer, mut consumer) = queue.split();
//!
//! // application
//! control.set_acceleration(10_000)?;
//! control.set_speed_in_us(100)?;
//! control.move_to(20_000, &consumer.end())?;
//!
//! // timer task
//! feeder.fill_queue(&mut producer);
//! ```

use super::control::{self, RampControl};
use super::feeder::RampFeeder;
use super::handoff::RampHandoff;
use super::parameters::{RampParameters, RampSnapshot};
use super::state::{RampRunningState, RampState};

/// Storage for the ramp of one stepper.
#[derive(Debug)]
pub struct RampGenerator {
    ticks_per_second: u32,
    parameters: RampParameters,
    published: RampParameters,
    snapshot: RampSnapshot,
    rw: RampRunningState,
    handoff: RampHandoff,
}

impl RampGenerator {
    /// Generator for a timer at `ticks_per_second`, batching steps so one
    /// command lasts about `min_command_ticks`.
    pub fn new(ticks_per_second: u32, min_command_ticks: u32) -> Self {
        Self {
            ticks_per_second,
            parameters: RampParameters::new(),
            published: RampParameters::new(),
            snapshot: RampSnapshot::new(ticks_per_second, min_command_ticks),
            rw: RampRunningState::new(),
            handoff: RampHandoff::new(),
        }
    }

    /// Reset to idle with no acceleration and no speed limit.
    pub fn init(&mut self) {
        self.parameters = RampParameters::new();
        self.published = RampParameters::new();
        self.snapshot.load(&self.parameters);
        self.rw = RampRunningState::new();
        self.handoff = RampHandoff::new();
    }

    /// Split into the application half and the real-time half.
    pub fn split(&mut self) -> (RampControl<'_>, RampFeeder<'_>) {
        let control = RampControl::new(
            self.ticks_per_second,
            &mut self.parameters,
            &mut self.published,
            &self.handoff,
        );
        let feeder = RampFeeder::new(&mut self.snapshot, &mut self.rw, &self.handoff);
        (control, feeder)
    }

    /// Application half alone.
    pub fn control(&mut self) -> RampControl<'_> {
        self.split().0
    }

    /// Real-time half alone.
    pub fn feeder(&mut self) -> RampFeeder<'_> {
        self.split().1
    }

    /// Request an immediate stop. Usable from any context.
    pub fn stop_immediately(&self) {
        self.handoff.request_stop();
    }

    /// Same as [`RampControl::is_running`].
    pub fn is_running(&self) -> bool {
        control::is_running(&self.published, &self.handoff)
    }

    /// Same as [`RampControl::ramp_state`].
    pub fn ramp_state(&self) -> RampState {
        self.handoff.status().0
    }

    /// Same as [`RampControl::current_acceleration`].
    pub fn current_acceleration(&self) -> i32 {
        control::current_acceleration(&self.parameters, &self.handoff)
    }

    /// Staged parameters.
    #[inline]
    pub fn parameters(&self) -> &RampParameters {
        &self.parameters
    }

    /// Real-time state.
    #[inline]
    pub fn running_state(&self) -> &RampRunningState {
        &self.rw
    }

    /// Parameters in effect on the real-time side.
    #[inline]
    pub fn snapshot(&self) -> &RampSnapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::queue::{CommandQueue, Direction, QueueEnd, QUEUE_LEN};

    fn generator() -> RampGenerator {
        let mut ramp = RampGenerator::new(16_000_000, 32_000);
        ramp.control().set_acceleration(10_000).unwrap();
        ramp.control().set_speed_in_ticks(1600).unwrap();
        ramp
    }

    /// Fill and drain until the generator goes idle.
    fn run_to_idle(ramp: &mut RampGenerator, queue: &mut CommandQueue) {
        for _ in 0..100_000 {
            let added = ramp.feeder().fill_queue(queue);
            while queue.pop().is_some() {}
            if added == 0 && !ramp.control().is_running() {
                return;
            }
        }
        panic!("ramp did not terminate");
    }

    /// Fill and drain `rounds` times.
    fn run_for(ramp: &mut RampGenerator, queue: &mut CommandQueue, rounds: usize) {
        for _ in 0..rounds {
            ramp.feeder().fill_queue(queue);
            while queue.pop().is_some() {}
        }
    }

    #[test]
    fn test_move_requires_configuration() {
        let mut ramp = RampGenerator::new(16_000_000, 32_000);
        let end = QueueEnd::at(0);
        assert_eq!(ramp.control().move_to(100, &end), Err(ConfigError::MissingAcceleration));
        ramp.control().set_acceleration(100).unwrap();
        assert_eq!(ramp.control().move_to(100, &end), Err(ConfigError::MissingSpeedLimit));
        assert!(!ramp.control().is_running());
    }

    #[test]
    fn test_speed_in_us() {
        let mut ramp = RampGenerator::new(16_000_000, 32_000);
        ramp.control().set_speed_in_us(100).unwrap();
        assert_eq!(ramp.parameters().min_travel_ticks(), Some(1600));
        assert_eq!(ramp.control().set_speed_in_us(0), Err(ConfigError::InvalidSpeed(0)));
    }

    #[test]
    fn test_parameters_take_effect_on_publish_only() {
        let mut ramp = generator();
        ramp.control().move_to(1000, &QueueEnd::at(0)).unwrap();
        assert!(ramp.control().is_running());
        assert_eq!(ramp.running_state().state, RampState::Idle);
        assert_eq!(ramp.snapshot().acceleration(), 0);

        assert!(ramp.feeder().publish());
        assert_eq!(ramp.running_state().state, RampState::Accelerating);
        assert_eq!(ramp.snapshot().acceleration(), 10_000);
        assert_eq!(ramp.control().ramp_state(), RampState::Accelerating);
        assert!(!ramp.feeder().publish());
    }

    #[test]
    fn test_move_lands_on_target() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().move_to(3000, &queue.end()).unwrap();
        run_to_idle(&mut ramp, &mut queue);
        assert_eq!(queue.end().position, 3000);
        assert_eq!(ramp.control().ramp_state(), RampState::Idle);
    }

    #[test]
    fn test_fill_queue_stops_when_full() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().move_to(100_000, &queue.end()).unwrap();
        let added = ramp.feeder().fill_queue(&mut queue);
        assert_eq!(added, QUEUE_LEN);
        assert!(queue.is_full());
        assert_eq!(ramp.running_state().position, queue.end().position);
        assert_eq!(ramp.feeder().fill_queue(&mut queue), 0);
    }

    #[test]
    fn test_move_to_current_target_is_not_a_restart() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().move_to(500, &queue.end()).unwrap();
        run_to_idle(&mut ramp, &mut queue);

        ramp.control().move_to(500, &queue.end()).unwrap();
        assert!(!ramp.control().is_running());
        assert_eq!(ramp.feeder().fill_queue(&mut queue), 0);
    }

    #[test]
    fn test_move_by_is_relative_to_running_target() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().move_to(1000, &queue.end()).unwrap();
        ramp.feeder().fill_queue(&mut queue);
        ramp.control().move_by(500, &queue.end()).unwrap();
        assert_eq!(ramp.control().target_position(), 1500);
    }

    #[test]
    fn test_advance_target_only_while_moving() {
        let mut ramp = generator();
        ramp.control().advance_target_position(100);
        assert_eq!(ramp.control().target_position(), 0);

        let mut queue = CommandQueue::new();
        ramp.control().move_to(1000, &queue.end()).unwrap();
        ramp.feeder().fill_queue(&mut queue);
        ramp.control().advance_target_position(-300);
        assert_eq!(ramp.control().target_position(), 700);
        run_to_idle(&mut ramp, &mut queue);
        assert_eq!(queue.end().position, 700);
    }

    #[test]
    fn test_immediate_stop_returns_null_and_idles() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().move_to(100_000, &queue.end()).unwrap();
        run_for(&mut ramp, &mut queue, 3);
        assert_ne!(ramp.running_state().state, RampState::Idle);

        ramp.control().stop_immediately();
        let command = ramp.feeder().compute_next_command(&queue.end());
        assert!(!command.has_steps());
        assert_eq!(ramp.running_state().state, RampState::Idle);
        assert!(!ramp.control().is_stop_pending());
        assert!(!ramp.control().is_running());
        assert_eq!(ramp.control().current_acceleration(), 0);
    }

    #[test]
    fn test_immediate_stop_with_full_queue() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().move_to(50_000, &queue.end()).unwrap();
        assert_eq!(ramp.feeder().fill_queue(&mut queue), QUEUE_LEN);
        assert!(queue.is_full());

        ramp.feeder().stop_immediately();
        assert_eq!(ramp.feeder().fill_queue(&mut queue), 0);
        assert_eq!(ramp.running_state().state, RampState::Idle);
        assert_eq!(ramp.running_state().ramp_up_steps, 0);
        assert_eq!(ramp.running_state().position, queue.end().position);
        assert!(!ramp.control().is_stop_pending());
        assert!(!ramp.control().is_running());

        // Queued entries still run; a new move starts from where they end.
        let stopped_at = queue.end().position;
        while queue.pop().is_some() {}
        ramp.control().move_by(-100, &queue.end()).unwrap();
        run_to_idle(&mut ramp, &mut queue);
        assert_eq!(queue.end().position, stopped_at - 100);
    }

    #[test]
    fn test_move_after_immediate_stop_is_kept() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().move_to(100_000, &queue.end()).unwrap();
        ramp.feeder().fill_queue(&mut queue);

        ramp.control().stop_immediately();
        ramp.control().move_to(-200, &queue.end()).unwrap();

        let command = ramp.feeder().compute_next_command(&queue.end());
        assert!(command.has_steps());
        assert_eq!(command.entry.steps, 1);
        assert_eq!(command.entry.direction, Direction::CountDown);

        while queue.pop().is_some() {}
        run_to_idle(&mut ramp, &mut queue);
        assert_eq!(queue.end().position, -200);
    }

    #[test]
    fn test_stop_after_move_after_stop_wins() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().move_to(100_000, &queue.end()).unwrap();
        run_for(&mut ramp, &mut queue, 3);

        ramp.control().stop_immediately();
        ramp.control().move_to(-5_000, &queue.end()).unwrap();
        ramp.control().stop_immediately();

        let command = ramp.feeder().compute_next_command(&queue.end());
        assert!(!command.has_steps());
        ramp.feeder().after_command_enqueued(&command);
        assert_eq!(ramp.running_state().state, RampState::Idle);
        assert!(!ramp.control().is_running());
        assert_eq!(ramp.feeder().fill_queue(&mut queue), 0);
    }

    #[test]
    fn test_graceful_stop() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().start_run(Direction::CountUp).unwrap();
        run_for(&mut ramp, &mut queue, 20);
        let stopping = ramp.running_state().ramp_up_steps;
        let at_stop = queue.end().position;
        assert!(stopping > 0);

        ramp.control().stop_ramp();
        run_to_idle(&mut ramp, &mut queue);
        assert_eq!(queue.end().position, at_stop + stopping as i32);
    }

    #[test]
    fn test_graceful_stop_leaves_staged_speed_alone() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().start_run(Direction::CountUp).unwrap();
        run_for(&mut ramp, &mut queue, 5);

        ramp.control().set_speed_in_ticks(3200).unwrap();
        ramp.control().stop_ramp();
        assert!(ramp.feeder().publish());
        assert_eq!(ramp.snapshot().min_travel_ticks(), 1600);
        assert!(ramp.running_state().graceful_stop);
        assert!(ramp.parameters().is_dirty());

        ramp.control().apply_speed_acceleration();
        assert!(ramp.feeder().publish());
        assert_eq!(ramp.snapshot().min_travel_ticks(), 3200);
        // Applying the edit does not cancel the stop in progress.
        assert!(ramp.running_state().graceful_stop);
    }

    #[test]
    fn test_current_acceleration_sign() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().start_run(Direction::CountDown).unwrap();
        ramp.feeder().fill_queue(&mut queue);
        assert_eq!(ramp.control().ramp_state(), RampState::Accelerating);
        assert_eq!(ramp.control().current_acceleration(), -10_000);

        ramp.control().stop_ramp();
        let command = ramp.feeder().compute_next_command(&queue.end());
        ramp.feeder().after_command_enqueued(&command);
        assert_eq!(ramp.control().ramp_state(), RampState::Decelerating);
        assert_eq!(ramp.control().current_acceleration(), 10_000);
    }

    #[test]
    fn test_current_acceleration_reports_latest_setting() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().start_run(Direction::CountUp).unwrap();
        ramp.feeder().fill_queue(&mut queue);

        ramp.control().set_acceleration(25_000).unwrap();
        assert_eq!(ramp.control().current_acceleration(), 25_000);
        assert_eq!(ramp.snapshot().acceleration(), 10_000);
    }

    #[test]
    fn test_acceleration_change_keeps_speed() {
        let mut ramp = generator();
        let mut queue = CommandQueue::new();
        ramp.control().start_run(Direction::CountUp).unwrap();
        run_for(&mut ramp, &mut queue, 10);
        let before = *ramp.running_state();

        ramp.control().set_acceleration(20_000).unwrap();
        ramp.control().apply_speed_acceleration();
        ramp.feeder().publish();
        let after = *ramp.running_state();

        // Doubling the acceleration halves the distance to stop from the same speed.
        let expected = before.ramp_up_steps / 2;
        let slack = expected / 50 + 2;
        assert!(
            after.ramp_up_steps.abs_diff(expected) <= slack,
            "{} vs {}",
            after.ramp_up_steps,
            expected
        );
        assert_eq!(after.curr_ticks, before.curr_ticks);
    }

    #[test]
    fn test_requests_merge_until_taken_over() {
        let mut ramp = generator();
        ramp.control().move_to(1_000, &QueueEnd::at(0)).unwrap();
        ramp.control().set_speed_in_ticks(3200).unwrap();
        ramp.control().apply_speed_acceleration();

        // One round takes over both the start and the new speed.
        assert!(ramp.feeder().publish());
        assert_eq!(ramp.running_state().state, RampState::Accelerating);
        assert_eq!(ramp.snapshot().min_travel_ticks(), 3200);
        assert_eq!(ramp.snapshot().parameters().target_position(), 1_000);
    }

    #[test]
    fn test_split_halves_work_independently() {
        let mut ramp = RampGenerator::new(16_000_000, 32_000);
        let mut queue = CommandQueue::new();
        let (mut control, mut feeder) = ramp.split();
        let (mut producer, mut consumer) = queue.split();

        control.set_acceleration(10_000).unwrap();
        control.set_speed_in_ticks(1600).unwrap();
        control.move_to(2_000, &consumer.end()).unwrap();
        assert!(control.is_running());

        let mut position = 0;
        for _ in 0..10_000 {
            feeder.fill_queue(&mut producer);
            while let Some(entry) = consumer.pop() {
                position += entry.displacement();
            }
            if !control.is_running() && consumer.is_empty() {
                break;
            }
        }

        assert_eq!(position, 2_000);
        assert_eq!(consumer.position(), 2_000);
        assert_eq!(control.ramp_state(), RampState::Idle);
        assert_eq!(feeder.ramp_state(), RampState::Idle);
    }

    #[test]
    fn test_init_resets() {
        let mut ramp = generator();
        ramp.control().start_run(Direction::CountUp).unwrap();
        ramp.control().stop_immediately();
        ramp.init();
        assert!(!ramp.control().is_running());
        assert!(!ramp.control().is_stop_pending());
        assert_eq!(ramp.control().check_valid_config(), Err(ConfigError::MissingAcceleration));
    }
}
