//! Ramp phase and running state.

use crate::queue::{Direction, QueueEnd, QueueEntry};

/// Phase of the speed profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampState {
    /// No motion pending. The ramp generator is inactive.
    #[default]
    Idle,
    /// Speeding up toward the speed limit.
    Accelerating,
    /// Holding speed.
    Coasting,
    /// Slowing down toward rest (or toward a lowered speed limit).
    Decelerating,
}

/// State owned by the real-time side.
///
/// Speed is carried as `ramp_up_steps`: the number of steps an acceleration
/// from rest needs to reach the current speed, which by symmetry is also the
/// number of steps needed to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampRunningState {
    /// Current phase.
    pub state: RampState,
    /// Direction of the current (or last) motion.
    pub direction: Direction,
    /// Steps to stop from the current speed.
    pub ramp_up_steps: u32,
    /// Ticks between the steps of the last command, 0 at rest.
    pub curr_ticks: u32,
    /// Position after the last committed command.
    pub position: i32,
    /// A graceful stop is in progress.
    pub graceful_stop: bool,
}

impl RampRunningState {
    /// Fresh state at rest.
    pub const fn new() -> Self {
        Self {
            state: RampState::Idle,
            direction: Direction::CountUp,
            ramp_up_steps: 0,
            curr_ticks: 0,
            position: 0,
            graceful_stop: false,
        }
    }

    /// Check if the generator is producing commands.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state != RampState::Idle
    }

    /// Check if the motor has speed left.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.ramp_up_steps > 0
    }

    /// Signed steps to stop: positive when moving up, negative when moving down.
    #[inline]
    pub fn signed_stopping_distance(&self) -> i64 {
        i64::from(self.ramp_up_steps) * i64::from(self.direction.sign())
    }

    /// Activate the generator if it is idle. A running ramp keeps its speed.
    pub(crate) fn start_if_not_running(&mut self) {
        if self.state == RampState::Idle {
            self.state = RampState::Accelerating;
        }
        self.graceful_stop = false;
    }

    /// Latch a graceful stop on an active ramp.
    pub(crate) fn request_graceful_stop(&mut self) {
        if self.is_active() {
            self.graceful_stop = true;
        }
    }

    /// Drop all speed and deactivate.
    pub(crate) fn stop(&mut self) {
        self.state = RampState::Idle;
        self.ramp_up_steps = 0;
        self.curr_ticks = 0;
        self.graceful_stop = false;
    }

    /// Drop all speed but keep the (possibly just started) phase.
    pub(crate) fn reset_speed(&mut self) {
        self.ramp_up_steps = 0;
        self.curr_ticks = 0;
        self.graceful_stop = false;
    }

    /// This state, deactivated at the queue end.
    pub(crate) fn idle_at(&self, queue_end: &QueueEnd) -> Self {
        let mut idle = *self;
        idle.stop();
        idle.position = queue_end.position;
        idle
    }
}

/// A computed command together with the running state it leads to.
///
/// The state only becomes current once the command has been accepted by the
/// queue (see [`RampFeeder::after_command_enqueued`](super::RampFeeder::after_command_enqueued)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NextCommand {
    /// Entry to enqueue. [`QueueEntry::NULL`] when there is nothing to do.
    pub entry: QueueEntry,
    /// Running state after this entry.
    pub state: RampRunningState,
}

impl NextCommand {
    /// No command, generator at rest.
    pub(crate) fn idle(rw: &RampRunningState, queue_end: &QueueEnd) -> Self {
        Self {
            entry: QueueEntry::NULL,
            state: rw.idle_at(queue_end),
        }
    }

    /// Check whether this command carries steps to enqueue.
    #[inline]
    pub fn has_steps(&self) -> bool {
        !self.entry.is_null()
    }
}
