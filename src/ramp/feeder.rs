//! Real-time half of the ramp generator.

use crate::queue::{CommandSink, QueueEnd};

use super::calculator;
use super::handoff::RampHandoff;
use super::parameters::RampSnapshot;
use super::state::{NextCommand, RampRunningState, RampState};

/// Real-time handle: turns the published parameters into queue entries.
///
/// Call [`fill_queue`](Self::fill_queue) periodically (or the lower level
/// [`compute_next_command`](Self::compute_next_command) and
/// [`after_command_enqueued`](Self::after_command_enqueued) pair). None of
/// these block, allocate or fail.
#[derive(Debug)]
pub struct RampFeeder<'a> {
    snapshot: &'a mut RampSnapshot,
    rw: &'a mut RampRunningState,
    handoff: &'a RampHandoff,
}

impl<'a> RampFeeder<'a> {
    pub(crate) fn new(
        snapshot: &'a mut RampSnapshot,
        rw: &'a mut RampRunningState,
        handoff: &'a RampHandoff,
    ) -> Self {
        Self {
            snapshot,
            rw,
            handoff,
        }
    }

    /// Take over the latest published record and its start/stop events.
    /// Returns whether anything was taken over.
    pub fn publish(&mut self) -> bool {
        let Some((sequence, record)) = self.handoff.take() else {
            return false;
        };

        if record.dirty {
            let old_acceleration = self.snapshot.acceleration();
            self.snapshot.load(&record);
            if self.rw.is_moving() && self.snapshot.acceleration() != old_acceleration {
                // Re-express the current speed as a ramp index of the new acceleration.
                self.rw.ramp_up_steps = self.snapshot.stopping_distance(self.rw.curr_ticks).max(1);
            }
        }
        if record.start_requested {
            self.rw.start_if_not_running();
        }
        if record.stop_requested {
            self.rw.request_graceful_stop();
        }
        self.store_status();
        self.handoff.mark_consumed(sequence);
        true
    }

    /// Compute the command that follows `queue_end`.
    ///
    /// The returned state is not committed; call
    /// [`after_command_enqueued`](Self::after_command_enqueued) once the entry
    /// is in the queue.
    pub fn compute_next_command(&mut self, queue_end: &QueueEnd) -> NextCommand {
        if self.take_stop_request(queue_end) {
            return NextCommand::idle(&*self.rw, queue_end);
        }
        self.publish();
        calculator::next_command(&*self.snapshot, &*self.rw, queue_end)
    }

    /// Commit the state of a command that has been enqueued (or of a null
    /// command that ended the motion).
    pub fn after_command_enqueued(&mut self, command: &NextCommand) {
        let next = command.state;
        let changed = self.rw.state != next.state || self.rw.direction != next.direction;
        if self.rw.state != next.state {
            trace!("ramp: {} -> {}", self.rw.state, next.state);
        }
        *self.rw = next;
        if changed {
            self.store_status();
        }
    }

    /// Top up `sink` with commands until it is full or the motion is complete.
    ///
    /// A pending immediate stop is handled even when `sink` is already full.
    /// Returns the number of entries added.
    pub fn fill_queue<S: CommandSink>(&mut self, sink: &mut S) -> usize {
        if self.take_stop_request(&sink.end()) {
            return 0;
        }
        let mut added = 0;
        while !sink.is_full() {
            let command = self.compute_next_command(&sink.end());
            if !command.has_steps() {
                self.after_command_enqueued(&command);
                break;
            }
            if sink.push(command.entry).is_err() {
                warn!("ramp: command rejected by queue");
                break;
            }
            self.after_command_enqueued(&command);
            added += 1;
        }
        added
    }

    /// Request an immediate stop from the real-time side.
    pub fn stop_immediately(&self) {
        self.handoff.request_stop();
    }

    /// Real-time state.
    #[inline]
    pub fn running_state(&self) -> RampRunningState {
        *self.rw
    }

    /// Phase of the profile.
    #[inline]
    pub fn ramp_state(&self) -> RampState {
        self.rw.state
    }

    /// Parameters in effect.
    #[inline]
    pub fn snapshot(&self) -> &RampSnapshot {
        &*self.snapshot
    }

    /// Handle a pending immediate stop. Returns `true` if the motion was
    /// cancelled and the generator is now idle at `queue_end`.
    fn take_stop_request(&mut self, queue_end: &QueueEnd) -> bool {
        match self.handoff.take_stop() {
            None => false,
            Some(true) => {
                // A move was requested after the stop: drop the speed, keep the move.
                self.rw.reset_speed();
                false
            }
            Some(false) => {
                // Parameter edits still take effect; a start they carry is overruled.
                self.publish();
                *self.rw = self.rw.idle_at(queue_end);
                self.store_status();
                true
            }
        }
    }

    fn store_status(&self) {
        self.handoff.store_status(self.rw.state, self.rw.direction);
    }
}
