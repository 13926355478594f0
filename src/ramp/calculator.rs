//! Next-command computation.
//!
//! Pure function of the snapshot, the running state and the queue end. Runs in
//! constant time with additions, shifts, comparisons and table lookups only.

use crate::queue::{Direction, QueueEnd, QueueEntry};

use super::parameters::RampSnapshot;
use super::state::{NextCommand, RampRunningState, RampState};

/// What the ramp is heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Goal {
    /// Come to rest, ramping down whatever speed is left.
    Stop,
    /// Travel in `direction`. `headroom` is the distance left before the
    /// deceleration has to begin, `None` in keep-running mode.
    Travel {
        direction: Direction,
        headroom: Option<u32>,
    },
}

fn goal(ro: &RampSnapshot, rw: &RampRunningState, position: i32) -> Goal {
    let params = ro.parameters();
    let ramp_up_steps = rw.ramp_up_steps;

    if rw.graceful_stop {
        return Goal::Stop;
    }

    if params.keep_running() {
        let direction = params.keep_running_direction();
        if ramp_up_steps > 0 && direction != rw.direction {
            return Goal::Stop;
        }
        return Goal::Travel {
            direction,
            headroom: None,
        };
    }

    let remaining = i64::from(params.target_position()) - i64::from(position);
    if remaining == 0 {
        return Goal::Stop;
    }
    let direction = Direction::from_steps(remaining);
    if ramp_up_steps > 0 && direction != rw.direction {
        // Wrong way: stop first, the reversal starts from rest.
        return Goal::Stop;
    }
    let distance = u32::try_from(remaining.unsigned_abs()).unwrap_or(u32::MAX);
    if distance <= ramp_up_steps {
        return Goal::Stop;
    }
    Goal::Travel {
        direction,
        headroom: Some(distance - ramp_up_steps),
    }
}

/// Compute the command following `queue_end`.
///
/// Returns [`QueueEntry::NULL`] with an idle state when the generator is
/// inactive or the motion is complete.
pub(crate) fn next_command(
    ro: &RampSnapshot,
    rw: &RampRunningState,
    queue_end: &QueueEnd,
) -> NextCommand {
    if !rw.is_active() {
        return NextCommand::idle(rw, queue_end);
    }

    let n = rw.ramp_up_steps;
    let n_max = ro.max_ramp_up_steps();
    let batch = ro.steps_per_command(rw.curr_ticks, n);

    let (state, direction, steps, n_next, ticks) = match goal(ro, rw, queue_end.position) {
        Goal::Stop => {
            if n == 0 {
                return NextCommand::idle(rw, queue_end);
            }
            let steps = batch.min(n);
            (RampState::Decelerating, rw.direction, steps, n - steps, ro.braking_ticks_at(n))
        }
        Goal::Travel {
            direction,
            headroom,
        } => {
            if n > n_max {
                // Speed limit was lowered.
                let steps = batch.min(n - n_max);
                (RampState::Decelerating, direction, steps, n - steps, ro.braking_ticks_at(n))
            } else if n < n_max && headroom.map_or(true, |h| h >= 2) {
                // Every step gained must be given back, so only half the
                // headroom is usable for speeding up.
                let mut steps = batch.min(n_max - n);
                if let Some(h) = headroom {
                    steps = steps.min(h / 2);
                }
                (RampState::Accelerating, direction, steps, n + steps, ro.ticks_at(n + steps))
            } else {
                let steps = headroom.map_or(batch, |h| batch.min(h));
                let ticks = if n >= n_max {
                    ro.min_travel_ticks()
                } else {
                    ro.ticks_at(n)
                };
                (RampState::Coasting, direction, steps, n, ticks)
            }
        }
    };

    // `steps` is bounded by the batch size, which never exceeds MAX_STEPS_PER_COMMAND.
    let steps = u8::try_from(steps).unwrap_or(u8::MAX);
    let entry = QueueEntry::new(ticks, steps, direction);

    let next = RampRunningState {
        state,
        direction,
        ramp_up_steps: n_next,
        curr_ticks: ticks,
        position: queue_end.position.wrapping_add(entry.displacement()),
        graceful_stop: rw.graceful_stop,
    };

    NextCommand { entry, state: next }
}
