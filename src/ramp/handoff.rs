//! Lock-free exchange between the application and the real-time side.
//!
//! The application side writes a complete [`RampParameters`] record under a
//! sequence counter. The real-time side copies it out and keeps it only if
//! the counter did not move meanwhile, so a record is taken over as a unit or
//! not at all. The real-time side reports its phase back through a status
//! byte. All fields are atomics that are only loaded and stored, which keeps
//! the block usable on cores without compare-and-swap.

use core::sync::atomic::{fence, AtomicBool, AtomicI32, AtomicU32, AtomicU8, Ordering};

use crate::queue::Direction;

use super::parameters::RampParameters;
use super::state::RampState;

const KEEP_RUNNING: u8 = 1 << 0;
const KEEP_RUNNING_DOWN: u8 = 1 << 1;
const START: u8 = 1 << 2;
const STOP: u8 = 1 << 3;
const DIRTY: u8 = 1 << 4;

const STATUS_PHASE: u8 = 0b011;
const STATUS_DOWN: u8 = 0b100;

/// State shared by [`RampControl`](super::RampControl) and
/// [`RampFeeder`](super::RampFeeder).
#[derive(Debug)]
pub struct RampHandoff {
    /// Odd while a record is being written.
    sequence: AtomicU32,
    /// Sequence of the last record the real-time side took over.
    consumed: AtomicU32,
    target_position: AtomicI32,
    /// 0 when unset.
    acceleration: AtomicU32,
    /// 0 when unset.
    min_travel_ticks: AtomicU32,
    flags: AtomicU8,
    status: AtomicU8,
    force_stop: AtomicBool,
    incomplete_stop: AtomicBool,
}

impl Default for RampHandoff {
    fn default() -> Self {
        Self::new()
    }
}

impl RampHandoff {
    /// Empty block: nothing published, generator idle.
    pub const fn new() -> Self {
        Self {
            sequence: AtomicU32::new(0),
            consumed: AtomicU32::new(0),
            target_position: AtomicI32::new(0),
            acceleration: AtomicU32::new(0),
            min_travel_ticks: AtomicU32::new(0),
            flags: AtomicU8::new(0),
            status: AtomicU8::new(0),
            force_stop: AtomicBool::new(false),
            incomplete_stop: AtomicBool::new(false),
        }
    }

    // Parameter record

    /// Write `record`. Only the application side writes.
    pub(crate) fn publish(&self, record: &RampParameters) {
        let sequence = self.sequence.load(Ordering::Relaxed);
        self.sequence.store(sequence.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        self.target_position
            .store(record.target_position, Ordering::Relaxed);
        self.acceleration
            .store(record.acceleration.unwrap_or(0), Ordering::Relaxed);
        self.min_travel_ticks
            .store(record.min_travel_ticks.unwrap_or(0), Ordering::Relaxed);
        self.flags.store(encode_flags(record), Ordering::Relaxed);

        self.sequence
            .store(sequence.wrapping_add(2), Ordering::Release);
    }

    /// Copy out a record that has not been taken over yet.
    ///
    /// `None` if there is nothing new or the record is being rewritten; the
    /// caller tries again on its next round.
    pub(crate) fn take(&self) -> Option<(u32, RampParameters)> {
        let sequence = self.sequence.load(Ordering::Acquire);
        if sequence & 1 == 1 || sequence == self.consumed.load(Ordering::Relaxed) {
            return None;
        }

        let flags = self.flags.load(Ordering::Relaxed);
        let mut record = RampParameters::new();
        record.target_position = self.target_position.load(Ordering::Relaxed);
        record.acceleration = non_zero(self.acceleration.load(Ordering::Relaxed));
        record.min_travel_ticks = non_zero(self.min_travel_ticks.load(Ordering::Relaxed));
        record.keep_running = flags & KEEP_RUNNING != 0;
        record.keep_running_direction = if flags & KEEP_RUNNING_DOWN != 0 {
            Direction::CountDown
        } else {
            Direction::CountUp
        };
        record.start_requested = flags & START != 0;
        record.stop_requested = flags & STOP != 0;
        record.dirty = flags & DIRTY != 0;

        fence(Ordering::Acquire);
        if self.sequence.load(Ordering::Relaxed) != sequence {
            return None;
        }
        Some((sequence, record))
    }

    /// Acknowledge the record with `sequence`.
    pub(crate) fn mark_consumed(&self, sequence: u32) {
        self.consumed.store(sequence, Ordering::Release);
    }

    /// Acknowledge whatever has been published, without taking it over.
    pub(crate) fn discard_pending(&self) {
        let sequence = self.sequence.load(Ordering::Acquire);
        if sequence & 1 == 0 {
            self.consumed.store(sequence, Ordering::Release);
        }
    }

    /// Check if the last published record has been taken over.
    pub(crate) fn is_consumed(&self) -> bool {
        self.consumed.load(Ordering::Acquire) == self.sequence.load(Ordering::Relaxed)
    }

    // Real-time status

    pub(crate) fn store_status(&self, state: RampState, direction: Direction) {
        let phase = match state {
            RampState::Idle => 0,
            RampState::Accelerating => 1,
            RampState::Coasting => 2,
            RampState::Decelerating => 3,
        };
        let down = if direction == Direction::CountDown {
            STATUS_DOWN
        } else {
            0
        };
        self.status.store(phase | down, Ordering::Release);
    }

    pub(crate) fn status(&self) -> (RampState, Direction) {
        let status = self.status.load(Ordering::Acquire);
        let state = match status & STATUS_PHASE {
            0 => RampState::Idle,
            1 => RampState::Accelerating,
            2 => RampState::Coasting,
            _ => RampState::Decelerating,
        };
        let direction = if status & STATUS_DOWN != 0 {
            Direction::CountDown
        } else {
            Direction::CountUp
        };
        (state, direction)
    }

    // Immediate stop

    /// Raise an immediate stop. A move requested before this call is void.
    pub(crate) fn request_stop(&self) {
        self.incomplete_stop.store(false, Ordering::Release);
        self.force_stop.store(true, Ordering::Release);
    }

    pub(crate) fn is_stop_pending(&self) -> bool {
        self.force_stop.load(Ordering::Acquire)
    }

    /// Record that a move was requested after a still pending stop.
    pub(crate) fn mark_incomplete_stop(&self) {
        if self.is_stop_pending() {
            self.incomplete_stop.store(true, Ordering::Release);
        }
    }

    /// Take a pending stop. `Some(true)` if a move was requested after it.
    pub(crate) fn take_stop(&self) -> Option<bool> {
        if !self.force_stop.load(Ordering::Acquire) {
            return None;
        }
        self.force_stop.store(false, Ordering::Release);
        let incomplete = self.incomplete_stop.load(Ordering::Acquire);
        self.incomplete_stop.store(false, Ordering::Release);
        Some(incomplete)
    }
}

fn encode_flags(record: &RampParameters) -> u8 {
    let mut flags = 0;
    if record.keep_running {
        flags |= KEEP_RUNNING;
    }
    if record.keep_running_direction == Direction::CountDown {
        flags |= KEEP_RUNNING_DOWN;
    }
    if record.start_requested {
        flags |= START;
    }
    if record.stop_requested {
        flags |= STOP;
    }
    if record.dirty {
        flags |= DIRTY;
    }
    flags
}

fn non_zero(value: u32) -> Option<u32> {
    (value != 0).then_some(value)
}
