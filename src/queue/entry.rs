//! Queue entries handed to the pulse emitter.

use crate::error::QueueError;

/// Largest tick count a single entry may carry (255 timer overflows of 16 bit).
pub const ABSOLUTE_MAX_TICKS: u32 = 255 * 65535;

/// Largest step count a single entry may carry. The high bit is reserved.
pub const MAX_STEPS_PER_COMMAND: u8 = 127;

/// Direction of motion along the position axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Position increases with each step.
    #[default]
    CountUp,
    /// Position decreases with each step.
    CountDown,
}

impl Direction {
    /// Get direction from a signed step count.
    #[inline]
    pub fn from_steps(steps: i64) -> Self {
        if steps >= 0 {
            Direction::CountUp
        } else {
            Direction::CountDown
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Direction::CountUp => 1,
            Direction::CountDown => -1,
        }
    }

    /// Get the opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::CountUp => Direction::CountDown,
            Direction::CountDown => Direction::CountUp,
        }
    }
}

/// One timing command: `steps` pulses spaced `ticks` apart, or a pause of
/// `ticks` when `pause` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueEntry {
    /// Timer ticks between steps (or the pause length).
    pub ticks: u32,
    /// Number of steps, `0..=MAX_STEPS_PER_COMMAND`.
    pub steps: u8,
    /// Direction for all steps of this entry.
    pub direction: Direction,
    /// No pulses, only wait `ticks`.
    pub pause: bool,
}

impl QueueEntry {
    /// Zero-duration, zero-step entry. Signals "nothing to do".
    pub const NULL: Self = Self {
        ticks: 0,
        steps: 0,
        direction: Direction::CountUp,
        pause: false,
    };

    /// Create a stepping entry.
    #[inline]
    pub const fn new(ticks: u32, steps: u8, direction: Direction) -> Self {
        Self {
            ticks,
            steps,
            direction,
            pause: false,
        }
    }

    /// Create a pause entry.
    #[inline]
    pub const fn pause(ticks: u32, direction: Direction) -> Self {
        Self {
            ticks,
            steps: 0,
            direction,
            pause: true,
        }
    }

    /// Check for the null entry.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.ticks == 0 && self.steps == 0
    }

    /// Signed position change caused by this entry.
    #[inline]
    pub fn displacement(&self) -> i32 {
        i32::from(self.steps) * self.direction.sign()
    }

    /// Check the entry against the queue's representable ranges.
    pub fn validate(&self) -> Result<(), QueueError> {
        if self.ticks > ABSOLUTE_MAX_TICKS {
            return Err(QueueError::TicksOutOfRange(self.ticks));
        }
        if self.steps > MAX_STEPS_PER_COMMAND {
            return Err(QueueError::StepsOutOfRange(self.steps));
        }
        Ok(())
    }
}
