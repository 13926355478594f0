//! Blocking pulse emitter over embedded-hal 1.0 pins.
//!
//! Reference consumer of the command queue for hosts without a step timer:
//! every entry is turned into STEP pulses spaced by busy delays.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{MotorError, Result};
use crate::queue::{Direction, QueueEntry};

use super::hal::PulseEmitter;

/// STEP pulse high time in nanoseconds.
const PULSE_WIDTH_NS: u32 = 2_000;

/// Step/direction pulse generator.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider (must implement `DelayNs`)
pub struct StepPulser<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    step_pin: STEP,
    dir_pin: DIR,
    delay: DELAY,

    /// Timer frequency the entry ticks refer to.
    ticks_per_second: u32,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,
}

impl<STEP, DIR, DELAY> StepPulser<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// Create a pulser. DIR is high for [`Direction::CountUp`] unless inverted.
    pub fn new(
        step_pin: STEP,
        dir_pin: DIR,
        delay: DELAY,
        ticks_per_second: u32,
        invert_direction: bool,
    ) -> Self {
        Self {
            step_pin,
            dir_pin,
            delay,
            ticks_per_second: ticks_per_second.max(1),
            invert_direction,
            current_direction: None,
        }
    }

    /// Give the pins and delay back.
    pub fn release(self) -> (STEP, DIR, DELAY) {
        (self.step_pin, self.dir_pin, self.delay)
    }

    /// Convert timer ticks to nanoseconds, saturating.
    pub fn ticks_to_ns(&self, ticks: u32) -> u32 {
        let ns = u64::from(ticks) * 1_000_000_000 / u64::from(self.ticks_per_second);
        u32::try_from(ns).unwrap_or(u32::MAX)
    }

    fn set_direction(&mut self, direction: Direction) -> Result<()> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::CountUp => !self.invert_direction,
            Direction::CountDown => self.invert_direction,
        };

        if pin_high {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }

        self.current_direction = Some(direction);
        Ok(())
    }
}

impl<STEP, DIR, DELAY> PulseEmitter for StepPulser<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    fn emit(&mut self, entry: &QueueEntry) -> Result<()> {
        let interval_ns = self.ticks_to_ns(entry.ticks);

        if entry.pause || entry.steps == 0 {
            self.delay.delay_ns(interval_ns);
            return Ok(());
        }

        self.set_direction(entry.direction)?;

        for _ in 0..entry.steps {
            self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
            self.delay.delay_ns(PULSE_WIDTH_NS);
            self.step_pin.set_low().map_err(|_| MotorError::PinError)?;

            // Remainder of the step period.
            let rest_ns = interval_ns.saturating_sub(PULSE_WIDTH_NS);
            if rest_ns > 0 {
                self.delay.delay_ns(rest_ns);
            }
        }

        Ok(())
    }
}
