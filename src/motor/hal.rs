//! Hardware access injected into the stepper.

use crate::error::Result;
use crate::queue::QueueEntry;

/// Short mutual exclusion against the real-time context.
///
/// On a microcontroller this masks the interrupt that refills or drains the
/// command queue for the duration of `f`.
pub trait CriticalSection {
    /// Run `f` with the real-time context held off.
    fn with<R>(&self, f: impl FnOnce() -> R) -> R;
}

/// Critical section for single-context use (host builds, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInterrupts;

impl CriticalSection for NoInterrupts {
    #[inline]
    fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        f()
    }
}

/// Consumer of queue entries: turns them into step pulses.
pub trait PulseEmitter {
    /// Execute one entry.
    fn emit(&mut self, entry: &QueueEntry) -> Result<()>;
}

impl<T: PulseEmitter + ?Sized> PulseEmitter for &mut T {
    fn emit(&mut self, entry: &QueueEntry) -> Result<()> {
        (**self).emit(entry)
    }
}
