//! Fixed-capacity single-producer/single-consumer command queue.
//!
//! Backed by `heapless::spsc::Queue`, whose read and write indices are each
//! advanced by one side only. One backing slot always stays empty so that a
//! full queue and an empty queue have distinct index states.

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use heapless::spsc::{Consumer, Producer, Queue};

use crate::error::QueueError;

use super::entry::{Direction, QueueEntry};

/// Number of entries the queue holds when full.
pub const QUEUE_LEN: usize = 16;

/// Backing ring: `QUEUE_LEN` usable slots plus the one kept empty.
type Ring = Queue<QueueEntry, { QUEUE_LEN + 1 }>;

/// State at the tail of the queue: where the motor will be once every queued
/// entry has executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueEnd {
    /// Absolute position after all queued entries.
    pub position: i32,
    /// Direction of the last queued stepping entry.
    pub direction: Direction,
}

impl QueueEnd {
    /// Queue end at a given position.
    #[inline]
    pub const fn at(position: i32) -> Self {
        Self {
            position,
            direction: Direction::CountUp,
        }
    }
}

/// Positions at both ends of the queue, shared by the two halves.
///
/// The producer alone advances the end, the consumer alone advances the
/// position. Each is a single atomic so either side can read the other's.
#[derive(Debug)]
struct QueueStatus {
    /// Position after all queued entries.
    end_position: AtomicI32,
    /// Last queued stepping entry ran down.
    end_down: AtomicBool,
    /// Position after all popped entries.
    position: AtomicI32,
}

impl QueueStatus {
    const fn at(position: i32) -> Self {
        Self {
            end_position: AtomicI32::new(position),
            end_down: AtomicBool::new(false),
            position: AtomicI32::new(position),
        }
    }

    fn end(&self) -> QueueEnd {
        let direction = if self.end_down.load(Ordering::Acquire) {
            Direction::CountDown
        } else {
            Direction::CountUp
        };
        QueueEnd {
            position: self.end_position.load(Ordering::Acquire),
            direction,
        }
    }

    fn position(&self) -> i32 {
        self.position.load(Ordering::Acquire)
    }

    fn pushed(&self, entry: &QueueEntry) {
        let end = self.end_position.load(Ordering::Relaxed);
        self.end_position
            .store(end.wrapping_add(entry.displacement()), Ordering::Release);
        if entry.steps > 0 {
            self.end_down
                .store(entry.direction == Direction::CountDown, Ordering::Release);
        }
    }

    fn popped(&self, entry: &QueueEntry) {
        let position = self.position.load(Ordering::Relaxed);
        self.position
            .store(position.wrapping_add(entry.displacement()), Ordering::Release);
    }

    /// Shift both ends so the popped position becomes `position`.
    fn rebase(&self, position: i32) {
        let delta = position.wrapping_sub(self.position());
        let end = self.end_position.load(Ordering::Relaxed);
        self.end_position
            .store(end.wrapping_add(delta), Ordering::Release);
        self.position.store(position, Ordering::Release);
    }
}

/// Producer-side view of a command queue.
pub trait CommandSink {
    /// Append an entry.
    fn push(&mut self, entry: QueueEntry) -> Result<(), QueueError>;

    /// Check if no further entry can be queued.
    fn is_full(&self) -> bool;

    /// State after all queued entries.
    fn end(&self) -> QueueEnd;
}

/// Command queue between the ramp generator (producer) and the pulse
/// emitter (consumer).
pub struct CommandQueue {
    ring: Ring,
    status: QueueStatus,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    /// Create an empty queue at position 0.
    pub const fn new() -> Self {
        Self {
            ring: Queue::new(),
            status: QueueStatus::at(0),
        }
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// `QueueFull`, `TicksOutOfRange` or `StepsOutOfRange`. The queue is left
    /// untouched on error.
    pub fn push(&mut self, entry: QueueEntry) -> Result<(), QueueError> {
        check_entry(&entry, self.ring.is_full())?;
        self.ring.enqueue(entry).map_err(|_| QueueError::QueueFull)?;
        self.status.pushed(&entry);
        Ok(())
    }

    /// Take the oldest entry.
    pub fn pop(&mut self) -> Option<QueueEntry> {
        let entry = self.ring.dequeue()?;
        self.status.popped(&entry);
        Some(entry)
    }

    /// Check if no entry is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Check if no further entry can be queued.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Number of queued entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// State after all queued entries.
    #[inline]
    pub fn end(&self) -> QueueEnd {
        self.status.end()
    }

    /// Position reached once every popped entry has executed.
    #[inline]
    pub fn position(&self) -> i32 {
        self.status.position()
    }

    /// Net displacement of the entries not yet popped.
    #[inline]
    pub fn pending_displacement(&self) -> i32 {
        self.end().position.wrapping_sub(self.position())
    }

    /// Redefine the popped position as `position`. Queued entries keep their
    /// relative displacement, so the end moves by the same amount.
    pub fn set_position(&mut self, position: i32) {
        self.status.rebase(position);
    }

    /// Split into producer and consumer halves for use from two contexts.
    pub fn split(&mut self) -> (CommandProducer<'_>, CommandConsumer<'_>) {
        let (producer, consumer) = self.ring.split();
        (
            CommandProducer {
                inner: producer,
                status: &self.status,
            },
            CommandConsumer {
                inner: consumer,
                status: &self.status,
            },
        )
    }
}

impl fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandQueue")
            .field("len", &self.len())
            .field("end", &self.end())
            .field("position", &self.position())
            .finish()
    }
}

/// Producer half. Owned by the ramp generator side.
pub struct CommandProducer<'a> {
    inner: Producer<'a, QueueEntry, { QUEUE_LEN + 1 }>,
    status: &'a QueueStatus,
}

impl CommandProducer<'_> {
    /// Append an entry. Same contract as [`CommandQueue::push`].
    pub fn push(&mut self, entry: QueueEntry) -> Result<(), QueueError> {
        check_entry(&entry, self.is_full())?;
        self.inner.enqueue(entry).map_err(|_| QueueError::QueueFull)?;
        self.status.pushed(&entry);
        Ok(())
    }

    /// Check if no further entry can be queued.
    #[inline]
    pub fn is_full(&self) -> bool {
        !self.inner.ready()
    }

    /// State after all queued entries.
    #[inline]
    pub fn end(&self) -> QueueEnd {
        self.status.end()
    }
}

/// Consumer half. Owned by the pulse emitter side.
pub struct CommandConsumer<'a> {
    inner: Consumer<'a, QueueEntry, { QUEUE_LEN + 1 }>,
    status: &'a QueueStatus,
}

impl CommandConsumer<'_> {
    /// Take the oldest entry.
    pub fn pop(&mut self) -> Option<QueueEntry> {
        let entry = self.inner.dequeue()?;
        self.status.popped(&entry);
        Some(entry)
    }

    /// Check if no entry is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.inner.ready()
    }

    /// State after all queued entries.
    #[inline]
    pub fn end(&self) -> QueueEnd {
        self.status.end()
    }

    /// Position reached once every popped entry has executed.
    #[inline]
    pub fn position(&self) -> i32 {
        self.status.position()
    }
}

impl CommandSink for CommandQueue {
    fn push(&mut self, entry: QueueEntry) -> Result<(), QueueError> {
        CommandQueue::push(self, entry)
    }

    fn is_full(&self) -> bool {
        CommandQueue::is_full(self)
    }

    fn end(&self) -> QueueEnd {
        CommandQueue::end(self)
    }
}

impl CommandSink for CommandProducer<'_> {
    fn push(&mut self, entry: QueueEntry) -> Result<(), QueueError> {
        CommandProducer::push(self, entry)
    }

    fn is_full(&self) -> bool {
        CommandProducer::is_full(self)
    }

    fn end(&self) -> QueueEnd {
        CommandProducer::end(self)
    }
}

fn check_entry(entry: &QueueEntry, full: bool) -> Result<(), QueueError> {
    if full {
        return Err(QueueError::QueueFull);
    }
    entry.validate()
}
