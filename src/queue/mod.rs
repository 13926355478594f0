//! Command queue module for stepper-ramp.
//!
//! Provides the step command record and the lock-free queue that carries it
//! from the ramp generator to the pulse emitter.

mod command_queue;
mod entry;

pub use command_queue::{
    CommandConsumer, CommandProducer, CommandQueue, CommandSink, QueueEnd, QUEUE_LEN,
};
pub use entry::{Direction, QueueEntry, ABSOLUTE_MAX_TICKS, MAX_STEPS_PER_COMMAND};
