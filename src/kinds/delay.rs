//! Event that completes once a wall-clock delay has passed.

use std::time::{Duration, Instant};

use crate::core::EventKind;

/// Timer event. The delay starts when the event is spawned, not when it is
/// first polled.
#[derive(Debug, Clone, Default)]
pub struct Delay {
    deadline: Option<Instant>,
}

impl Delay {
    /// Instant at which the delay expires, once started.
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl EventKind for Delay {
    type Args = Duration;

    fn run(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    fn tick(&mut self) -> bool {
        self.deadline.is_none_or(|deadline| Instant::now() >= deadline)
    }

    fn cleanup(&mut self) {
        self.deadline = None;
    }
}
