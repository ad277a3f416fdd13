//! Event that completes after a fixed number of polls.

use crate::core::EventKind;

/// Completes on the N-th poll, where N is the spawn argument.
///
/// A countdown of 0 or 1 completes on its first poll.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    remaining: u32,
    polls: u32,
}

impl Countdown {
    /// Polls received so far.
    pub const fn polls(&self) -> u32 {
        self.polls
    }

    /// Polls left before completion.
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl EventKind for Countdown {
    type Args = u32;

    fn run(&mut self, polls: u32) {
        self.remaining = polls;
        self.polls = 0;
    }

    fn tick(&mut self) -> bool {
        self.polls += 1;
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}
