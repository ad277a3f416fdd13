//! Event driven by a closure.

use std::fmt;

use crate::core::EventKind;

/// Completes when the wrapped closure returns `true`.
pub struct PollFn<F> {
    poll: F,
}

/// Wrap `poll` as an event kind.
pub const fn poll_fn<F>(poll: F) -> PollFn<F>
where
    F: FnMut() -> bool + 'static,
{
    PollFn { poll }
}

impl<F> EventKind for PollFn<F>
where
    F: FnMut() -> bool + 'static,
{
    type Args = ();

    fn run(&mut self, (): ()) {}

    fn tick(&mut self) -> bool {
        (self.poll)()
    }
}

impl<F> fmt::Debug for PollFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollFn").finish_non_exhaustive()
    }
}
