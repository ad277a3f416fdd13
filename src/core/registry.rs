//! Per-thread stack of active loops.
//!
//! The innermost loop is the implicit registration target for new events.
//! Loops enter through [`enter`] and leave when the returned guard drops, so
//! the stack is restored on every exit path, including unwinding.

use std::cell::RefCell;

use tracing::trace;

use super::EventLoop;

thread_local! {
    /// Active loops on this thread, innermost last.
    static LOOPS: RefCell<Vec<EventLoop>> = const { RefCell::new(Vec::new()) };
}

/// The innermost active loop on this thread, if any.
pub fn current() -> Option<EventLoop> {
    LOOPS.with_borrow(|loops| loops.last().cloned())
}

/// Number of loops currently active on this thread.
pub fn depth() -> usize {
    LOOPS.with_borrow(Vec::len)
}

/// Scope of a loop on the registry. Dropping it pops the loop.
#[must_use = "the loop leaves the registry when the guard drops"]
pub(crate) struct RegistryGuard {
    event_loop: EventLoop,
}

/// Push `event_loop` as the current loop until the guard drops.
pub(crate) fn enter(event_loop: EventLoop) -> RegistryGuard {
    let depth = LOOPS.with_borrow_mut(|loops| {
        loops.push(event_loop.clone());
        loops.len()
    });
    trace!(loop_id = %event_loop.id(), depth, "loop entered registry");
    RegistryGuard { event_loop }
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        let popped = LOOPS.with_borrow_mut(Vec::pop);
        debug_assert!(
            popped.as_ref() == Some(&self.event_loop),
            "registry popped a loop other than the one leaving"
        );
        self.event_loop.deactivate();
        trace!(loop_id = %self.event_loop.id(), depth = depth(), "loop left registry");
    }
}
