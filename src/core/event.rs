//! Event abstractions: the loop-facing capability, the kind contract, and
//! two-phase construction onto a loop.
//!
//! An event is built as a plain value (an [`EventKind`]), then spawned: the
//! spawn registers it with a loop and only afterwards starts its work through
//! [`EventKind::run`]. The loop polls it with `tick` until it reports done and
//! finally calls `finish` exactly once.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use tickloop::config::LoopConfig;
//! use tickloop::core::{spawn, EventLoop};
//! use tickloop::kinds::Countdown;
//!
//! let done = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&done);
//!
//! EventLoop::run(LoopConfig::default().unpaced(), move |_| {
//!     spawn(Countdown::default(), 3, move || flag.set(true))?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert!(done.get());
//! ```

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{EventLoop, LoopError};

/// Identifier of an event within the loop it was registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Completion callback invoked with no arguments when an event finishes.
pub type Completion = Box<dyn FnOnce()>;

/// Capability the loop drives: poll until done, then finish once.
pub trait Event {
    /// Poll the event. `true` means done and ready to finish.
    fn tick(&mut self) -> bool;

    /// Finalize the event. Called by the loop exactly once, after the event
    /// has left the running set.
    fn finish(&mut self);

    /// Detach the completion callback before `finish`.
    ///
    /// The loop invokes the returned callback without holding a borrow of the
    /// event, then calls `finish`. Events that finish entirely inside
    /// `finish` keep the default.
    fn take_completion(&mut self) -> Option<Completion> {
        None
    }
}

/// Shared handle to a type-erased event, as stored by the loop.
pub type EventRef = Rc<RefCell<dyn Event>>;

/// Wrap an event so it can be handed to [`EventLoop::add_event`].
pub fn share<E: Event + 'static>(event: E) -> EventRef {
    Rc::new(RefCell::new(event))
}

/// Contract implemented by each concrete kind of event.
pub trait EventKind: 'static {
    /// Kind-specific construction arguments, consumed by [`EventKind::run`].
    type Args;

    /// Start the work. Called once, right after the event joined its loop.
    fn run(&mut self, args: Self::Args);

    /// Poll the work. `true` means done.
    fn tick(&mut self) -> bool;

    /// Release resources. Runs after the completion callback returned.
    fn cleanup(&mut self) {}
}

/// An event kind paired with its completion callback.
///
/// `finish` invokes the callback and then the kind's [`EventKind::cleanup`].
/// Once finished the task is inert: further `finish` calls do nothing.
pub struct Task<K> {
    kind: K,
    callback: Option<Completion>,
    finished: bool,
    cleaned: bool,
}

impl<K: EventKind> Task<K> {
    /// Pair a kind with its completion callback.
    pub fn new(kind: K, callback: impl FnOnce() + 'static) -> Self {
        Self {
            kind,
            callback: Some(Box::new(callback)),
            finished: false,
            cleaned: false,
        }
    }

    /// The wrapped kind.
    pub const fn kind(&self) -> &K {
        &self.kind
    }

    /// Whether the completion callback has been taken for invocation.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<K: EventKind> Event for Task<K> {
    fn tick(&mut self) -> bool {
        self.kind.tick()
    }

    fn finish(&mut self) {
        if let Some(callback) = self.take_completion() {
            callback();
        }
        if !self.cleaned {
            self.cleaned = true;
            self.kind.cleanup();
        }
    }

    fn take_completion(&mut self) -> Option<Completion> {
        if self.finished {
            return None;
        }
        self.finished = true;
        self.callback.take()
    }
}

impl<K> fmt::Debug for Task<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("kind", &std::any::type_name::<K>())
            .field("finished", &self.finished)
            .finish()
    }
}

/// Read-only handle to a spawned event, returned to the spawner.
pub struct EventHandle<K> {
    id: EventId,
    task: Rc<RefCell<Task<K>>>,
}

impl<K: EventKind> EventHandle<K> {
    /// Identifier assigned by the loop.
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// Whether the event has been finished by its loop.
    ///
    /// Already `true` inside the event's own completion callback.
    pub fn is_finished(&self) -> bool {
        self.task.borrow().is_finished()
    }

    /// Borrow the kind to inspect its state.
    ///
    /// # Panics
    ///
    /// Panics if called from inside the event's own `tick`, `run` or `cleanup`.
    /// The completion callback runs unborrowed and may call it.
    pub fn kind(&self) -> Ref<'_, K> {
        Ref::map(self.task.borrow(), Task::kind)
    }
}

impl<K> Clone for EventHandle<K> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            task: Rc::clone(&self.task),
        }
    }
}

impl<K> fmt::Debug for EventHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandle").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Spawn an event on the current loop of this thread.
///
/// # Errors
///
/// Returns [`LoopError::NoActiveLoop`] when no loop is active. Nothing is
/// registered and `run` is not called in that case.
pub fn spawn<K: EventKind>(
    kind: K,
    args: K::Args,
    callback: impl FnOnce() + 'static,
) -> Result<EventHandle<K>, LoopError> {
    let event_loop = EventLoop::current().ok_or(LoopError::NoActiveLoop)?;
    spawn_in(&event_loop, kind, args, callback)
}

/// Spawn an event on an explicit loop: register it, then start its work.
///
/// # Errors
///
/// [`LoopError::NoActiveLoop`] when `event_loop` already terminated. Nothing
/// is registered and `run` is not called in that case. Other registration
/// failures propagate from [`EventLoop::add_event`].
pub fn spawn_in<K: EventKind>(
    event_loop: &EventLoop,
    kind: K,
    args: K::Args,
    callback: impl FnOnce() + 'static,
) -> Result<EventHandle<K>, LoopError> {
    if !event_loop.is_active() {
        return Err(LoopError::NoActiveLoop);
    }

    let task = Rc::new(RefCell::new(Task::new(kind, callback)));
    let erased: EventRef = Rc::clone(&task) as EventRef;
    let id = event_loop.add_event(erased)?;

    task.borrow_mut().kind.run(args);

    Ok(EventHandle { id, task })
}

/// Step-by-step construction of an event, validating the callback before
/// anything touches a loop.
pub struct EventBuilder<K: EventKind> {
    kind: K,
    args: K::Args,
    callback: Option<Completion>,
}

impl<K: EventKind> EventBuilder<K> {
    /// Start building an event of `kind` with its construction arguments.
    pub fn new(kind: K, args: K::Args) -> Self {
        Self {
            kind,
            args,
            callback: None,
        }
    }

    /// Set the completion callback.
    #[must_use]
    pub fn on_finish(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Set or clear the completion callback.
    #[must_use]
    pub fn with_callback(mut self, callback: Option<Completion>) -> Self {
        self.callback = callback;
        self
    }

    /// Spawn on the current loop.
    ///
    /// # Errors
    ///
    /// [`LoopError::InvalidArgument`] without a callback, then
    /// [`LoopError::NoActiveLoop`] when no loop is active.
    pub fn spawn(self) -> Result<EventHandle<K>, LoopError> {
        let callback = Self::require(self.callback)?;
        spawn(self.kind, self.args, callback)
    }

    /// Spawn on an explicit loop.
    ///
    /// # Errors
    ///
    /// [`LoopError::InvalidArgument`] without a callback, then
    /// [`LoopError::NoActiveLoop`] when `event_loop` already terminated.
    pub fn spawn_in(self, event_loop: &EventLoop) -> Result<EventHandle<K>, LoopError> {
        let callback = Self::require(self.callback)?;
        spawn_in(event_loop, self.kind, self.args, callback)
    }

    fn require(callback: Option<Completion>) -> Result<Completion, LoopError> {
        callback.ok_or_else(|| {
            LoopError::InvalidArgument("expected a completion callback".into())
        })
    }
}
