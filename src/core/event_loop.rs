//! The run-to-completion loop.
//!
//! A loop owns an ordered running set and a FIFO of events that reported done
//! but have not been finished yet. Each iteration:
//!
//! 1. waits out the pacing interval (never before the first iteration),
//! 2. polls a snapshot of the running set in insertion order, moving every
//!    event that reports done to the tail of the finished queue,
//! 3. finishes at most one event from the head of the finished queue.
//!
//! The loop ends once both collections are empty. Finishing only one event
//! per iteration interleaves callbacks with polling, so a callback that
//! spawns more work (or a nested loop) never starves the rest.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::builders::LoopBuilder;
use crate::config::LoopConfig;
use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::registry;
use crate::core::{EventId, EventRef, LoopError};
use crate::util::clock::Pacer;

/// Unique identifier of a loop instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoopId(Uuid);

impl LoopId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a loop's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopStats {
    /// Loop identifier.
    pub loop_id: LoopId,
    /// Optional loop name from configuration.
    pub name: Option<String>,
    /// Completed iterations (each one tick phase plus one finish phase).
    pub iterations: u64,
    /// Total `tick` calls across all events.
    pub polls: u64,
    /// Events added to the loop.
    pub registered: u64,
    /// Events whose `finish` ran.
    pub finished: u64,
    /// Wall-clock time spent iterating.
    pub elapsed: Duration,
}

#[derive(Clone)]
struct Entry {
    id: EventId,
    event: EventRef,
}

impl Entry {
    fn address(&self) -> *const () {
        address_of(&self.event)
    }
}

fn address_of(event: &EventRef) -> *const () {
    Rc::as_ptr(event).cast::<()>()
}

#[derive(Default)]
struct LoopCounters {
    iterations: Cell<u64>,
    polls: Cell<u64>,
    registered: Cell<u64>,
    finished: Cell<u64>,
    elapsed: Cell<Duration>,
}

impl LoopCounters {
    fn bump(cell: &Cell<u64>) {
        cell.set(cell.get() + 1);
    }
}

struct LoopCore {
    id: LoopId,
    config: LoopConfig,
    running: RefCell<Vec<Entry>>,
    finished: RefCell<VecDeque<Entry>>,
    // Registered events by allocation, for double-add detection.
    members: RefCell<HashMap<*const (), EventId>>,
    next_event_id: Cell<u64>,
    active: Cell<bool>,
    counters: LoopCounters,
    audit: RefCell<Option<Box<dyn AuditSink>>>,
}

/// Handle to an event loop.
///
/// Handles are cheap to clone and compare equal when they refer to the same
/// loop. Loops are single-threaded: a handle never leaves its thread.
#[derive(Clone)]
pub struct EventLoop {
    inner: Rc<LoopCore>,
}

impl PartialEq for EventLoop {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for EventLoop {}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("id", &self.inner.id)
            .field("name", &self.inner.config.name)
            .field("active", &self.inner.active.get())
            .field("running", &self.running_len())
            .field("finished", &self.finished_len())
            .finish()
    }
}

impl EventLoop {
    /// Run `main` inside a new loop and iterate until every event finished.
    ///
    /// The loop is the current loop while `main` and every iteration run. The
    /// call returns only after the whole cycle, including nested loops, is
    /// drained. The returned handle is no longer active.
    ///
    /// # Errors
    ///
    /// [`LoopError::InvalidConfig`] when `config` fails validation, or any
    /// error returned by `main` (the loop does not iterate in that case).
    pub fn run<F>(config: LoopConfig, main: F) -> Result<Self, LoopError>
    where
        F: FnOnce(&Self) -> Result<(), LoopError>,
    {
        LoopBuilder::from_config(config).run(main)
    }

    /// [`EventLoop::run`] with the default configuration (100 ms pacing).
    ///
    /// # Errors
    ///
    /// Any error returned by `main`.
    pub fn run_default<F>(main: F) -> Result<Self, LoopError>
    where
        F: FnOnce(&Self) -> Result<(), LoopError>,
    {
        Self::run(LoopConfig::default(), main)
    }

    /// Start configuring a loop.
    pub fn builder() -> LoopBuilder {
        LoopBuilder::new()
    }

    /// The innermost active loop on this thread.
    pub fn current() -> Option<Self> {
        registry::current()
    }

    pub(crate) fn start<F>(
        config: LoopConfig,
        audit: Option<Box<dyn AuditSink>>,
        main: F,
    ) -> Result<Self, LoopError>
    where
        F: FnOnce(&Self) -> Result<(), LoopError>,
    {
        config.validate().map_err(LoopError::InvalidConfig)?;

        let event_loop = Self {
            inner: Rc::new(LoopCore {
                id: LoopId::new(),
                config,
                running: RefCell::new(Vec::new()),
                finished: RefCell::new(VecDeque::new()),
                members: RefCell::new(HashMap::new()),
                next_event_id: Cell::new(0),
                active: Cell::new(true),
                counters: LoopCounters::default(),
                audit: RefCell::new(audit),
            }),
        };

        {
            let _scope = registry::enter(event_loop.clone());
            event_loop.record(AuditAction::LoopStarted, None);
            debug!(
                loop_id = %event_loop.id(),
                loop_name = event_loop.name().unwrap_or_default(),
                duration_ms = event_loop.inner.config.duration_ms,
                depth = registry::depth(),
                "event loop started"
            );

            main(&event_loop)?;
            event_loop.drive();
            event_loop.record(AuditAction::LoopEnded, None);
        }

        let stats = event_loop.stats();
        debug!(
            loop_id = %stats.loop_id,
            iterations = stats.iterations,
            polls = stats.polls,
            finished = stats.finished,
            elapsed_ms = u64::try_from(stats.elapsed.as_millis()).unwrap_or(u64::MAX),
            "event loop ended"
        );

        Ok(event_loop)
    }

    /// Append an event to the running set.
    ///
    /// # Errors
    ///
    /// [`LoopError::NoActiveLoop`] once the loop has terminated, since it
    /// would never poll the event. [`LoopError::AlreadyRegistered`] when the
    /// same event is already running or waiting to be finished on this loop.
    pub fn add_event(&self, event: EventRef) -> Result<EventId, LoopError> {
        if !self.is_active() {
            return Err(LoopError::NoActiveLoop);
        }
        if let Some(existing) = self.find(&event) {
            return Err(LoopError::AlreadyRegistered(existing));
        }

        let id = EventId(self.inner.next_event_id.get());
        self.inner.next_event_id.set(id.0 + 1);
        self.inner.members.borrow_mut().insert(address_of(&event), id);
        self.inner.running.borrow_mut().push(Entry { id, event });
        LoopCounters::bump(&self.inner.counters.registered);

        self.record(AuditAction::Registered, Some(id));
        trace!(loop_id = %self.id(), event_id = %id, "event registered");
        Ok(id)
    }

    /// Loop identifier.
    pub fn id(&self) -> LoopId {
        self.inner.id
    }

    /// Optional name from configuration.
    pub fn name(&self) -> Option<&str> {
        self.inner.config.name.as_deref()
    }

    /// Configuration the loop was started with.
    pub fn config(&self) -> &LoopConfig {
        &self.inner.config
    }

    /// Whether the loop is still on the registry.
    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// Events still being polled.
    pub fn running_len(&self) -> usize {
        self.inner.running.borrow().len()
    }

    /// Events done but not yet finished.
    pub fn finished_len(&self) -> usize {
        self.inner.finished.borrow().len()
    }

    /// Snapshot of the loop counters.
    pub fn stats(&self) -> LoopStats {
        let counters = &self.inner.counters;
        LoopStats {
            loop_id: self.inner.id,
            name: self.inner.config.name.clone(),
            iterations: counters.iterations.get(),
            polls: counters.polls.get(),
            registered: counters.registered.get(),
            finished: counters.finished.get(),
            elapsed: counters.elapsed.get(),
        }
    }

    pub(crate) fn deactivate(&self) {
        self.inner.active.set(false);
    }

    fn is_drained(&self) -> bool {
        self.inner.running.borrow().is_empty() && self.inner.finished.borrow().is_empty()
    }

    fn drive(&self) {
        let started = Instant::now();
        let mut pacer = Pacer::new(self.inner.config.duration());

        while !self.is_drained() {
            let slept = pacer.wait();
            LoopCounters::bump(&self.inner.counters.iterations);
            trace!(
                loop_id = %self.id(),
                iteration = self.inner.counters.iterations.get(),
                slept_us = u64::try_from(slept.as_micros()).unwrap_or(u64::MAX),
                running = self.running_len(),
                "iteration"
            );

            self.tick_phase();
            self.finish_phase();
        }

        self.inner.counters.elapsed.set(started.elapsed());
    }

    /// Poll every event that was running when the phase began, once, in order.
    ///
    /// Completed events join the finished queue as they are detected and
    /// leave the running set in a single pass once the phase ends.
    fn tick_phase(&self) {
        let snapshot: Vec<Entry> = self.inner.running.borrow().clone();
        let mut done_ids = Vec::new();

        for entry in snapshot {
            let done = entry.event.borrow_mut().tick();
            LoopCounters::bump(&self.inner.counters.polls);

            if done {
                done_ids.push(entry.id);
                self.record(AuditAction::Completed, Some(entry.id));
                trace!(loop_id = %self.id(), event_id = %entry.id, "event completed");
                self.inner.finished.borrow_mut().push_back(entry);
            }
        }

        if !done_ids.is_empty() {
            // Ids grow with insertion order, so the snapshot yields them sorted.
            self.inner
                .running
                .borrow_mut()
                .retain(|e| done_ids.binary_search(&e.id).is_err());
        }
    }

    /// Finish the oldest completed event, if any.
    fn finish_phase(&self) {
        let next = self.inner.finished.borrow_mut().pop_front();
        let Some(entry) = next else {
            return;
        };

        trace!(loop_id = %self.id(), event_id = %entry.id, "finishing event");
        self.inner.members.borrow_mut().remove(&entry.address());

        // The callback runs with the event unborrowed so it may inspect it.
        let completion = entry.event.borrow_mut().take_completion();
        if let Some(callback) = completion {
            callback();
        }
        entry.event.borrow_mut().finish();
        LoopCounters::bump(&self.inner.counters.finished);
        self.record(AuditAction::Finished, Some(entry.id));
    }

    fn find(&self, event: &EventRef) -> Option<EventId> {
        self.inner.members.borrow().get(&address_of(event)).copied()
    }

    fn record(&self, action: AuditAction, event_id: Option<EventId>) {
        if let Some(sink) = self.inner.audit.borrow_mut().as_mut() {
            sink.record(build_audit_event(
                self.inner.id,
                event_id,
                action,
                self.inner.counters.iterations.get(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{share, spawn, spawn_in, Event};

    struct Flip {
        polls: u32,
        finished: u32,
    }

    impl Event for Flip {
        fn tick(&mut self) -> bool {
            self.polls += 1;
            self.polls >= 2
        }

        fn finish(&mut self) {
            self.finished += 1;
        }
    }

    #[test]
    fn test_loop_ids_are_unique() {
        assert_ne!(LoopId::new(), LoopId::new());
    }

    #[test]
    fn test_empty_loop_runs_zero_iterations() {
        let event_loop = EventLoop::run_default(|_| Ok(())).unwrap();
        assert_eq!(event_loop.stats().iterations, 0);
        assert!(!event_loop.is_active());
    }

    #[test]
    fn test_double_add_is_rejected() {
        EventLoop::run(LoopConfig::default().unpaced(), |event_loop| {
            let event = share(Flip { polls: 0, finished: 0 });
            let id = event_loop.add_event(Rc::clone(&event))?;
            let err = event_loop.add_event(event).unwrap_err();
            assert!(matches!(err, LoopError::AlreadyRegistered(existing) if existing == id));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_shared_event_finishes_once() {
        let event = Rc::new(RefCell::new(Flip { polls: 0, finished: 0 }));
        let erased: EventRef = Rc::clone(&event) as EventRef;

        let event_loop = EventLoop::run(LoopConfig::default().unpaced(), move |event_loop| {
            event_loop.add_event(erased)?;
            Ok(())
        })
        .unwrap();

        assert_eq!(event.borrow().polls, 2);
        assert_eq!(event.borrow().finished, 1);
        assert_eq!(event_loop.stats().iterations, 2);
        assert_eq!(event_loop.running_len(), 0);
        assert_eq!(event_loop.finished_len(), 0);
    }

    #[test]
    fn test_terminated_loop_rejects_events() {
        let event_loop = EventLoop::run(LoopConfig::default().unpaced(), |_| Ok(())).unwrap();
        let event = Rc::new(RefCell::new(Flip { polls: 0, finished: 0 }));

        let err = event_loop.add_event(Rc::clone(&event) as EventRef).unwrap_err();
        assert!(matches!(err, LoopError::NoActiveLoop));
        assert_eq!(event_loop.running_len(), 0);
        assert_eq!(event_loop.stats().registered, 0);
        assert_eq!(event.borrow().polls, 0);
    }

    #[test]
    fn test_finished_event_can_be_added_again() {
        let event = Rc::new(RefCell::new(Flip { polls: 0, finished: 0 }));
        let erased: EventRef = Rc::clone(&event) as EventRef;

        let event_loop = EventLoop::run(LoopConfig::default().unpaced(), move |event_loop| {
            event_loop.add_event(Rc::clone(&erased))?;
            let again = Rc::clone(&erased);
            let target = event_loop.clone();
            spawn_in(event_loop, crate::kinds::Countdown::default(), 4, move || {
                target.add_event(again).unwrap();
            })?;
            Ok(())
        })
        .unwrap();

        // Flip keeps counting polls, so the second registration completes on its next tick.
        assert_eq!(event.borrow().finished, 2);
        assert_eq!(event_loop.stats().registered, 3);
    }

    #[test]
    fn test_bulk_completion_keeps_detection_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let event_loop = EventLoop::run(LoopConfig::default().unpaced(), |_| {
            for index in 0..50_u32 {
                let order = Rc::clone(&order);
                let polls = 1 + index % 3;
                spawn(crate::kinds::Countdown::default(), polls, move || {
                    order.borrow_mut().push(index);
                })?;
            }
            Ok(())
        })
        .unwrap();

        let order = order.borrow();
        let mut expected: Vec<u32> = (0..50).collect();
        expected.sort_by_key(|index| index % 3);
        assert_eq!(*order, expected);
        assert_eq!(event_loop.running_len(), 0);
        assert_eq!(event_loop.stats().finished, 50);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_registry() {
        let err = EventLoop::run(LoopConfig::default().with_duration_ms(u64::MAX), |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, LoopError::InvalidConfig(_)));
        assert!(EventLoop::current().is_none());
    }
}
