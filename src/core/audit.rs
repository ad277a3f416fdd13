//! Audit trail of loop and event lifecycle transitions.
//!
//! Sinks receive one record per transition, in the order the loop performs
//! them, which makes completion and finish ordering observable from outside.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::{EventId, LoopId};
use crate::util::clock::now_ms;

/// Lifecycle transition recorded by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Loop pushed on the registry, before its setup action ran.
    LoopStarted,
    /// Event appended to the running set.
    Registered,
    /// Event reported done and moved to the finished queue.
    Completed,
    /// Event's `finish` returned.
    Finished,
    /// Loop drained both collections.
    LoopEnded,
}

/// Audit record structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Loop that performed the transition.
    pub loop_id: LoopId,
    /// Event concerned, absent for loop-level transitions.
    pub event_id: Option<EventId>,
    /// Transition taken.
    pub action: AuditAction,
    /// Iteration counter at the time of the transition (0 during setup).
    pub iteration: u64,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Audit sink abstraction.
pub trait AuditSink {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// Lets a host keep a handle on a sink it gave to a loop.
impl<S: AuditSink> AuditSink for Rc<RefCell<S>> {
    fn record(&mut self, event: AuditEvent) {
        self.borrow_mut().record(event);
    }
}

/// In-memory audit sink with a bounded buffer; the oldest record is dropped
/// on overflow.
#[derive(Debug, Clone)]
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }

    /// Event ids that went through `action`, in recording order.
    pub fn events_with(&self, action: AuditAction) -> Vec<EventId> {
        self.events
            .iter()
            .filter(|e| e.action == action)
            .filter_map(|e| e.event_id)
            .collect()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no record is stored.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Helper to build an audit event from context.
pub fn build_audit_event(
    loop_id: LoopId,
    event_id: Option<EventId>,
    action: AuditAction,
    iteration: u64,
) -> AuditEvent {
    AuditEvent {
        loop_id,
        event_id,
        action,
        iteration,
        created_at_ms: now_ms(),
    }
}
