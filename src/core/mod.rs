//! Core scheduling abstractions: events, the loop, and the loop registry.

pub mod audit;
pub mod error;
pub mod event;
pub mod event_loop;
pub mod registry;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use error::{AppResult, LoopError};
pub use event::{
    share, spawn, spawn_in, Completion, Event, EventBuilder, EventHandle, EventId, EventKind,
    EventRef, Task,
};
pub use event_loop::{EventLoop, LoopId, LoopStats};
