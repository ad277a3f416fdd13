//! Tests for audit sink

use tickloop::core::{
    build_audit_event, AuditAction, AuditSink, EventId, EventLoop, InMemoryAuditSink,
};

fn loop_id() -> tickloop::core::LoopId {
    EventLoop::run_default(|_| Ok(())).unwrap().id()
}

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);
    let id = loop_id();

    sink.record(build_audit_event(id, Some(EventId(1)), AuditAction::Registered, 0));
    assert_eq!(sink.len(), 1);

    let events = sink.events();
    assert_eq!(events[0].loop_id, id);
    assert_eq!(events[0].event_id, Some(EventId(1)));
    assert_eq!(events[0].action, AuditAction::Registered);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);
    let id = loop_id();

    sink.record(build_audit_event(id, Some(EventId(1)), AuditAction::Registered, 0));
    sink.record(build_audit_event(id, Some(EventId(2)), AuditAction::Registered, 0));
    sink.record(build_audit_event(id, Some(EventId(3)), AuditAction::Registered, 0));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_id, Some(EventId(2))); // First one popped
    assert_eq!(events[1].event_id, Some(EventId(3)));
}

#[test]
fn test_zero_capacity_sink_stores_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event(loop_id(), None, AuditAction::LoopStarted, 0));
    assert!(sink.is_empty());
}

#[test]
fn test_events_with_filters_by_action() {
    let mut sink = InMemoryAuditSink::new(10);
    let id = loop_id();

    sink.record(build_audit_event(id, None, AuditAction::LoopStarted, 0));
    sink.record(build_audit_event(id, Some(EventId(0)), AuditAction::Completed, 1));
    sink.record(build_audit_event(id, Some(EventId(1)), AuditAction::Completed, 1));
    sink.record(build_audit_event(id, Some(EventId(0)), AuditAction::Finished, 1));

    assert_eq!(
        sink.events_with(AuditAction::Completed),
        vec![EventId(0), EventId(1)]
    );
    assert_eq!(sink.events_with(AuditAction::Finished), vec![EventId(0)]);
}

#[test]
fn test_audit_action_serializes_snake_case() {
    let json = serde_json::to_string(&AuditAction::LoopStarted).unwrap();
    assert_eq!(json, "\"loop_started\"");
}
