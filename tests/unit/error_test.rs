//! Tests for error types

use tickloop::core::{spawn, AppResult, EventId, LoopError};
use tickloop::kinds::Countdown;

#[test]
fn test_invalid_argument_error() {
    let err = LoopError::InvalidArgument("expected a completion callback".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid argument: expected a completion callback"
    );
}

#[test]
fn test_no_active_loop_error() {
    let err = LoopError::NoActiveLoop;
    assert_eq!(
        format!("{}", err),
        "unable to create an event outside an event loop"
    );
}

#[test]
fn test_already_registered_error() {
    let err = LoopError::AlreadyRegistered(EventId(3));
    assert_eq!(format!("{}", err), "event #3 is already registered with this loop");
}

#[test]
fn test_invalid_config_error() {
    let err = LoopError::InvalidConfig("duration_ms too large".to_string());
    assert_eq!(format!("{}", err), "invalid configuration: duration_ms too large");
}

#[test]
fn test_setup_error_from_anyhow() {
    let err: LoopError = anyhow::anyhow!("connection failed").into();
    assert_eq!(format!("{}", err), "setup failed: connection failed");
}

#[test]
fn test_loop_error_propagates_into_app_result() {
    fn host() -> AppResult<u64> {
        spawn(Countdown::default(), 1, || {})?;
        Ok(0)
    }

    let err = host().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LoopError>(),
        Some(LoopError::NoActiveLoop)
    ));
}
