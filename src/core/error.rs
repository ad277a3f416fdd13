//! Error types for loop and event operations.

use thiserror::Error;

use super::EventId;

/// Errors produced by the event loop and event construction.
#[derive(Debug, Error)]
pub enum LoopError {
    /// Event construction was given no invocable completion callback.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An event was constructed while no loop is active on this thread.
    #[error("unable to create an event outside an event loop")]
    NoActiveLoop,
    /// The same event was added to a loop twice.
    #[error("event {0} is already registered with this loop")]
    AlreadyRegistered(EventId),
    /// Loop configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Failure raised by host code inside a setup action.
    #[error("setup failed: {0}")]
    Setup(#[from] anyhow::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
///
/// Host code driving loops returns it so [`LoopError`] and its own failures
/// share one `?` path.
pub type AppResult<T> = Result<T, anyhow::Error>;
