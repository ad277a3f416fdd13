//! Fluent construction of loops.

use crate::config::LoopConfig;
use crate::core::{AuditSink, EventLoop, LoopError};

/// Builder for [`EventLoop`] runs.
///
/// ```
/// use tickloop::core::EventLoop;
///
/// let event_loop = EventLoop::builder()
///     .duration_ms(0)
///     .name("setup-only")
///     .run(|_| Ok(()))
///     .unwrap();
/// assert_eq!(event_loop.name(), Some("setup-only"));
/// ```
#[derive(Default)]
pub struct LoopBuilder {
    config: LoopConfig,
    audit: Option<Box<dyn AuditSink>>,
}

impl LoopBuilder {
    /// Builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder starting from an existing configuration.
    pub fn from_config(config: LoopConfig) -> Self {
        Self {
            config,
            audit: None,
        }
    }

    /// Minimum milliseconds between iteration starts; `0` disables pacing.
    #[must_use]
    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.config.duration_ms = duration_ms;
        self
    }

    /// Disable pacing.
    #[must_use]
    pub fn unpaced(self) -> Self {
        self.duration_ms(0)
    }

    /// Name the loop.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Record lifecycle transitions to `sink`.
    #[must_use]
    pub fn with_audit(mut self, sink: impl AuditSink + 'static) -> Self {
        self.audit = Some(Box::new(sink));
        self
    }

    /// Configuration accumulated so far.
    pub const fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Run `main` in the configured loop until it drains.
    ///
    /// # Errors
    ///
    /// See [`EventLoop::run`].
    pub fn run<F>(self, main: F) -> Result<EventLoop, LoopError>
    where
        F: FnOnce(&EventLoop) -> Result<(), LoopError>,
    {
        EventLoop::start(self.config, self.audit, main)
    }
}
