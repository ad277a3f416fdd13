//! Loop configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default minimum interval between iteration starts, in milliseconds.
pub const DEFAULT_DURATION_MS: u64 = 100;

/// Largest accepted pacing interval (one hour).
pub const MAX_DURATION_MS: u64 = 60 * 60 * 1000;

/// Environment variable overriding [`LoopConfig::duration_ms`].
pub const ENV_DURATION_MS: &str = "TICKLOOP_DURATION_MS";

/// Environment variable overriding [`LoopConfig::name`].
pub const ENV_NAME: &str = "TICKLOOP_NAME";

/// Loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Minimum milliseconds between the starts of consecutive iterations.
    /// `0` disables pacing.
    pub duration_ms: u64,
    /// Optional name attached to logs, stats, and audit records.
    pub name: Option<String>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            name: None,
        }
    }
}

impl LoopConfig {
    /// Set the pacing interval in milliseconds.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Name the loop.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Disable pacing.
    #[must_use]
    pub fn unpaced(self) -> Self {
        self.with_duration_ms(0)
    }

    /// Pacing interval as a [`Duration`].
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Describes the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.duration_ms > MAX_DURATION_MS {
            return Err(format!(
                "duration_ms must be at most {MAX_DURATION_MS}, got {}",
                self.duration_ms
            ));
        }
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name must not be blank".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate. Missing fields
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// Parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the process environment, loading a `.env`
    /// file first when one exists.
    ///
    /// # Errors
    ///
    /// Unparsable values or validation failure.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, using the
    /// `TICKLOOP_*` keys.
    ///
    /// # Errors
    ///
    /// Unparsable values or validation failure.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_DURATION_MS) {
            cfg.duration_ms = raw
                .trim()
                .parse()
                .map_err(|e| format!("{ENV_DURATION_MS}={raw:?}: {e}"))?;
        }
        if let Some(name) = lookup(ENV_NAME) {
            cfg.name = Some(name);
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
