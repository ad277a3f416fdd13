//! Wall-clock helpers and iteration pacing.

use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch (0 if the clock is before it).
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Enforces a minimum interval between the starts of consecutive iterations.
///
/// The first call to [`Pacer::wait`] never sleeps. Later calls sleep for
/// `max(0, previous_start + interval - now)`.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    last_start: Option<Instant>,
}

impl Pacer {
    /// Pacer enforcing `interval`; a zero interval never sleeps.
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: None,
        }
    }

    /// Pacer that never sleeps.
    pub const fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Configured interval.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// How long an iteration starting at `now` still has to wait.
    pub fn delay_at(&self, now: Instant) -> Duration {
        match self.last_start {
            Some(prev) if !self.interval.is_zero() => {
                (prev + self.interval).saturating_duration_since(now)
            }
            _ => Duration::ZERO,
        }
    }

    /// Block until the next iteration may start, then mark it started.
    /// Returns the time spent sleeping.
    pub fn wait(&mut self) -> Duration {
        let delay = self.delay_at(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.last_start = Some(Instant::now());
        delay
    }
}
