//! Tracing setup for hosts and tests.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `tickloop=trace`.
pub const LOG_ENV: &str = "TICKLOOP_LOG";

/// Install a fmt subscriber filtered by `TICKLOOP_LOG`, falling back to
/// `warn`. Does nothing when a subscriber is already set.
pub fn init_tracing() {
    init_tracing_with("warn");
}

/// Like [`init_tracing`] with an explicit fallback filter. Returns whether a
/// subscriber was installed by this call.
pub fn init_tracing_with(default_directive: &str) -> bool {
    if tracing::dispatcher::has_been_set() {
        return false;
    }
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
