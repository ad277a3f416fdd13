//! Reference event kinds.
//!
//! Real hosts bring their own kinds (I/O readiness checks, child processes,
//! queues); these cover counting, waiting on the wall clock, and wrapping a
//! closure.

pub mod countdown;
pub mod delay;
pub mod poll_fn;

pub use countdown::Countdown;
pub use delay::Delay;
pub use poll_fn::{poll_fn, PollFn};
