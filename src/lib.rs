//! # Tickloop
//!
//! A minimal cooperative, run-to-completion event loop.
//!
//! A loop repeatedly polls a set of non-blocking events until each one reports
//! completion, then invokes each completion callback, one per iteration, in the
//! order completions were detected. Everything runs on the calling thread:
//! "non-blocking" means an event never blocks across iterations, not that
//! anything runs in parallel.
//!
//! ## Key Features
//!
//! - **Two-phase events**: build a value, then spawn it; the spawn registers it
//!   with a loop before its work starts
//! - **Deterministic ordering**: insertion-order polling, FIFO finishing, one
//!   finish per iteration
//! - **Nesting**: a loop started from a setup action or a callback becomes the
//!   current loop until it drains, then the enclosing loop is current again
//! - **Pacing**: optional minimum interval between iteration starts
//! - **Audit trail**: optional sink recording every lifecycle transition
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use tickloop::core::{spawn, AppResult, EventLoop};
//! use tickloop::kinds::Countdown;
//!
//! fn main() -> AppResult<()> {
//!     let order = Rc::new(RefCell::new(Vec::new()));
//!
//!     EventLoop::builder().unpaced().run(|_| {
//!         for (index, polls) in [3, 1, 2].into_iter().enumerate() {
//!             let order = Rc::clone(&order);
//!             spawn(Countdown::default(), polls, move || order.borrow_mut().push(index))?;
//!         }
//!         Ok(())
//!     })?;
//!
//!     assert_eq!(*order.borrow(), vec![1, 2, 0]);
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: events, the loop, and the registry.
pub mod core;
/// Configuration models for loops.
pub mod config;
/// Builders to construct loops from configuration.
pub mod builders;
/// Reference event kinds.
pub mod kinds;
/// Shared utilities.
pub mod util;
