//! Configuration models for loops.

pub mod loop_config;

pub use loop_config::{LoopConfig, DEFAULT_DURATION_MS, MAX_DURATION_MS};
