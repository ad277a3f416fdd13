//! Builders to construct loops from configuration.

pub mod loop_builder;

pub use loop_builder::LoopBuilder;
