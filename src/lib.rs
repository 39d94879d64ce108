//! NotifyHub - fan-out notification delivery
//!
//! This library provides a concurrency-safe registry of named delivery
//! channels that broadcasts a message to all of them and reports every
//! per-channel failure, plus a few standalone utilities: a CPF validator,
//! a cancellable batch transform and JSON order/product types.

pub mod app;
pub mod batch;
pub mod channels;
pub mod cli;
pub mod config;
pub mod core;
pub mod cpf;
pub mod internal_metrics;
pub mod order;
pub mod registry;

// Re-export core types for convenience
pub use crate::core::*;
pub use registry::{ChannelRegistry, DispatchMode};
