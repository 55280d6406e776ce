//! Core building blocks shared by the coordinator and the pipeline engine
//!
//! This module defines the resettable promise, the step descriptors a
//! pipeline is made of, run/promise states, and YAML configuration.

pub mod config;
pub mod promise;
pub mod state;
pub mod step;

pub use promise::*;
pub use state::*;
pub use step::*;

/// Bound for values that flow through promises and pipelines.
///
/// Outcomes are cloned when they fan out to several waiters and they cross
/// task boundaries on the tokio runtime.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<V: Clone + Send + Sync + 'static> Payload for V {}
