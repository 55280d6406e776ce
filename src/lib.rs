//! taskline - sequential async task pipelines with single-flight coordination

pub mod auth;
pub mod cli;
pub mod coordination;
pub mod core;
pub mod execution;

// Re-export commonly used types
pub use coordination::{CoordinatedTask, CoordinatorConfig, ExclusiveCoordinator, TaskDriver};
pub use core::{Payload, Previous, PromiseStatus, ResettablePromise, RunState};
pub use execution::{HookEvent, HookLog, PipelineControl, PipelineEngine, RunReport};
