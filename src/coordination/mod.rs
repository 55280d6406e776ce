//! Single-flight coordination of exclusive operations
//!
//! Many [`CoordinatedTask`]s share one [`ExclusiveCoordinator`]; the first to
//! start leads and runs the real work, the rest receive its outcome.

pub mod coordinator;
pub mod task;

pub use coordinator::{CoordinatorConfig, ExclusiveCoordinator};
pub use task::{CoordinatedTask, TaskDriver};
