//! Pipeline execution engine

pub mod control;
pub mod engine;
pub mod hook_log;
pub mod report;

pub use control::PipelineControl;
pub use engine::PipelineEngine;
pub use hook_log::{HookEvent, HookLog};
pub use report::RunReport;
