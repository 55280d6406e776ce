//! CLI command definitions

use clap::Args;

/// Run a pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Validate a pipeline configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Concurrent login demo
#[derive(Debug, Args, Clone)]
pub struct DemoCommand {
    /// Number of pipelines started at once
    #[arg(short, long, default_value_t = 2)]
    pub pipelines: usize,

    /// Start with a live session, so no prompt is shown
    #[arg(long)]
    pub logged_in: bool,

    /// Number of credential attempts the backend rejects
    #[arg(long, default_value_t = 0)]
    pub reject_attempts: usize,

    /// Cancel the credential prompt
    #[arg(long)]
    pub cancel: bool,

    /// On failure, let every waiting pipeline retry on its own
    #[arg(long)]
    pub propagate_on_reject: bool,

    /// Simulated latency of every backend call and prompt (milliseconds)
    #[arg(long, default_value_t = 200)]
    pub delay_ms: u64,
}
