//! Promise and pipeline run states

use serde::{Deserialize, Serialize};

/// Status of a [`ResettablePromise`](crate::core::ResettablePromise)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromiseStatus {
    /// Constructed but not armed yet
    Initial,
    /// Armed and waiting for an outcome
    Pending,
    /// Resolved with a value
    Fulfilled,
    /// Rejected with a reason
    Rejected,
}

impl PromiseStatus {
    /// Whether continuations may still be attached
    pub fn is_open(&self) -> bool {
        matches!(self, PromiseStatus::Initial | PromiseStatus::Pending)
    }
}

/// Where a pipeline run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing executed since construction or the last reset
    Idle,
    /// Work steps are being executed
    Running,
    /// A fail-stop hook fired; only terminal hooks still run
    Draining,
    /// Every registered step has been processed
    Done,
    /// Interrupted by `abort()`
    Aborted,
    /// Frozen by `kill()`
    Killed,
}

impl RunState {
    /// Check if the run can make no further progress without a reset
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Aborted | RunState::Killed)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Draining => "draining",
            RunState::Done => "done",
            RunState::Aborted => "aborted",
            RunState::Killed => "killed",
        };
        f.write_str(label)
    }
}
