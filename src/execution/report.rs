//! Serializable summary of a pipeline run

use crate::core::RunState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Snapshot of a run's history
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<T, E> {
    /// Unique id of the run (a new one after every reset)
    pub run_id: Uuid,

    /// Pipeline name
    pub pipeline: String,

    /// State when the snapshot was taken
    pub state: RunState,

    /// Per executed work step, the result if it succeeded
    pub results: Vec<Option<T>>,

    /// Per executed work step, the error if it failed
    pub errors: Vec<Option<E>>,

    /// Per executed work step, whether it succeeded
    pub statuses: Vec<bool>,

    /// How many times the pipeline was reset
    pub reset_count: usize,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl<T, E> RunReport<T, E> {
    /// Number of work steps that succeeded
    pub fn succeeded_steps(&self) -> usize {
        self.statuses.iter().filter(|ok| **ok).count()
    }

    /// Number of work steps that failed
    pub fn failed_steps(&self) -> usize {
        self.statuses.iter().filter(|ok| !**ok).count()
    }

    /// Wall-clock duration of a finished run
    pub fn duration(&self) -> Option<std::time::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.signed_duration_since(start).to_std().ok(),
            _ => None,
        }
    }
}
