//! Recording of hook firings
//!
//! Pipelines built from configuration install hooks that append to a
//! [`HookLog`], which the CLI prints and scenario tests assert against.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A hook that fired during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum HookEvent {
    Success {
        step: String,
        value: String,
        message: Option<String>,
    },
    Fail {
        step: String,
        error: String,
        message: Option<String>,
    },
    FailStop {
        step: String,
        error: String,
        message: Option<String>,
    },
    Complete {
        results: Vec<Option<String>>,
        message: Option<String>,
    },
    Error {
        errors: Vec<Option<String>>,
        message: Option<String>,
    },
    Always {
        results: Vec<Option<String>>,
        errors: Vec<Option<String>>,
        message: Option<String>,
    },
    Aborted,
}

impl HookEvent {
    /// Short hook name, e.g. `fail_stop`
    pub fn hook_name(&self) -> &'static str {
        match self {
            HookEvent::Success { .. } => "success",
            HookEvent::Fail { .. } => "fail",
            HookEvent::FailStop { .. } => "fail_stop",
            HookEvent::Complete { .. } => "complete",
            HookEvent::Error { .. } => "error",
            HookEvent::Always { .. } => "always",
            HookEvent::Aborted => "aborted",
        }
    }
}

/// Shared, append-only list of hook events
#[derive(Debug, Clone, Default)]
pub struct HookLog {
    events: Arc<Mutex<Vec<HookEvent>>>,
}

impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HookEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, event: HookEvent) {
        self.lock().push(event);
    }

    /// Copy of every event recorded so far
    pub fn snapshot(&self) -> Vec<HookEvent> {
        self.lock().clone()
    }

    /// Hook names in firing order
    pub fn hook_names(&self) -> Vec<&'static str> {
        self.lock().iter().map(HookEvent::hook_name).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
