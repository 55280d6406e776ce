//! Abort/kill flags shared between an engine and its callers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Flags {
    abort: AtomicBool,
    kill: AtomicBool,
}

/// Handle for interrupting a pipeline from outside its `exec` call.
///
/// Both flags are level-triggered: the engine checks them at the start of
/// every advance, so a work step already in flight still completes.
#[derive(Debug, Clone, Default)]
pub struct PipelineControl {
    flags: Arc<Flags>,
}

impl PipelineControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirect the run to its aborted hook at the next advance.
    ///
    /// A step already in flight still records its outcome, but its
    /// success/fail hooks do not fire.
    pub fn abort(&self) {
        self.flags.abort.store(true, Ordering::SeqCst);
    }

    /// Freeze the run silently at the next advance; an in-flight step's
    /// outcome is recorded without firing any hook
    pub fn kill(&self) {
        self.flags.kill.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.flags.abort.load(Ordering::SeqCst)
    }

    pub fn is_killed(&self) -> bool {
        self.flags.kill.load(Ordering::SeqCst)
    }

    /// Either flag raised
    pub fn is_interrupted(&self) -> bool {
        self.is_aborted() || self.is_killed()
    }

    pub(crate) fn clear(&self) {
        self.flags.abort.store(false, Ordering::SeqCst);
        self.flags.kill.store(false, Ordering::SeqCst);
    }
}
