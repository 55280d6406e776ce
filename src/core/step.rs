//! Step descriptors and hook signatures

use futures::future::BoxFuture;
use std::fmt;

/// Future returned by a work step
pub type StepFuture<T, E> = BoxFuture<'static, Result<T, E>>;

/// A work step: receives the previous step's outcome, returns a future outcome
pub type StepFn<T, E> = Box<dyn FnMut(Previous<T, E>) -> StepFuture<T, E> + Send>;

/// `success` feedback hook
pub type SuccessHook<T> = Box<dyn FnMut(&T) + Send>;

/// `fail` / `fail_stop` feedback hook
pub type FailureHook<E> = Box<dyn FnMut(&E) + Send>;

/// `complete` terminal hook, sees every result
pub type CompleteHook<T> = Box<dyn FnMut(&[Option<T>]) + Send>;

/// `error` terminal hook, sees every error
pub type ErrorHook<E> = Box<dyn FnMut(&[Option<E>]) + Send>;

/// `always` terminal hook, sees results and errors
pub type AlwaysHook<T, E> = Box<dyn FnMut(&[Option<T>], &[Option<E>]) + Send>;

/// Fired when a run is interrupted by `abort()`
pub type AbortedHook = Box<dyn FnMut() + Send>;

/// Outcome of the work step that ran before the current one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Previous<T, E> {
    /// The current step is the first work step of the run
    First,
    /// The previous work step succeeded with this result
    Succeeded(T),
    /// The previous work step failed with this error
    Failed(E),
}

impl<T, E> Previous<T, E> {
    /// `None` for the first step, otherwise whether the previous step succeeded
    pub fn succeeded(&self) -> Option<bool> {
        match self {
            Previous::First => None,
            Previous::Succeeded(_) => Some(true),
            Previous::Failed(_) => Some(false),
        }
    }

    /// Result of the previous step, if it succeeded
    pub fn result(&self) -> Option<&T> {
        match self {
            Previous::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    /// Error of the previous step, if it failed
    pub fn error(&self) -> Option<&E> {
        match self {
            Previous::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Which per-step feedback hook is being registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Fail,
    FailStop,
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackKind::Success => f.write_str("success"),
            FeedbackKind::Fail => f.write_str("fail"),
            FeedbackKind::FailStop => f.write_str("fail_stop"),
        }
    }
}

/// Feedback hooks attached to one work step
pub struct Feedback<T, E> {
    pub(crate) success: Option<SuccessHook<T>>,
    pub(crate) fail: Option<FailureHook<E>>,
    pub(crate) fail_stop: Option<FailureHook<E>>,
}

impl<T, E> Feedback<T, E> {
    pub(crate) fn new() -> Self {
        Self {
            success: None,
            fail: None,
            fail_stop: None,
        }
    }

    /// Install a success hook; `false` if one is already present
    pub(crate) fn set_success(&mut self, hook: SuccessHook<T>) -> bool {
        fill(&mut self.success, hook)
    }

    /// Install a failure hook of `kind`; `false` if one is already present
    pub(crate) fn set_failure(&mut self, kind: FeedbackKind, hook: FailureHook<E>) -> bool {
        match kind {
            FeedbackKind::FailStop => fill(&mut self.fail_stop, hook),
            _ => fill(&mut self.fail, hook),
        }
    }

    /// Whether a failure of this step halts later work steps
    pub fn stops_on_failure(&self) -> bool {
        self.fail_stop.is_some()
    }
}

fn fill<H>(slot: &mut Option<H>, hook: H) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(hook);
    true
}

/// Kind of an entry in the step sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Work,
    Complete,
    Error,
    Always,
}

impl StepKind {
    /// Terminal pseudo-steps never await anything
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepKind::Work)
    }
}

/// One entry in a pipeline's ordered step sequence
pub enum StepDescriptor<T, E> {
    /// Asynchronous work with its feedback hooks
    Work {
        name: Option<String>,
        run: StepFn<T, E>,
        feedback: Feedback<T, E>,
    },
    /// Fires when no work step failed so far
    Complete(CompleteHook<T>),
    /// Fires when at least one work step failed so far
    Error(ErrorHook<E>),
    /// Fires unconditionally
    Always(AlwaysHook<T, E>),
}

impl<T, E> StepDescriptor<T, E> {
    pub fn kind(&self) -> StepKind {
        match self {
            StepDescriptor::Work { .. } => StepKind::Work,
            StepDescriptor::Complete(_) => StepKind::Complete,
            StepDescriptor::Error(_) => StepKind::Error,
            StepDescriptor::Always(_) => StepKind::Always,
        }
    }

    /// Name of a named work step
    pub fn name(&self) -> Option<&str> {
        match self {
            StepDescriptor::Work { name, .. } => name.as_deref(),
            _ => None,
        }
    }
}

impl<T, E> fmt::Debug for StepDescriptor<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepDescriptor::Work { name, feedback, .. } => f
                .debug_struct("Work")
                .field("name", name)
                .field("success", &feedback.success.is_some())
                .field("fail", &feedback.fail.is_some())
                .field("fail_stop", &feedback.fail_stop.is_some())
                .finish(),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}
