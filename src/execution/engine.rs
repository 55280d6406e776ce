//! Sequential pipeline engine - drives work steps and terminal hooks in order

use crate::{
    core::{
        AbortedHook, Feedback, FeedbackKind, Payload, Previous, RunState, StepDescriptor,
        StepFn,
    },
    execution::{PipelineControl, RunReport},
};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Per-run state, cleared by `reset`
struct RunHistory<T, E> {
    run_id: Uuid,
    state: RunState,
    current_index: usize,
    has_error: bool,
    stopped: bool,
    aborted_notified: bool,
    results: Vec<Option<T>>,
    errors: Vec<Option<E>>,
    statuses: Vec<bool>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl<T: Payload, E: Payload> RunHistory<T, E> {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: RunState::Idle,
            current_index: 0,
            has_error: false,
            stopped: false,
            aborted_notified: false,
            results: Vec::new(),
            errors: Vec::new(),
            statuses: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Outcome of the last executed work step
    fn previous(&self) -> Previous<T, E> {
        match self.statuses.last() {
            None => Previous::First,
            Some(true) => match self.results.last().cloned().flatten() {
                Some(value) => Previous::Succeeded(value),
                None => Previous::First,
            },
            Some(false) => match self.errors.last().cloned().flatten() {
                Some(error) => Previous::Failed(error),
                None => Previous::First,
            },
        }
    }
}

/// Runs an ordered list of asynchronous work steps with feedback hooks.
///
/// Work steps run one at a time in registration order. A failed step is
/// recorded and, unless it carries a `fail_stop` hook, the next work step
/// still runs. Terminal pseudo-steps (`complete`, `error`, `always`) fire at
/// their registered position in the sequence.
///
/// Registration methods chain on `&mut self`; feedback hooks attach to the
/// most recently registered work step.
pub struct PipelineEngine<T, E> {
    name: String,
    steps: Vec<StepDescriptor<T, E>>,
    aborted_hook: Option<AbortedHook>,
    /// Named work step -> position in `results` / `errors`
    name_to_index: HashMap<String, usize>,
    work_steps: usize,
    control: PipelineControl,
    reset_count: usize,
    run: RunHistory<T, E>,
}

impl<T: Payload, E: Payload> PipelineEngine<T, E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            aborted_hook: None,
            name_to_index: HashMap::new(),
            work_steps: 0,
            control: PipelineControl::new(),
            reset_count: 0,
            run: RunHistory::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered entries, terminal pseudo-steps included
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Registered entries in order
    pub fn steps(&self) -> &[StepDescriptor<T, E>] {
        &self.steps
    }

    /// Add an anonymous work step
    pub fn task<F, Fut>(&mut self, step: F) -> &mut Self
    where
        F: FnMut(Previous<T, E>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.push_work(None, boxed_step(step))
    }

    /// Add a work step whose result can be looked up with [`result_by_name`](Self::result_by_name)
    pub fn named_task<F, Fut>(&mut self, name: impl Into<String>, step: F) -> &mut Self
    where
        F: FnMut(Previous<T, E>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let name = name.into();
        if self.name_to_index.insert(name.clone(), self.work_steps).is_some() {
            warn!("Step name {} registered twice in {}, lookups use the latest", name, self.name);
        }
        self.push_work(Some(name), boxed_step(step))
    }

    fn push_work(&mut self, name: Option<String>, run: StepFn<T, E>) -> &mut Self {
        self.steps.push(StepDescriptor::Work {
            name,
            run,
            feedback: Feedback::new(),
        });
        self.work_steps += 1;
        self
    }

    /// Hook fired with the result when the last registered step succeeds
    pub fn success<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&T) + Send + 'static,
    {
        let hook = Box::new(hook);
        self.attach_feedback(FeedbackKind::Success, move |feedback| feedback.set_success(hook))
    }

    /// Hook fired with the error when the last registered step fails
    pub fn fail<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&E) + Send + 'static,
    {
        let hook = Box::new(hook);
        self.attach_feedback(FeedbackKind::Fail, move |feedback| {
            feedback.set_failure(FeedbackKind::Fail, hook)
        })
    }

    /// Hook fired with the error when the last registered step fails; later
    /// work steps are skipped while terminal hooks still run
    pub fn fail_stop<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&E) + Send + 'static,
    {
        let hook = Box::new(hook);
        self.attach_feedback(FeedbackKind::FailStop, move |feedback| {
            feedback.set_failure(FeedbackKind::FailStop, hook)
        })
    }

    fn attach_feedback(
        &mut self,
        kind: FeedbackKind,
        install: impl FnOnce(&mut Feedback<T, E>) -> bool,
    ) -> &mut Self {
        let index = self.steps.len().saturating_sub(1);
        match self.steps.last_mut() {
            Some(StepDescriptor::Work { feedback, .. }) => {
                if !install(feedback) {
                    warn!(
                        "A {} hook is already registered for step {} of {}, ignoring the new one",
                        kind, index, self.name
                    );
                }
            }
            _ => warn!(
                "Cannot register a {} hook on {}: the last registered step is not a task",
                kind, self.name
            ),
        }
        self
    }

    /// Terminal hook fired with every result when no work step failed
    pub fn complete<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&[Option<T>]) + Send + 'static,
    {
        self.steps.push(StepDescriptor::Complete(Box::new(hook)));
        self
    }

    /// Terminal hook fired with every error when a work step failed
    pub fn error<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&[Option<E>]) + Send + 'static,
    {
        self.steps.push(StepDescriptor::Error(Box::new(hook)));
        self
    }

    /// Terminal hook fired unconditionally with results and errors
    pub fn always<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&[Option<T>], &[Option<E>]) + Send + 'static,
    {
        self.steps.push(StepDescriptor::Always(Box::new(hook)));
        self
    }

    /// Hook fired once when an aborted run is advanced; replaces any previous one
    pub fn aborted<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut() + Send + 'static,
    {
        self.aborted_hook = Some(Box::new(hook));
        self
    }

    /// Handle for aborting or killing the run while `exec` is awaiting
    pub fn control(&self) -> PipelineControl {
        self.control.clone()
    }

    pub fn abort(&self) {
        self.control.abort();
    }

    pub fn kill(&self) {
        self.control.kill();
    }

    /// Advance the pipeline until it finishes or is interrupted.
    ///
    /// Terminal pseudo-steps and skipped work steps are drained without
    /// yielding; the only suspension points are work-step futures. Every pass
    /// of the loop either advances `current_index` or returns, so it is
    /// bounded by the step count.
    pub async fn exec(&mut self) -> RunState {
        if self.run.state == RunState::Idle && self.run.current_index == 0 {
            info!(
                "Starting pipeline execution: {} ({})",
                self.name, self.run.run_id
            );
            self.run.state = RunState::Running;
            self.run.started_at = Some(Utc::now());
        }

        loop {
            let index = self.run.current_index;
            if index >= self.steps.len() {
                return self.finish(RunState::Done);
            }

            if self.control.is_killed() {
                return self.finish(RunState::Killed);
            }

            if self.control.is_aborted() {
                if !self.run.aborted_notified {
                    self.run.aborted_notified = true;
                    info!("Pipeline {} aborted at step {}", self.name, index);
                    if let Some(hook) = self.aborted_hook.as_mut() {
                        hook();
                    }
                }
                return self.finish(RunState::Aborted);
            }

            let stopped = self.run.stopped;
            let run = &mut self.run;
            match &mut self.steps[index] {
                StepDescriptor::Complete(hook) => {
                    if !run.has_error {
                        debug!("Pipeline {}: complete hook at step {}", self.name, index);
                        hook(run.results.as_slice());
                    }
                }
                StepDescriptor::Error(hook) => {
                    if run.has_error {
                        debug!("Pipeline {}: error hook at step {}", self.name, index);
                        hook(run.errors.as_slice());
                    }
                }
                StepDescriptor::Always(hook) => {
                    debug!("Pipeline {}: always hook at step {}", self.name, index);
                    hook(run.results.as_slice(), run.errors.as_slice());
                }
                StepDescriptor::Work { name, .. } if stopped => {
                    debug!(
                        "Pipeline {}: skipping step {} ({}) after fail-stop",
                        self.name,
                        index,
                        name.as_deref().unwrap_or("anonymous")
                    );
                }
                StepDescriptor::Work {
                    name,
                    run: step,
                    feedback,
                } => {
                    let label = name.as_deref().unwrap_or("anonymous");
                    info!("Executing step {} ({}) of {}", index, label, self.name);

                    let outcome = step(run.previous()).await;
                    // Flags raised while the step was in flight mute its feedback
                    let interrupted = self.control.is_interrupted();

                    match outcome {
                        Ok(value) => {
                            info!("Step {} ({}) of {} succeeded", index, label, self.name);
                            run.results.push(Some(value));
                            run.errors.push(None);
                            run.statuses.push(true);
                            if interrupted {
                                debug!("Pipeline {} interrupted, success hook not fired", self.name);
                            } else if let (Some(hook), Some(Some(value))) =
                                (feedback.success.as_mut(), run.results.last())
                            {
                                hook(value);
                            }
                        }
                        Err(error) => {
                            warn!("Step {} ({}) of {} failed", index, label, self.name);
                            run.results.push(None);
                            run.errors.push(Some(error));
                            run.statuses.push(false);
                            run.has_error = true;
                            if feedback.stops_on_failure() {
                                run.stopped = true;
                                run.state = RunState::Draining;
                            }
                            if interrupted {
                                debug!("Pipeline {} interrupted, failure hook not fired", self.name);
                            } else if let Some(Some(error)) = run.errors.last() {
                                if let Some(hook) = feedback.fail_stop.as_mut() {
                                    info!("Pipeline {} stops running tasks after step {}", self.name, index);
                                    hook(error);
                                } else if let Some(hook) = feedback.fail.as_mut() {
                                    hook(error);
                                }
                            }
                        }
                    }
                }
            }

            self.run.current_index += 1;
        }
    }

    fn finish(&mut self, state: RunState) -> RunState {
        if self.run.state != state {
            match state {
                RunState::Killed => info!("Pipeline {} killed", self.name),
                RunState::Done => info!(
                    "Pipeline execution finished: {} - {} failed step(s)",
                    self.name,
                    self.run.statuses.iter().filter(|ok| !**ok).count()
                ),
                _ => {}
            }
            self.run.state = state;
            self.run.finished_at = Some(Utc::now());
        }
        state
    }

    /// Clear run state and flags; registered steps and hooks are kept
    pub fn reset(&mut self) {
        self.reset_count += 1;
        self.run = RunHistory::new();
        self.control.clear();
        debug!("Pipeline {} reset ({} so far)", self.name, self.reset_count);
    }

    /// `reset` then `exec` from the first step
    pub async fn restart(&mut self) -> RunState {
        self.reset();
        self.exec().await
    }

    /// Reset and drop every registered step and hook
    pub fn destroy(&mut self) {
        self.reset();
        self.steps.clear();
        self.aborted_hook = None;
        self.name_to_index.clear();
        self.work_steps = 0;
    }

    pub fn state(&self) -> RunState {
        self.run.state
    }

    /// Index of the next entry to process
    pub fn current_index(&self) -> usize {
        self.run.current_index
    }

    /// Whether any work step failed in this run
    pub fn has_error(&self) -> bool {
        self.run.has_error
    }

    /// Whether a fail-stop hook halted work steps in this run
    pub fn is_stopped(&self) -> bool {
        self.run.stopped
    }

    pub fn reset_count(&self) -> usize {
        self.reset_count
    }

    pub fn results(&self) -> &[Option<T>] {
        &self.run.results
    }

    pub fn errors(&self) -> &[Option<E>] {
        &self.run.errors
    }

    pub fn statuses(&self) -> &[bool] {
        &self.run.statuses
    }

    /// Result of the last executed work step, `None` if it failed
    pub fn last_result(&self) -> Option<&T> {
        self.run.results.last().and_then(Option::as_ref)
    }

    /// Error of the last executed work step, `None` if it succeeded
    pub fn last_error(&self) -> Option<&E> {
        self.run.errors.last().and_then(Option::as_ref)
    }

    /// Whether the last executed work step succeeded
    pub fn last_status(&self) -> Option<bool> {
        self.run.statuses.last().copied()
    }

    /// Result of a named work step, if it ran and succeeded
    pub fn result_by_name(&self, name: &str) -> Option<&T> {
        let index = *self.name_to_index.get(name)?;
        self.run.results.get(index).and_then(Option::as_ref)
    }

    /// Snapshot of the current run
    pub fn report(&self) -> RunReport<T, E> {
        RunReport {
            run_id: self.run.run_id,
            pipeline: self.name.clone(),
            state: self.run.state,
            results: self.run.results.clone(),
            errors: self.run.errors.clone(),
            statuses: self.run.statuses.clone(),
            reset_count: self.reset_count,
            started_at: self.run.started_at,
            finished_at: self.run.finished_at,
        }
    }
}

fn boxed_step<T, E, F, Fut>(mut step: F) -> StepFn<T, E>
where
    F: FnMut(Previous<T, E>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Box::new(move |previous| step(previous).boxed())
}

impl<T, E> std::fmt::Debug for PipelineEngine<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineEngine")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("state", &self.run.state)
            .field("current_index", &self.run.current_index)
            .finish()
    }
}
