//! Test utility functions for taskline

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskline::auth::{AuthCoordinator, AuthError, AuthFlow, AuthTask, Session};
use taskline::auth::{ScriptedPrompt, SimulatedBackend};
use taskline::{CoordinatorConfig, PipelineEngine, Previous};
use tokio::sync::Notify;

pub type Engine = PipelineEngine<String, String>;

/// Shared, ordered record of hook firings
#[derive(Clone, Default)]
pub struct Events {
    inner: Arc<Mutex<Vec<String>>>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.inner.lock().unwrap().push(event.into());
    }

    pub fn all(&self) -> Vec<String> {
        self.inner.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.inner.lock().unwrap().iter().filter(|e| *e == event).count()
    }
}

/// Step that succeeds with `value`
pub fn ok_step(value: &str) -> impl FnMut(Previous<String, String>) -> std::future::Ready<Result<String, String>> + Send + 'static {
    let value = value.to_string();
    move |_| std::future::ready(Ok(value.clone()))
}

/// Step that fails with `reason`
pub fn err_step(reason: &str) -> impl FnMut(Previous<String, String>) -> std::future::Ready<Result<String, String>> + Send + 'static {
    let reason = reason.to_string();
    move |_| std::future::ready(Err(reason.clone()))
}

/// Step that records each run into `events` and succeeds with `value`
pub fn counted_step(
    events: &Events,
    value: &str,
) -> impl FnMut(Previous<String, String>) -> std::future::Ready<Result<String, String>> + Send + 'static {
    let (events, value) = (events.clone(), value.to_string());
    move |_| {
        events.push(format!("run:{}", value));
        std::future::ready(Ok(value.clone()))
    }
}

/// Signals for a step that parks until released
#[derive(Clone, Default)]
pub struct Gate {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step that reports it started, then waits for `release` and succeeds with `value`
    pub fn step(
        &self,
        value: &str,
    ) -> impl FnMut(Previous<String, String>) -> futures::future::BoxFuture<'static, Result<String, String>>
           + Send
           + 'static {
        let (gate, value) = (self.clone(), value.to_string());
        move |_| {
            let (gate, value) = (gate.clone(), value.clone());
            Box::pin(async move {
                gate.started.notify_one();
                gate.release.notified().await;
                Ok(value)
            })
        }
    }
}

/// Shared login fixture: one coordinator, one backend, one prompt
pub struct LoginFixture {
    pub coordinator: Arc<AuthCoordinator>,
    pub backend: Arc<SimulatedBackend>,
    pub prompt: Arc<ScriptedPrompt>,
    pub flow: Arc<AuthFlow>,
}

impl LoginFixture {
    pub fn new(backend: SimulatedBackend, prompt: ScriptedPrompt, propagate_on_reject: bool) -> Self {
        let backend = Arc::new(backend);
        let prompt = Arc::new(prompt);
        let flow = Arc::new(AuthFlow::new(backend.clone(), prompt.clone()));
        let coordinator = Arc::new(AuthCoordinator::with_config(
            "login",
            CoordinatorConfig { propagate_on_reject },
        ));
        Self {
            coordinator,
            backend,
            prompt,
            flow,
        }
    }

    /// Pipeline whose single step joins the shared login
    pub fn pipeline(&self, name: &str, events: &Events) -> PipelineEngine<Session, AuthError> {
        let task = AuthTask::new(self.coordinator.clone(), self.flow.clone());
        let (ok, failed) = (events.clone(), events.clone());
        let (ok_name, fail_name) = (name.to_string(), name.to_string());

        let mut engine: PipelineEngine<Session, AuthError> = PipelineEngine::new(name);
        engine
            .named_task("login", move |_| task.start())
            .success(move |session: &Session| ok.push(format!("{}:success:{}", ok_name, session.user)))
            .fail(move |error: &AuthError| failed.push(format!("{}:fail:{}", fail_name, error)));
        engine
    }
}

pub fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
