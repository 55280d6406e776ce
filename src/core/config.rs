//! Pipeline configuration from YAML
//!
//! A configured pipeline is made of scripted work steps (each waits a while
//! and then succeeds or fails with a fixed value) and terminal hooks. Every
//! hook records into a [`HookLog`], which makes configured pipelines useful
//! for demonstrating and testing the engine's ordering rules.

use crate::coordination::CoordinatorConfig;
use crate::core::Previous;
use crate::execution::{HookEvent, HookLog, PipelineEngine};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Ordered step entries
    pub steps: Vec<StepConfig>,

    /// Coordinator settings for pipelines that share an exclusive operation
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
}

/// One entry of the step sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepConfig {
    /// Scripted work step
    Task(TaskConfig),
    /// Fires when no task failed
    Complete(HookConfig),
    /// Fires when a task failed
    Error(HookConfig),
    /// Fires unconditionally
    Always(HookConfig),
}

/// Scripted work step configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Optional step name, used for result lookups
    #[serde(default)]
    pub name: Option<String>,

    /// How long the step takes (in milliseconds)
    #[serde(default)]
    pub delay_ms: u64,

    /// What the step ends with
    pub outcome: ScriptedOutcome,

    /// Message for the success hook; no hook when absent
    #[serde(default)]
    pub on_success: Option<String>,

    /// Message for the fail hook; no hook when absent
    #[serde(default)]
    pub on_fail: Option<String>,

    /// Message for the fail-stop hook; no hook when absent
    #[serde(default)]
    pub on_fail_stop: Option<String>,
}

/// Terminal hook configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookConfig {
    /// Message recorded when the hook fires
    #[serde(default)]
    pub message: Option<String>,
}

/// Fixed outcome of a scripted step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedOutcome {
    /// Succeed with this value
    Succeed(String),
    /// Fail with this reason
    Fail(String),
}

impl ScriptedOutcome {
    pub fn to_result(&self) -> Result<String, String> {
        match self {
            ScriptedOutcome::Succeed(value) => Ok(value.clone()),
            ScriptedOutcome::Fail(reason) => Err(reason.clone()),
        }
    }
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Pipeline name must not be empty");
        }

        if self.steps.is_empty() {
            anyhow::bail!("Pipeline '{}' has no steps", self.name);
        }

        // Check that task names are unique
        let mut seen = HashSet::new();
        for task in self.tasks() {
            if let Some(name) = &task.name {
                if name.trim().is_empty() {
                    anyhow::bail!("Task names must not be empty");
                }
                if !seen.insert(name) {
                    anyhow::bail!("Duplicate task name: {}", name);
                }
            }
        }

        Ok(())
    }

    /// Task entries in order
    pub fn tasks(&self) -> impl Iterator<Item = &TaskConfig> {
        self.steps.iter().filter_map(|step| match step {
            StepConfig::Task(task) => Some(task),
            _ => None,
        })
    }

    /// Build an engine whose hooks record into `log`
    pub fn to_engine(&self, log: &HookLog) -> PipelineEngine<String, String> {
        let mut engine = PipelineEngine::new(self.name.clone());
        let mut task_number = 0;

        for step in &self.steps {
            match step {
                StepConfig::Task(task) => {
                    task_number += 1;
                    let label = task
                        .name
                        .clone()
                        .unwrap_or_else(|| format!("task-{}", task_number));
                    add_scripted_task(&mut engine, task, label, log);
                }
                StepConfig::Complete(hook) => {
                    let (log, message) = (log.clone(), hook.message.clone());
                    engine.complete(move |results| {
                        announce("complete", message.as_deref());
                        log.record(HookEvent::Complete {
                            results: results.to_vec(),
                            message: message.clone(),
                        });
                    });
                }
                StepConfig::Error(hook) => {
                    let (log, message) = (log.clone(), hook.message.clone());
                    engine.error(move |errors| {
                        announce("error", message.as_deref());
                        log.record(HookEvent::Error {
                            errors: errors.to_vec(),
                            message: message.clone(),
                        });
                    });
                }
                StepConfig::Always(hook) => {
                    let (log, message) = (log.clone(), hook.message.clone());
                    engine.always(move |results, errors| {
                        announce("always", message.as_deref());
                        log.record(HookEvent::Always {
                            results: results.to_vec(),
                            errors: errors.to_vec(),
                            message: message.clone(),
                        });
                    });
                }
            }
        }

        let log = log.clone();
        engine.aborted(move || log.record(HookEvent::Aborted));
        engine
    }
}

fn add_scripted_task(
    engine: &mut PipelineEngine<String, String>,
    task: &TaskConfig,
    label: String,
    log: &HookLog,
) {
    let outcome = task.outcome.clone();
    let delay = Duration::from_millis(task.delay_ms);
    let run = move |_previous: Previous<String, String>| {
        let outcome = outcome.clone();
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome.to_result()
        }
    };

    match &task.name {
        Some(name) => engine.named_task(name.clone(), run),
        None => engine.task(run),
    };

    if let Some(message) = task.on_success.clone() {
        let (log, step) = (log.clone(), label.clone());
        engine.success(move |value| {
            announce("success", Some(&message));
            log.record(HookEvent::Success {
                step: step.clone(),
                value: value.clone(),
                message: Some(message.clone()),
            });
        });
    }

    if let Some(message) = task.on_fail.clone() {
        let (log, step) = (log.clone(), label.clone());
        engine.fail(move |error| {
            announce("fail", Some(&message));
            log.record(HookEvent::Fail {
                step: step.clone(),
                error: error.clone(),
                message: Some(message.clone()),
            });
        });
    }

    if let Some(message) = task.on_fail_stop.clone() {
        let (log, step) = (log.clone(), label);
        engine.fail_stop(move |error| {
            announce("fail_stop", Some(&message));
            log.record(HookEvent::FailStop {
                step: step.clone(),
                error: error.clone(),
                message: Some(message.clone()),
            });
        });
    }
}

fn announce(hook: &str, message: Option<&str>) {
    if let Some(message) = message {
        info!("[{}] {}", hook, message);
    }
}
