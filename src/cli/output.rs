//! CLI output formatting

use crate::{
    core::RunState,
    execution::{HookEvent, RunReport},
};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format a run state for display
pub fn format_run_state(state: RunState) -> String {
    match state {
        RunState::Idle => style("IDLE").dim().to_string(),
        RunState::Running => style("RUNNING").yellow().to_string(),
        RunState::Draining => style("DRAINING").yellow().to_string(),
        RunState::Done => style("DONE").green().to_string(),
        RunState::Aborted => style("ABORTED").yellow().to_string(),
        RunState::Killed => style("KILLED").red().to_string(),
    }
}

fn optional(value: &Option<String>) -> String {
    match value {
        Some(v) => v.clone(),
        None => "-".to_string(),
    }
}

fn list(values: &[Option<String>]) -> String {
    let items: Vec<String> = values.iter().map(optional).collect();
    format!("[{}]", items.join(", "))
}

/// Format a hook event for display
pub fn format_hook_event(event: &HookEvent) -> String {
    let name = style(event.hook_name()).bold();
    match event {
        HookEvent::Success { step, value, message } => format!(
            "{}{} {} -> {} {}",
            CHECK,
            name,
            style(step).cyan(),
            value,
            style(optional(message)).dim()
        ),
        HookEvent::Fail { step, error, message } | HookEvent::FailStop { step, error, message } => {
            format!(
                "{}{} {} -> {} {}",
                CROSS,
                name,
                style(step).cyan(),
                style(error).red(),
                style(optional(message)).dim()
            )
        }
        HookEvent::Complete { results, message } => format!(
            "{}{} results={} {}",
            CHECK,
            name,
            list(results),
            style(optional(message)).dim()
        ),
        HookEvent::Error { errors, message } => format!(
            "{}{} errors={} {}",
            CROSS,
            name,
            list(errors),
            style(optional(message)).dim()
        ),
        HookEvent::Always {
            results,
            errors,
            message,
        } => format!(
            "{}{} results={} errors={} {}",
            INFO,
            name,
            list(results),
            list(errors),
            style(optional(message)).dim()
        ),
        HookEvent::Aborted => format!("{}{}", WARN, name),
    }
}

/// Format a run report summary for display
pub fn format_report<T, E>(report: &RunReport<T, E>) -> String {
    let duration = report
        .duration()
        .map(|d| format!(" in {}ms", d.as_millis()))
        .unwrap_or_default();
    format!(
        "{} {} - {} - {} succeeded, {} failed{}",
        style(&report.run_id.to_string()[..8]).dim(),
        style(&report.pipeline).bold(),
        format_run_state(report.state),
        style(report.succeeded_steps()).green(),
        style(report.failed_steps()).red(),
        style(duration).dim()
    )
}
