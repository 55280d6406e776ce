use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use taskline::auth::{
    AuthCoordinator, AuthError, AuthFlow, AuthTask, ScriptedPrompt, Session, SimulatedBackend,
};
use taskline::cli::commands::{DemoCommand, RunCommand, ValidateCommand};
use taskline::cli::output::*;
use taskline::cli::{Cli, Command};
use taskline::core::config::PipelineConfig;
use taskline::{CoordinatorConfig, HookLog, PipelineEngine, RunState};
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging, RUST_LOG overrides the default level
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
        Command::Demo(cmd) => run_demo(cmd).await?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    // Load pipeline config
    let config = PipelineConfig::from_file(&cmd.file)
        .with_context(|| format!("Failed to load pipeline config from {}", cmd.file))?;

    println!(
        "{} Loaded pipeline: {}",
        INFO,
        style(&config.name).bold()
    );

    let log = HookLog::new();
    let mut engine = config.to_engine(&log);

    // Ctrl-C aborts the run at the next step boundary
    let control = engine.control();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, aborting pipeline");
            control.abort();
        }
    });

    println!("{} Running {} step(s)", ROCKET, engine.len());
    let state = engine.exec().await;
    interrupt.abort();

    for event in log.snapshot() {
        println!("  {}", format_hook_event(&event));
    }

    let report = engine.report();
    println!("\n{}", format_report(&report));

    if cmd.json {
        println!("\n{}", serde_json::to_string_pretty(&report)?);
    }

    match state {
        RunState::Done if !engine.has_error() => println!(
            "\n{} {} completed {}",
            CHECK,
            style(engine.name()).bold(),
            style("successfully").green()
        ),
        RunState::Done => println!(
            "\n{} {} finished {}",
            WARN,
            style(engine.name()).bold(),
            style("with failed steps").yellow()
        ),
        other => {
            println!(
                "\n{} {} {}",
                CROSS,
                style(engine.name()).bold(),
                format_run_state(other)
            );
            std::process::exit(1);
        }
    }

    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    match PipelineConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Pipeline configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Steps: {}", style(config.steps.len()).cyan());
            println!("  Tasks: {}", style(config.tasks().count()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

async fn run_demo(cmd: &DemoCommand) -> Result<()> {
    if cmd.pipelines == 0 {
        anyhow::bail!("--pipelines must be at least 1");
    }

    let delay = Duration::from_millis(cmd.delay_ms);
    let mut backend = SimulatedBackend::new(delay).rejecting(cmd.reject_attempts);
    if cmd.logged_in {
        backend = backend.logged_in("demo");
    }
    let backend = Arc::new(backend);
    let prompt = Arc::new(if cmd.cancel {
        ScriptedPrompt::cancelling(delay)
    } else {
        ScriptedPrompt::answering("demo", "secret", delay)
    });

    let flow = Arc::new(AuthFlow::new(backend.clone(), prompt.clone()));
    let coordinator = Arc::new(AuthCoordinator::with_config(
        "login",
        CoordinatorConfig {
            propagate_on_reject: cmd.propagate_on_reject,
        },
    ));

    println!(
        "{} Starting {} pipeline(s) sharing one login",
        ROCKET, cmd.pipelines
    );

    let mut handles = Vec::with_capacity(cmd.pipelines);
    for i in 0..cmd.pipelines {
        let task = AuthTask::new(coordinator.clone(), flow.clone());
        let mut engine: PipelineEngine<Session, AuthError> =
            PipelineEngine::new(format!("pipeline-{}", i + 1));
        let (ok_name, fail_name) = (engine.name().to_string(), engine.name().to_string());

        engine
            .named_task("login", move |_| task.start())
            .success(move |session| {
                println!(
                    "{} {} logged in as {}",
                    CHECK,
                    style(&ok_name).bold(),
                    style(&session.user).cyan()
                )
            })
            .fail(move |error| {
                println!("{} {} failed: {}", CROSS, style(&fail_name).bold(), style(error).red())
            });

        handles.push(tokio::spawn(async move {
            let state = engine.exec().await;
            (engine.name().to_string(), state)
        }));
    }

    for handle in handles {
        match handle.await {
            Ok((name, state)) => println!("  {} {}", style(name).dim(), format_run_state(state)),
            Err(e) => error!("Pipeline task panicked: {}", e),
        }
    }

    println!(
        "\n{} Backend calls: {} session check(s), {} verification(s), {} prompt(s)",
        INFO,
        style(backend.checks()).cyan(),
        style(backend.verifications()).cyan(),
        style(prompt.prompts()).cyan()
    );

    Ok(())
}
