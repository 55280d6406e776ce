//! Test: Failure Handling - fail, fail-stop and the error-side hooks

use crate::helpers::*;
use taskline::{Previous, RunState};

/// Test that a failed step without fail-stop does not stop the pipeline
#[tokio::test]
async fn test_continue_after_failure() {
    let events = Events::new();
    let (f1, s2, c, e) = (events.clone(), events.clone(), events.clone(), events.clone());
    let seen = Events::new();
    let seen_by_third = seen.clone();

    let mut engine = Engine::new("continue");
    engine
        .task(err_step("flaky"))
        .fail(move |err| f1.push(format!("fail:{}", err)))
        .task(move |prev: Previous<String, String>| {
            seen_by_third.push(format!("{:?}", prev.succeeded()));
            async { Ok("recovered".to_string()) }
        })
        .success(move |v| s2.push(format!("success:{}", v)))
        .complete(move |_| c.push("complete"))
        .error(move |errors| e.push(format!("error:{}", errors.iter().flatten().count())));

    assert_eq!(engine.exec().await, RunState::Done);

    assert_eq!(
        events.all(),
        vec!["fail:flaky", "success:recovered", "error:1"]
    );
    assert_eq!(seen.all(), vec!["Some(false)"]);
    assert_eq!(engine.statuses(), &[false, true]);
    assert!(engine.has_error());
    assert!(!engine.is_stopped());
}

/// Test the three-step login scenario where step two fails with fail-stop
#[tokio::test]
async fn test_fail_stop_skips_later_tasks() {
    let events = Events::new();
    let (s1, fs2, s3, a) = (events.clone(), events.clone(), events.clone(), events.clone());

    let mut engine = Engine::new("fail-stop");
    engine
        .task(counted_step(&events, "r1"))
        .success(move |v| s1.push(format!("success:{}", v)))
        .task(err_step("bad-credentials"))
        .fail_stop(move |err| fs2.push(format!("fail_stop:{}", err)))
        .task(counted_step(&events, "r3"))
        .success(move |v| s3.push(format!("success:{}", v)))
        .always(move |results, errors| {
            a.push(format!("always:{:?}:{:?}", results, errors));
        });

    assert_eq!(engine.exec().await, RunState::Done);

    assert_eq!(
        events.all(),
        vec![
            "run:r1".to_string(),
            "success:r1".to_string(),
            "fail_stop:bad-credentials".to_string(),
            format!(
                "always:{:?}:{:?}",
                vec![Some("r1".to_string()), None],
                vec![None, Some("bad-credentials".to_string())]
            ),
        ]
    );
    assert_eq!(engine.results(), &[Some("r1".to_string()), None]);
    assert_eq!(
        engine.errors(),
        &[None, Some("bad-credentials".to_string())]
    );
    assert!(engine.is_stopped());
    assert_eq!(engine.current_index(), 4);
}

/// Test that fail-stop takes precedence over a plain fail hook on the same step
#[tokio::test]
async fn test_fail_stop_wins_over_fail() {
    let events = Events::new();
    let (f, fs) = (events.clone(), events.clone());

    let mut engine = Engine::new("precedence");
    engine
        .task(err_step("denied"))
        .fail(move |_| f.push("fail"))
        .fail_stop(move |_| fs.push("fail_stop"));

    engine.exec().await;

    assert_eq!(events.all(), vec!["fail_stop"]);
}

/// Test that terminal hooks after a fail-stop still honor has_error
#[tokio::test]
async fn test_terminal_hooks_after_fail_stop() {
    let events = Events::new();
    let (c, e, a) = (events.clone(), events.clone(), events.clone());

    let mut engine = Engine::new("drain");
    engine
        .task(err_step("denied"))
        .fail_stop(|_| {})
        .task(counted_step(&events, "never"))
        .complete(move |_| c.push("complete"))
        .error(move |_| e.push("error"))
        .always(move |_, _| a.push("always"));

    engine.exec().await;

    assert_eq!(events.all(), vec!["error", "always"]);
    assert_eq!(events.count("run:never"), 0);
}

/// Test that the always hook fires exactly once per run
#[tokio::test]
async fn test_always_fires_once() {
    let events = Events::new();
    let a = events.clone();

    let mut engine = Engine::new("always-once");
    engine
        .task(err_step("x"))
        .task(ok_step("y"))
        .always(move |_, _| a.push("always"));

    engine.exec().await;
    engine.exec().await;

    assert_eq!(events.count("always"), 1);
}
