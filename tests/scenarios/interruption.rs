//! Test: Interruption - abort, kill, reset and restart

use crate::helpers::*;
use taskline::RunState;

/// Test that abort during an in-flight step mutes its hook and stops the run
#[tokio::test]
async fn test_abort_during_in_flight_step() {
    let events = Events::new();
    let gate = Gate::new();
    let (s1, s2, a, ab) = (events.clone(), events.clone(), events.clone(), events.clone());

    let mut engine = Engine::new("abort");
    engine
        .task(gate.step("slow"))
        .success(move |v| s1.push(format!("success:{}", v)))
        .task(counted_step(&events, "next"))
        .success(move |v| s2.push(format!("success:{}", v)))
        .always(move |_, _| a.push("always"))
        .aborted(move || ab.push("aborted"));

    let control = engine.control();
    let run = tokio::spawn(async move {
        let state = engine.exec().await;
        (engine, state)
    });

    gate.started.notified().await;
    control.abort();
    gate.release.notify_one();

    let (mut engine, state) = run.await.unwrap();
    assert_eq!(state, RunState::Aborted);
    assert_eq!(events.all(), vec!["aborted"]);
    assert_eq!(engine.results(), &[Some("slow".to_string())]);
    assert_eq!(engine.current_index(), 1);

    // Advancing again does not re-fire the aborted hook
    assert_eq!(engine.exec().await, RunState::Aborted);
    assert_eq!(events.count("aborted"), 1);
}

/// Test that abort before exec fires only the aborted hook
#[tokio::test]
async fn test_abort_before_exec() {
    let events = Events::new();
    let ab = events.clone();

    let mut engine = Engine::new("abort-early");
    engine
        .task(counted_step(&events, "work"))
        .aborted(move || ab.push("aborted"));

    engine.abort();

    assert_eq!(engine.exec().await, RunState::Aborted);
    assert_eq!(events.all(), vec!["aborted"]);
    assert!(engine.results().is_empty());
}

/// Test that kill silences every hook, the aborted hook included
#[tokio::test]
async fn test_kill_fires_no_hooks() {
    let events = Events::new();
    let gate = Gate::new();
    let (s, a, ab) = (events.clone(), events.clone(), events.clone());

    let mut engine = Engine::new("kill");
    engine
        .task(gate.step("slow"))
        .success(move |v| s.push(format!("success:{}", v)))
        .always(move |_, _| a.push("always"))
        .aborted(move || ab.push("aborted"));

    let control = engine.control();
    let run = tokio::spawn(async move {
        let state = engine.exec().await;
        (engine, state)
    });

    gate.started.notified().await;
    control.kill();
    control.abort();
    gate.release.notify_one();

    let (engine, state) = run.await.unwrap();
    assert_eq!(state, RunState::Killed);
    assert!(events.all().is_empty());
    assert_eq!(engine.state(), RunState::Killed);
}

/// Test that reset clears the run but keeps registered steps
#[tokio::test]
async fn test_reset_clears_history() {
    let mut engine = Engine::new("reset");
    engine.task(err_step("x")).fail_stop(|_| {}).task(ok_step("y"));

    engine.exec().await;
    assert!(engine.is_stopped());

    engine.reset();

    assert_eq!(engine.state(), RunState::Idle);
    assert_eq!(engine.current_index(), 0);
    assert!(engine.results().is_empty());
    assert!(engine.errors().is_empty());
    assert!(!engine.has_error());
    assert!(!engine.is_stopped());
    assert_eq!(engine.len(), 2);
    assert_eq!(engine.reset_count(), 1);
}

/// Test that restart reproduces the hook sequence of the first run
#[tokio::test]
async fn test_restart_reproduces_sequence() {
    let events = Events::new();
    let (s1, f2, e, a) = (events.clone(), events.clone(), events.clone(), events.clone());

    let mut engine = Engine::new("restart");
    engine
        .task(counted_step(&events, "r1"))
        .success(move |v| s1.push(format!("success:{}", v)))
        .task(err_step("bad"))
        .fail(move |err| f2.push(format!("fail:{}", err)))
        .error(move |_| e.push("error"))
        .always(move |_, _| a.push("always"));

    engine.exec().await;
    let first = events.all();

    assert_eq!(engine.restart().await, RunState::Done);
    let all = events.all();

    assert_eq!(all.len(), first.len() * 2);
    assert_eq!(&all[first.len()..], first.as_slice());
    assert_eq!(engine.reset_count(), 1);
}

/// Test that restart after abort clears the abort flag
#[tokio::test]
async fn test_restart_after_abort() {
    let events = Events::new();
    let ab = events.clone();

    let mut engine = Engine::new("restart-abort");
    engine
        .task(counted_step(&events, "work"))
        .aborted(move || ab.push("aborted"));

    engine.abort();
    assert_eq!(engine.exec().await, RunState::Aborted);

    assert_eq!(engine.restart().await, RunState::Done);
    assert_eq!(events.all(), vec!["aborted", "run:work"]);
}
