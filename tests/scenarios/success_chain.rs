//! Test: Success Chain - every work step succeeds

use crate::helpers::*;
use taskline::{Previous, RunState};

/// Test that steps run in order and only the success-side terminal hooks fire
#[tokio::test]
async fn test_success_chain() {
    let events = Events::new();
    let (e1, e2, e3, e4, e5) = (
        events.clone(),
        events.clone(),
        events.clone(),
        events.clone(),
        events.clone(),
    );

    let mut engine = Engine::new("success-chain");
    engine
        .task(ok_step("r1"))
        .success(move |v| e1.push(format!("success:{}", v)))
        .task(ok_step("r2"))
        .success(move |v| e2.push(format!("success:{}", v)))
        .complete(move |results| e3.push(format!("complete:{}", results.len())))
        .error(move |_| e4.push("error"))
        .always(move |results, errors| {
            e5.push(format!("always:{}:{}", results.len(), errors.iter().flatten().count()))
        });

    assert_eq!(engine.exec().await, RunState::Done);

    assert_eq!(
        events.all(),
        vec!["success:r1", "success:r2", "complete:2", "always:2:0"]
    );
    assert_eq!(engine.statuses(), &[true, true]);
    assert_eq!(engine.errors(), &[None, None]);
    assert!(!engine.has_error());
}

/// Test that each step receives the previous step's result
#[tokio::test]
async fn test_previous_result_threads_through() {
    let mut engine = Engine::new("threaded");
    engine
        .task(|_| async { Ok("1".to_string()) })
        .task(|prev: Previous<String, String>| async move {
            let n: u32 = prev.result().unwrap().parse().unwrap();
            Ok((n + 1).to_string())
        })
        .task(|prev: Previous<String, String>| async move {
            let n: u32 = prev.result().unwrap().parse().unwrap();
            Ok((n * 10).to_string())
        });

    engine.exec().await;

    assert_eq!(engine.last_result(), Some(&"20".to_string()));
}

/// Test that terminal hooks fire at their registered position
#[tokio::test]
async fn test_interleaved_terminal_hooks() {
    let events = Events::new();
    let (a1, a2, c1, s3) = (events.clone(), events.clone(), events.clone(), events.clone());

    let mut engine = Engine::new("interleaved");
    engine
        .task(ok_step("r1"))
        .always(move |results, _| a1.push(format!("always:{}", results.len())))
        .complete(move |results| c1.push(format!("complete:{}", results.len())))
        .task(ok_step("r2"))
        .success(move |v| s3.push(format!("success:{}", v)))
        .always(move |results, _| a2.push(format!("always:{}", results.len())));

    engine.exec().await;

    assert_eq!(
        events.all(),
        vec!["always:1", "complete:1", "success:r2", "always:2"]
    );
}

/// Test that a completed pipeline can be looked up by step name
#[tokio::test]
async fn test_named_results() {
    let mut engine = Engine::new("named");
    engine
        .named_task("check", ok_step("session"))
        .always(|_, _| {})
        .named_task("fetch", ok_step("profile"));

    engine.exec().await;

    assert_eq!(engine.result_by_name("check"), Some(&"session".to_string()));
    assert_eq!(engine.result_by_name("fetch"), Some(&"profile".to_string()));
}
