//! Test: Config Pipeline - pipelines built from YAML

use taskline::core::config::PipelineConfig;
use taskline::{HookEvent, HookLog, RunState};

/// Test the fail-stop login scenario described in YAML
#[tokio::test]
async fn test_yaml_fail_stop_scenario() {
    let yaml = r#"
name: "Test: Fail Stop"
description: "Second task stops the run"

steps:
  - kind: task
    name: "check"
    outcome:
      succeed: "r1"
    on_success: "session checked"

  - kind: task
    name: "verify"
    delay_ms: 5
    outcome:
      fail: "bad-credentials"
    on_fail_stop: "giving up"

  - kind: task
    name: "fetch"
    outcome:
      succeed: "r3"
    on_success: "fetched"

  - kind: always
    message: "cleanup"
"#;

    let config = PipelineConfig::from_yaml(yaml).unwrap();
    let log = HookLog::new();
    let mut engine = config.to_engine(&log);

    assert_eq!(engine.exec().await, RunState::Done);

    assert_eq!(log.hook_names(), vec!["success", "fail_stop", "always"]);
    match &log.snapshot()[2] {
        HookEvent::Always { results, errors, .. } => {
            assert_eq!(results, &vec![Some("r1".to_string()), None]);
            assert_eq!(errors, &vec![None, Some("bad-credentials".to_string())]);
        }
        other => panic!("Expected always event, got {:?}", other),
    }
    assert_eq!(engine.result_by_name("fetch"), None);
}

/// Test that error and complete entries follow has_error
#[tokio::test]
async fn test_yaml_error_branch() {
    let yaml = r#"
name: "Test: Error Branch"
steps:
  - kind: task
    outcome:
      fail: "offline"
    on_fail: "noted"
  - kind: complete
    message: "all good"
  - kind: error
    message: "something failed"
"#;

    let config = PipelineConfig::from_yaml(yaml).unwrap();
    let log = HookLog::new();
    let mut engine = config.to_engine(&log);

    engine.exec().await;

    assert_eq!(log.hook_names(), vec!["fail", "error"]);
    assert!(engine.has_error());
}

/// Test that aborting a configured pipeline records the aborted event
#[tokio::test]
async fn test_yaml_abort_records_event() {
    let yaml = r#"
name: "Test: Abort"
steps:
  - kind: task
    outcome:
      succeed: "never"
    on_success: "ran"
  - kind: always
"#;

    let config = PipelineConfig::from_yaml(yaml).unwrap();
    let log = HookLog::new();
    let mut engine = config.to_engine(&log);

    engine.abort();
    assert_eq!(engine.exec().await, RunState::Aborted);
    assert_eq!(log.hook_names(), vec!["aborted"]);
}
