//! Observability tests for harness lifecycle tracing.

use std::sync::Arc;

use serde_json::json;
use tracing_test::traced_test;
use venture_probe_client::CallResult;
use venture_probe_core::endpoint::SIGNUP_PATH;
use venture_probe_core::fakes::{response, ScriptedTransport};
use venture_probe_core::{
    builtin_corpus, emit_endpoint_checked, emit_run_finished, emit_run_started,
    emit_scenario_aborted, emit_scenario_finished, emit_scenario_started, Endpoint,
    PacingConfig, ScenarioOutcome, ScenarioRunner, ScenarioSpan, TestOutcome,
};

/// Test: emit_run_started logs the run id and sizes
#[traced_test]
#[test]
fn test_emit_run_started_logs_run_id() {
    emit_run_started("run-123", 8, 7);
    assert!(logs_contain("run.started"));
    assert!(logs_contain("run-123"));
}

/// Test: emit_run_finished logs pass counts
#[traced_test]
#[test]
fn test_emit_run_finished_logs_counts() {
    emit_run_finished("run-456", 5000, 40, 56);
    assert!(logs_contain("run.finished"));
    assert!(logs_contain("total=56"));
}

/// Test: scenario start and finish events carry the scenario id
#[traced_test]
#[test]
fn test_emit_scenario_lifecycle() {
    let corpus = builtin_corpus();
    emit_scenario_started("run-1", &corpus[0].id, &corpus[0].category);
    emit_scenario_finished("run-1", &ScenarioOutcome::new(&corpus[0]));
    assert!(logs_contain("scenario.started"));
    assert!(logs_contain("scenario.finished"));
    assert!(logs_contain("idea-greenroute"));
}

/// Test: failed endpoint checks are logged at warn level
#[traced_test]
#[test]
fn test_emit_endpoint_checked_failure_warns() {
    let call = CallResult::not_sent("connection refused".to_string());
    let outcome = TestOutcome::evaluate("swot", &call, |_| Default::default());
    emit_endpoint_checked("run-2", &outcome);
    assert!(logs_contain("WARN"));
    assert!(logs_contain("endpoint.checked"));
    assert!(logs_contain("connection refused"));
}

/// Test: aborted scenarios are logged with their reason
#[traced_test]
#[test]
fn test_emit_scenario_aborted_logs_reason() {
    emit_scenario_aborted("run-3", "mvp-ledgerly", "scenario panicked: boom");
    assert!(logs_contain("scenario.aborted"));
    assert!(logs_contain("scenario panicked: boom"));
}

/// Test: ScenarioSpan::enter creates an entered span without panicking
#[traced_test]
#[test]
fn test_scenario_span_enter() {
    let span = ScenarioSpan::enter("run-4", "beta-medibridge");
    tracing::info!("inside scenario");
    drop(span);
    assert!(logs_contain("inside scenario"));
}

/// Test: a full run emits start, per-scenario and finish events
#[traced_test]
#[tokio::test]
async fn test_run_emits_lifecycle_events() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(SIGNUP_PATH, response(500, json!({"error": "down"}), 3)),
    );
    let runner = ScenarioRunner::new(transport, vec![Endpoint::News])
        .with_pacing(PacingConfig::none());

    let corpus = builtin_corpus();
    let acc = runner.run(&corpus[..1]).await;

    assert_eq!(acc.overall.failed, 1);
    assert!(logs_contain("run.started"));
    assert!(logs_contain("scenario.started"));
    assert!(logs_contain("scenario.finished"));
    assert!(logs_contain("run.finished"));
    assert!(logs_contain(&acc.run_id));
}
