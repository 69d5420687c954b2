//! Structured lifecycle events for harness runs.
//!
//! Every event carries an `event` field (`run.started`, `scenario.finished`,
//! ...) and the run id, so JSON logs can be filtered per run.

use tracing::{info, warn};

use crate::outcome::{ScenarioOutcome, TestOutcome};

/// RAII guard that enters a scenario-scoped span.
///
/// ```ignore
/// let _span = ScenarioSpan::enter("run-1", "idea-greenroute");
/// ```
pub struct ScenarioSpan {
    _span: tracing::span::EnteredSpan,
}

impl ScenarioSpan {
    pub fn enter(run_id: &str, scenario_id: &str) -> Self {
        Self {
            _span: scenario_span(run_id, scenario_id).entered(),
        }
    }
}

/// Span for one scenario; use with `Instrument` across await points.
pub fn scenario_span(run_id: &str, scenario_id: &str) -> tracing::Span {
    tracing::info_span!("venture_probe.scenario", run_id = %run_id, scenario_id = %scenario_id)
}

pub fn emit_run_started(run_id: &str, scenarios: usize, endpoints: usize) {
    info!(
        event = "run.started",
        run_id = %run_id,
        scenarios = scenarios,
        endpoints = endpoints,
    );
}

pub fn emit_scenario_started(run_id: &str, scenario_id: &str, category: &str) {
    info!(
        event = "scenario.started",
        run_id = %run_id,
        scenario_id = %scenario_id,
        category = %category,
    );
}

/// Emit event: one endpoint call checked.
pub fn emit_endpoint_checked(run_id: &str, outcome: &TestOutcome) {
    if outcome.passed {
        info!(
            event = "endpoint.checked",
            run_id = %run_id,
            endpoint = %outcome.endpoint,
            status = outcome.status.unwrap_or_default(),
            latency_ms = outcome.latency_ms,
            passed = true,
        );
    } else {
        warn!(
            event = "endpoint.checked",
            run_id = %run_id,
            endpoint = %outcome.endpoint,
            status = outcome.status.unwrap_or_default(),
            latency_ms = outcome.latency_ms,
            passed = false,
            violations = outcome.violations.len(),
            error = outcome.error.as_deref().unwrap_or(""),
        );
    }
}

pub fn emit_scenario_finished(run_id: &str, outcome: &ScenarioOutcome) {
    info!(
        event = "scenario.finished",
        run_id = %run_id,
        scenario_id = %outcome.scenario_id,
        passed = outcome.passed_count(),
        failed = outcome.failed_count(),
        aborted = outcome.aborted.is_some(),
    );
}

/// Emit event: a scenario errored or panicked and was recorded as all-failed.
pub fn emit_scenario_aborted(run_id: &str, scenario_id: &str, reason: &str) {
    warn!(
        event = "scenario.aborted",
        run_id = %run_id,
        scenario_id = %scenario_id,
        reason = %reason,
    );
}

pub fn emit_run_finished(run_id: &str, duration_ms: u64, passed: usize, total: usize) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        passed = passed,
        total = total,
    );
}
