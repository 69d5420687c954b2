//! Test outcomes and the run accumulator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use venture_probe_client::CallResult;

use crate::corpus::ScenarioCase;
use crate::endpoint::Endpoint;
use crate::latency::LatencyAggregator;
use crate::validators::ValidationReport;

/// Longest raw-body excerpt attached to a failed outcome.
const RAW_EXCERPT_CHARS: usize = 200;

/// Result of one endpoint call after validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestOutcome {
    /// Endpoint name.
    pub endpoint: String,

    /// HTTP status; `None` when no response arrived.
    pub status: Option<u16>,

    /// Latency across all attempts, in milliseconds.
    pub latency_ms: u64,

    /// Attempts performed; 0 when the call was never sent.
    pub attempts: u32,

    /// Whether the call passed.
    pub passed: bool,

    /// Invariant violations.
    pub violations: Vec<String>,

    /// Informational notes that never affect `passed`.
    pub notes: Vec<String>,

    /// Transport or parse error text.
    pub error: Option<String>,
}

impl TestOutcome {
    /// Classify a call and, when it succeeded, validate its body.
    ///
    /// 429 and 503 count as a pass with a note; other non-2xx statuses,
    /// transport failures and unparsable bodies fail without validation.
    pub fn evaluate<F>(endpoint: &str, call: &CallResult, validate: F) -> Self
    where
        F: FnOnce(&Value) -> ValidationReport,
    {
        let mut outcome = TestOutcome {
            endpoint: endpoint.to_string(),
            status: call.status,
            latency_ms: call.latency_ms,
            attempts: call.attempts,
            passed: false,
            violations: Vec::new(),
            notes: Vec::new(),
            error: None,
        };

        if call.is_backpressure() {
            outcome.passed = true;
            outcome.notes.push(format!(
                "HTTP {} backpressure: counted as pass, body not validated",
                call.status.unwrap_or_default()
            ));
            return outcome;
        }

        if let Some(error) = &call.error {
            outcome.error = Some(match call.raw_response() {
                Some(raw) => format!("{}; raw response: {}", error, excerpt(raw)),
                None => error.clone(),
            });
            return outcome;
        }

        match call.status {
            Some(status) if (200..300).contains(&status) => {
                let report = validate(&call.body);
                outcome.passed = report.is_valid();
                outcome.violations = report.violations;
                outcome.notes = report.notes;
            }
            Some(status) => {
                outcome.violations.push(format!("HTTP {}", status));
                if let Some(message) = error_message(&call.body) {
                    outcome.notes.push(format!("server said: {}", excerpt(message)));
                }
            }
            None => outcome.error = Some("no response received".to_string()),
        }
        outcome
    }

    /// A call whose status is expected and handled, recorded as passed.
    pub fn accepted(endpoint: &str, call: &CallResult, note: &str) -> Self {
        TestOutcome {
            endpoint: endpoint.to_string(),
            status: call.status,
            latency_ms: call.latency_ms,
            attempts: call.attempts,
            passed: true,
            violations: Vec::new(),
            notes: vec![note.to_string()],
            error: None,
        }
    }

    /// A battery endpoint recorded failed without being called.
    pub fn skipped(endpoint: &str, reason: &str) -> Self {
        TestOutcome {
            endpoint: endpoint.to_string(),
            status: None,
            latency_ms: 0,
            attempts: 0,
            passed: false,
            violations: Vec::new(),
            notes: Vec::new(),
            error: Some(format!("not executed: {}", reason)),
        }
    }
}

fn error_message(body: &Value) -> Option<&str> {
    ["error", "message"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= RAW_EXCERPT_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(RAW_EXCERPT_CHARS).collect();
        format!("{}...", cut)
    }
}

/// Everything recorded for one scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioOutcome {
    pub scenario_id: String,
    pub category: String,
    pub has_revenue: bool,

    /// Authentication and questionnaire calls; not counted in totals.
    pub setup: Vec<TestOutcome>,

    /// One outcome per battery endpoint.
    pub endpoints: Vec<TestOutcome>,

    /// Reason the scenario stopped early, if it did.
    pub aborted: Option<String>,
}

impl ScenarioOutcome {
    pub fn new(case: &ScenarioCase) -> Self {
        ScenarioOutcome {
            scenario_id: case.id.clone(),
            category: case.category.clone(),
            has_revenue: case.expectations.has_revenue,
            setup: Vec::new(),
            endpoints: Vec::new(),
            aborted: None,
        }
    }

    /// Every battery endpoint failed, for a scenario that errored or panicked.
    pub fn aborted(case: &ScenarioCase, battery: &[Endpoint], reason: &str) -> Self {
        let mut outcome = ScenarioOutcome::new(case);
        outcome.fail_remaining(battery, reason);
        outcome.aborted = Some(reason.to_string());
        outcome
    }

    /// Record every battery endpoint not yet recorded as failed.
    pub fn fail_remaining(&mut self, battery: &[Endpoint], reason: &str) {
        for endpoint in battery.iter().skip(self.endpoints.len()) {
            self.endpoints
                .push(TestOutcome::skipped(endpoint.name(), reason));
        }
    }

    /// Number of battery endpoints that passed.
    pub fn passed_count(&self) -> usize {
        self.endpoints.iter().filter(|o| o.passed).count()
    }

    /// Number of battery endpoints that failed.
    pub fn failed_count(&self) -> usize {
        self.endpoints.iter().filter(|o| !o.passed).count()
    }
}

/// Pass/fail counters for a group of outcomes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryAggregate {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
    #[serde(skip)]
    pub outcomes: Vec<TestOutcome>,
}

impl CategoryAggregate {
    pub fn record(&mut self, outcome: &TestOutcome) {
        if outcome.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.total += 1;
        self.outcomes.push(outcome.clone());
    }

    /// Passed share in percent; 0 when empty.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Run-wide state, threaded through the orchestrator and returned at the end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAccumulator {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub scenarios: Vec<ScenarioOutcome>,
    pub categories: BTreeMap<String, CategoryAggregate>,
    pub revenue: CategoryAggregate,
    pub pre_revenue: CategoryAggregate,
    pub overall: CategoryAggregate,
    pub latency: LatencyAggregator,
}

impl Default for RunAccumulator {
    fn default() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

impl RunAccumulator {
    pub fn new(run_id: String) -> Self {
        RunAccumulator {
            run_id,
            started_at: Utc::now(),
            scenarios: Vec::new(),
            categories: BTreeMap::new(),
            revenue: CategoryAggregate::default(),
            pre_revenue: CategoryAggregate::default(),
            overall: CategoryAggregate::default(),
            latency: LatencyAggregator::new(),
        }
    }

    /// Fold a finished scenario into the counters and latency samples.
    ///
    /// Only battery outcomes are counted. Latency is sampled for every call
    /// that reached the network, setup calls included.
    pub fn absorb(&mut self, scenario: ScenarioOutcome) {
        for outcome in scenario.setup.iter().chain(&scenario.endpoints) {
            if outcome.attempts > 0 {
                self.latency.record(&outcome.endpoint, outcome.latency_ms);
            }
        }

        let category = self
            .categories
            .entry(scenario.category.clone())
            .or_default();
        let split = if scenario.has_revenue {
            &mut self.revenue
        } else {
            &mut self.pre_revenue
        };
        for outcome in &scenario.endpoints {
            category.record(outcome);
            split.record(outcome);
            self.overall.record(outcome);
        }

        self.scenarios.push(scenario);
    }

    /// Battery outcomes across all scenarios, grouped by endpoint name.
    pub fn by_endpoint(&self) -> BTreeMap<String, CategoryAggregate> {
        let mut grouped: BTreeMap<String, CategoryAggregate> = BTreeMap::new();
        for outcome in self.scenarios.iter().flat_map(|s| &s.endpoints) {
            grouped
                .entry(outcome.endpoint.clone())
                .or_default()
                .record(outcome);
        }
        grouped
    }
}
