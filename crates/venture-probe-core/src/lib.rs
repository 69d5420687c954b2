//! Venture-Probe Core - validation and latency harness for the venture
//! analysis API
//!
//! Drives a corpus of persona scenarios against the service:
//! - Authenticates a synthetic identity per scenario and saves its questionnaire
//! - Calls the analysis endpoint battery with pacing between expensive calls
//! - Checks every response against domain invariants
//! - Rolls outcomes and latency percentiles up into a gated report

pub mod config;
pub mod corpus;
pub mod endpoint;
pub mod error;
pub mod fakes;
pub mod latency;
pub mod obs;
pub mod orchestrator;
pub mod outcome;
pub mod report;
pub mod scores;
pub mod stage;
pub mod telemetry;
pub mod validators;

// Re-export key types
pub use config::HarnessConfig;
pub use corpus::{builtin_corpus, corpus_digest, load_corpus, validate_corpus, ScenarioCase};
pub use endpoint::Endpoint;
pub use error::{HarnessError, Result};
pub use latency::{percentile, LatencyAggregator, LatencySummary};
pub use obs::{
    emit_endpoint_checked, emit_run_finished, emit_run_started, emit_scenario_aborted,
    emit_scenario_finished, emit_scenario_started, ScenarioSpan,
};
pub use orchestrator::{Credentials, PacingConfig, ScenarioRunner};
pub use outcome::{CategoryAggregate, RunAccumulator, ScenarioOutcome, TestOutcome};
pub use report::{write_report_json, HarnessReport, LatencyRating, Verdict};
pub use scores::{reference_valuation, ScoreVector};
pub use stage::Stage;
pub use telemetry::init_tracing;
pub use validators::{ResponseKind, ValidationContext, ValidationReport, ValidatorRegistry};
