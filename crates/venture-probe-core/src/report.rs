//! Run report: overall efficiency, breakdowns, latency ratings and the
//! pass/fail gate.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::endpoint::{Endpoint, LOGIN_ENDPOINT, QUESTIONNAIRE_ENDPOINT, SIGNUP_ENDPOINT};
use crate::latency::LatencySummary;
use crate::outcome::{CategoryAggregate, RunAccumulator, ScenarioOutcome};

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// Overall verdict tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Excellent,
    Good,
    NeedsImprovement,
    Critical,
}

impl Verdict {
    /// Tier for an efficiency percentage.
    pub fn from_efficiency(efficiency: f64) -> Self {
        if efficiency >= 90.0 {
            Verdict::Excellent
        } else if efficiency >= 75.0 {
            Verdict::Good
        } else if efficiency >= 50.0 {
            Verdict::NeedsImprovement
        } else {
            Verdict::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Excellent => "EXCELLENT",
            Verdict::Good => "GOOD",
            Verdict::NeedsImprovement => "NEEDS IMPROVEMENT",
            Verdict::Critical => "CRITICAL",
        }
    }
}

/// p90 latency bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LatencyRating {
    Excellent,
    Good,
    Acceptable,
    Slow,
}

impl LatencyRating {
    pub fn from_p90(p90_ms: u64) -> Self {
        match p90_ms {
            0..=999 => LatencyRating::Excellent,
            1000..=2999 => LatencyRating::Good,
            3000..=4999 => LatencyRating::Acceptable,
            _ => LatencyRating::Slow,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LatencyRating::Excellent => "excellent",
            LatencyRating::Good => "good",
            LatencyRating::Acceptable => "acceptable",
            LatencyRating::Slow => "slow",
        }
    }
}

/// One row of a pass/fail breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BreakdownRow {
    pub name: String,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
    pub pass_rate: f64,
}

impl BreakdownRow {
    fn from_aggregate(name: &str, aggregate: &CategoryAggregate) -> Self {
        BreakdownRow {
            name: name.to_string(),
            passed: aggregate.passed,
            failed: aggregate.failed,
            total: aggregate.total,
            pass_rate: aggregate.pass_rate(),
        }
    }
}

/// Latency statistics for one endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LatencyRow {
    pub endpoint: String,
    pub summary: LatencySummary,
    pub rating: LatencyRating,
}

/// Full run report, printed and optionally written as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarnessReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub run_id: String,
    pub corpus_digest: String,
    pub scenario_count: usize,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
    /// Passed share of all battery outcomes, in percent
    pub efficiency: f64,
    pub verdict: Verdict,
    pub pass_threshold: f64,
    /// Whether efficiency reached the pass threshold
    pub passed_gate: bool,
    pub categories: Vec<BreakdownRow>,
    pub revenue: BreakdownRow,
    pub pre_revenue: BreakdownRow,
    pub features: Vec<BreakdownRow>,
    pub latency: Vec<LatencyRow>,
    pub setup_latency: Vec<LatencyRow>,
    pub scenarios: Vec<ScenarioOutcome>,
}

fn latency_rows<'a>(
    acc: &RunAccumulator,
    names: impl IntoIterator<Item = &'a str>,
) -> Vec<LatencyRow> {
    names
        .into_iter()
        .filter_map(|name| {
            acc.latency.summary(name).map(|summary| LatencyRow {
                endpoint: name.to_string(),
                rating: LatencyRating::from_p90(summary.p90),
                summary,
            })
        })
        .collect()
}

impl HarnessReport {
    /// Roll a finished run up into a report.
    pub fn build(
        acc: &RunAccumulator,
        battery: &[Endpoint],
        corpus_digest: &str,
        pass_threshold: f64,
    ) -> Self {
        let overall = &acc.overall;
        let efficiency = overall.pass_rate();

        let categories = acc
            .categories
            .iter()
            .map(|(name, aggregate)| BreakdownRow::from_aggregate(name, aggregate))
            .collect();

        let by_endpoint = acc.by_endpoint();
        let empty = CategoryAggregate::default();
        let features = battery
            .iter()
            .map(|e| BreakdownRow::from_aggregate(e.name(), by_endpoint.get(e.name()).unwrap_or(&empty)))
            .collect();

        HarnessReport {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            run_id: acc.run_id.clone(),
            corpus_digest: corpus_digest.to_string(),
            scenario_count: acc.scenarios.len(),
            passed: overall.passed,
            failed: overall.failed,
            total: overall.total,
            efficiency,
            verdict: Verdict::from_efficiency(efficiency),
            pass_threshold,
            passed_gate: efficiency >= pass_threshold,
            categories,
            revenue: BreakdownRow::from_aggregate("revenue", &acc.revenue),
            pre_revenue: BreakdownRow::from_aggregate("pre-revenue", &acc.pre_revenue),
            features,
            latency: latency_rows(acc, battery.iter().map(|e| e.name())),
            setup_latency: latency_rows(
                acc,
                [SIGNUP_ENDPOINT, LOGIN_ENDPOINT, QUESTIONNAIRE_ENDPOINT],
            ),
            scenarios: acc.scenarios.clone(),
        }
    }

    /// Human-readable report for stdout.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "Venture Probe Report")?;
        writeln!(out, "====================")?;
        writeln!(out, "Run:     {}", self.run_id)?;
        writeln!(out, "Corpus:  {} ({} scenarios)", short_digest(&self.corpus_digest), self.scenario_count)?;
        writeln!(out, "Result:  {}/{} passed, {} failed", self.passed, self.total, self.failed)?;
        writeln!(out, "Efficiency: {:.1}% [{}]", self.efficiency, self.verdict.label())?;
        writeln!(out)?;

        writeln!(out, "By category:")?;
        for row in &self.categories {
            write_row(out, row)?;
        }
        writeln!(out)?;

        writeln!(out, "By revenue:")?;
        write_row(out, &self.revenue)?;
        write_row(out, &self.pre_revenue)?;
        writeln!(out)?;

        writeln!(out, "By feature:")?;
        for row in &self.features {
            write_row(out, row)?;
        }
        writeln!(out)?;

        if !(self.latency.is_empty() && self.setup_latency.is_empty()) {
            writeln!(out, "Latency (ms):")?;
            writeln!(
                out,
                "  {:<20} {:>7} {:>7} {:>7} {:>7} {:>7} {:>9} {:>5}  rating",
                "endpoint", "p50", "p90", "p99", "min", "max", "avg", "n"
            )?;
            for row in self.latency.iter().chain(&self.setup_latency) {
                let s = &row.summary;
                writeln!(
                    out,
                    "  {:<20} {:>7} {:>7} {:>7} {:>7} {:>7} {:>9.1} {:>5}  {}",
                    row.endpoint, s.p50, s.p90, s.p99, s.min, s.max, s.avg, s.count,
                    row.rating.label()
                )?;
            }
            writeln!(out)?;
        }

        let failures: Vec<_> = self
            .scenarios
            .iter()
            .flat_map(|s| s.endpoints.iter().map(move |o| (s, o)))
            .filter(|(_, o)| !o.passed)
            .collect();
        if !failures.is_empty() {
            writeln!(out, "Failures:")?;
            for (scenario, outcome) in failures {
                let status = outcome
                    .status
                    .map_or_else(|| "---".to_string(), |s| s.to_string());
                writeln!(out, "  ✗ {} / {} [{}]", scenario.scenario_id, outcome.endpoint, status)?;
                if let Some(error) = &outcome.error {
                    writeln!(out, "      error: {}", error)?;
                }
                for violation in &outcome.violations {
                    writeln!(out, "      - {}", violation)?;
                }
            }
            writeln!(out)?;
        }

        let mark = if self.passed_gate { "✓" } else { "✗" };
        writeln!(
            out,
            "{} efficiency {:.1}% vs threshold {:.1}%",
            mark, self.efficiency, self.pass_threshold
        )
    }
}

fn write_row(out: &mut String, row: &BreakdownRow) -> std::fmt::Result {
    writeln!(
        out,
        "  {:<24} {:>4}/{:<4} {:>6.1}%",
        row.name, row.passed, row.total, row.pass_rate
    )
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

/// Write the report as pretty JSON.
pub fn write_report_json(path: &Path, report: &HarnessReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize harness report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
