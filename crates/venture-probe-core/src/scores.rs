//! Score vector and reference valuation model.
//!
//! Scores are derived from questionnaire answers with fixed thresholds so a
//! scenario always yields the same vector. The reference valuation is a
//! scorecard estimate bounded by the stage cap; it is what the harness
//! expects a sane service to be in the neighbourhood of.

use serde::{Deserialize, Serialize};

use crate::corpus::{questions, ScenarioCase};
use crate::stage::Stage;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

/// Six dimension scores, each in `[1, 5]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreVector {
    pub team: f64,
    pub product: f64,
    pub market: f64,
    pub sales: f64,
    pub financing: f64,
    pub competitive: f64,
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        MIN_SCORE
    } else {
        value.clamp(MIN_SCORE, MAX_SCORE)
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Map a value onto 1..=5 using ascending thresholds for scores 2, 3, 4, 5.
fn tiered(value: f64, thresholds: [f64; 4]) -> f64 {
    let reached = thresholds.iter().filter(|t| value >= **t).count();
    1.0 + reached as f64
}

impl ScoreVector {
    /// Build a vector, clamping every score into range.
    pub fn new(
        team: f64,
        product: f64,
        market: f64,
        sales: f64,
        financing: f64,
        competitive: f64,
    ) -> Self {
        ScoreVector {
            team: clamp_score(team),
            product: clamp_score(product),
            market: clamp_score(market),
            sales: clamp_score(sales),
            financing: clamp_score(financing),
            competitive: clamp_score(competitive),
        }
    }

    /// Derive scores from a scenario's questionnaire.
    pub fn from_scenario(case: &ScenarioCase) -> Self {
        let team_size = case.number(questions::TEAM_SIZE).unwrap_or(1.0);
        let experience = case
            .number(questions::FOUNDER_EXPERIENCE_YEARS)
            .unwrap_or(0.0);
        let team = tiered(team_size, [2.0, 4.0, 10.0, 50.0]) * 0.8
            + if experience >= 10.0 {
                1.0
            } else if experience >= 5.0 {
                0.5
            } else {
                0.0
            };

        let product = 1.0 + case.stage.ordinal() as f64 * 0.8;

        let market = match case.number(questions::MARKET_SIZE) {
            Some(size) => tiered(size, [1e7, 1e8, 1e9, 1e10]),
            None if case.text(questions::TARGET_MARKET).is_some() => 2.5,
            None => MIN_SCORE,
        };

        let revenue = non_negative(case.number(questions::MONTHLY_REVENUE).unwrap_or(0.0));
        let sales = if revenue == 0.0 {
            MIN_SCORE
        } else {
            tiered(revenue, [0.0, 1e4, 1e5, 1e6])
        };

        let raised = non_negative(case.number(questions::INVESTMENT_RAISED).unwrap_or(0.0));
        let financing = if raised == 0.0 {
            MIN_SCORE
        } else {
            tiered(raised, [0.0, 5e5, 5e6, 5e7])
        };

        let advantage = case
            .text(questions::UNIQUE_ADVANTAGE)
            .map_or(0.0, |a| if a.len() >= 20 { 1.5 } else { 0.5 });
        let awareness = if case.declared_competitors().is_empty() {
            0.0
        } else {
            1.0
        };
        let competitive = 2.0 + advantage + awareness;

        Self::new(team, product, market, sales, financing, competitive)
    }

    /// Weighted mean of the six scores, in `[1, 5]`.
    pub fn weighted_mean(&self) -> f64 {
        self.team * 0.25
            + self.product * 0.15
            + self.market * 0.20
            + self.sales * 0.15
            + self.financing * 0.10
            + self.competitive * 0.15
    }
}

/// Scorecard valuation for a company, bounded to `(0, 1.5 × stage cap]`.
///
/// `monthly_revenue` contributes at a 5x ARR multiple and half of the
/// capital raised is added as a floor for funded companies.
pub fn reference_valuation(
    stage: Stage,
    scores: &ScoreVector,
    investment_raised: f64,
    monthly_revenue: f64,
) -> f64 {
    let cap = stage.cap();
    let scorecard = cap * 0.4 * (scores.weighted_mean() / 3.0);
    let revenue_multiple = non_negative(monthly_revenue) * 12.0 * 5.0;
    let capital = non_negative(investment_raised) * 0.5;

    let estimate = scorecard + revenue_multiple + capital;
    estimate.clamp(cap * 0.01, stage.valuation_limit())
}
