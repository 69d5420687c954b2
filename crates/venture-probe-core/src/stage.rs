//! Company maturity stages and their valuation caps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute valuation ceiling regardless of stage.
pub const ABSOLUTE_VALUATION_CEILING: f64 = 2e11;

/// Multiplier applied to a stage cap to get the highest acceptable valuation.
pub const STAGE_CAP_TOLERANCE: f64 = 1.5;

/// Maturity stage of a company.
///
/// Deserializes from any casing of the label via [`Stage::parse`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String")]
pub enum Stage {
    Idea,
    #[serde(rename = "MVP")]
    Mvp,
    Beta,
    Launched,
    Growing,
    Established,
}

impl Stage {
    /// Every stage, earliest first.
    pub const ALL: [Stage; 6] = [
        Stage::Idea,
        Stage::Mvp,
        Stage::Beta,
        Stage::Launched,
        Stage::Growing,
        Stage::Established,
    ];

    /// Get the stage label as sent to the API.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Idea => "Idea",
            Stage::Mvp => "MVP",
            Stage::Beta => "Beta",
            Stage::Launched => "Launched",
            Stage::Growing => "Growing",
            Stage::Established => "Established",
        }
    }

    /// Maximum plausible valuation for the stage.
    pub fn cap(&self) -> f64 {
        match self {
            Stage::Idea => 1e7,
            Stage::Mvp => 3e7,
            Stage::Beta => 5e7,
            Stage::Launched => 1.5e8,
            Stage::Growing => 5e8,
            Stage::Established => 2e9,
        }
    }

    /// Highest valuation accepted before it is flagged.
    pub fn valuation_limit(&self) -> f64 {
        self.cap() * STAGE_CAP_TOLERANCE
    }

    /// Zero-based position, earliest stage first.
    pub fn ordinal(&self) -> usize {
        Stage::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// Parse a stage label, ignoring case.
    pub fn parse(label: &str) -> Option<Stage> {
        let label = label.trim();
        Stage::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(label))
    }
}

impl TryFrom<String> for Stage {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Stage::parse(&label).ok_or_else(|| format!("unknown stage '{}'", label))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
