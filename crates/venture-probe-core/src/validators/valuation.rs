//! Valuation response validator.

use serde_json::Value;

use super::market::{check_triple, MarketTriple};
use super::{lookup_number, lookup_text, scopes, ValidationContext, ValidationReport};
use crate::stage::ABSOLUTE_VALUATION_CEILING;

const VALUATION_WRAPPERS: &[&str] = &["valuation"];
const TOTAL_KEYS: &[&str] = &[
    "totalValuation",
    "total_valuation",
    "valuation",
    "total",
    "amount",
];
const METHODOLOGY_KEYS: &[&str] = &["methodology", "method", "valuationMethod"];

/// Total valuation reported by the service, if any.
pub fn extract_total(body: &Value) -> Option<f64> {
    lookup_number(&scopes(body, VALUATION_WRAPPERS), TOTAL_KEYS)
}

/// Check total, methodology, and the market triple against stage caps.
pub fn validate(body: &Value, context: &ValidationContext) -> ValidationReport {
    let mut report = ValidationReport::new();
    let scopes = scopes(body, VALUATION_WRAPPERS);

    match lookup_number(&scopes, TOTAL_KEYS) {
        None => report.violation("missing field: totalValuation"),
        Some(total) => {
            if total <= 0.0 {
                report.violation(format!("valuation must be positive (got {})", total));
            }
            if total > ABSOLUTE_VALUATION_CEILING {
                report.violation(format!(
                    "valuation {} exceeds absolute ceiling {}",
                    total, ABSOLUTE_VALUATION_CEILING
                ));
            }
            let limit = context.stage.valuation_limit();
            if total > limit {
                report.violation(format!(
                    "valuation {} exceeds 1.5x {} stage cap ({})",
                    total, context.stage, limit
                ));
            }
            if let Some(range) = context.expected_valuation {
                if !range.contains(total) {
                    report.note(format!(
                        "valuation {} outside expected range [{}, {}]",
                        total, range.min, range.max
                    ));
                }
            }
        }
    }

    if lookup_text(&scopes, METHODOLOGY_KEYS).is_none() {
        report.violation("missing field: methodology");
    }

    check_triple(&MarketTriple::extract(body), &mut report);
    report
}
