//! Questionnaire completeness validator.

use serde_json::Value;

use super::{ValidationContext, ValidationReport};
use crate::corpus::questions;

/// Flag required questions that are absent, null, or empty.
pub fn check_required(responses: &Value, required: &[&str]) -> ValidationReport {
    let mut report = ValidationReport::new();
    if !responses.is_object() {
        report.violation("questionnaire responses are not an object");
        return report;
    }

    for key in required {
        match responses.get(*key) {
            None => report.violation(format!("required question missing: {}", key)),
            Some(Value::Null) => report.violation(format!("required question is null: {}", key)),
            Some(Value::String(s)) if s.trim().is_empty() => {
                report.violation(format!("required question is empty: {}", key))
            }
            Some(Value::Array(items)) if items.is_empty() => {
                report.violation(format!("required question is empty: {}", key))
            }
            Some(_) => {}
        }
    }
    report
}

/// Completeness against the standard required question list.
pub fn validate(responses: &Value, _context: &ValidationContext) -> ValidationReport {
    check_required(responses, questions::REQUIRED)
}
