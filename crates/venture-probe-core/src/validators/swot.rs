//! SWOT response validator.

use serde_json::Value;

use super::{lookup, scopes, ValidationContext, ValidationReport};

pub const SWOT_SECTIONS: [&str; 4] = ["strengths", "weaknesses", "opportunities", "threats"];

fn is_meaningful(entry: &Value) -> bool {
    match entry {
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
        _ => true,
    }
}

/// Four non-empty lists: strengths, weaknesses, opportunities, threats.
pub fn validate(body: &Value, _context: &ValidationContext) -> ValidationReport {
    let mut report = ValidationReport::new();
    let scopes = scopes(body, &["swot", "swotAnalysis"]);

    for section in SWOT_SECTIONS {
        match lookup(&scopes, &[section]) {
            None => report.violation(format!("missing SWOT section: {}", section)),
            Some(Value::Array(items)) => {
                if !items.iter().any(is_meaningful) {
                    report.violation(format!("SWOT section '{}' is empty", section));
                }
            }
            Some(_) => report.violation(format!("SWOT section '{}' is not a list", section)),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use serde_json::json;

    fn ctx() -> ValidationContext {
        ValidationContext::for_stage(Stage::Beta)
    }

    #[test]
    fn test_complete_swot() {
        let body = json!({"swot": {
            "strengths": ["Clinical founder"],
            "weaknesses": ["Small sales team"],
            "opportunities": [{"title": "Regional rollout"}],
            "threats": ["Incumbent EHR vendors"]
        }});
        assert!(validate(&body, &ctx()).is_valid());
    }

    #[test]
    fn test_empty_and_missing_sections() {
        let body = json!({
            "strengths": ["x"],
            "weaknesses": [],
            "opportunities": ["", "  "]
        });
        let report = validate(&body, &ctx());
        assert_eq!(
            report.violations,
            vec![
                "SWOT section 'weaknesses' is empty".to_string(),
                "SWOT section 'opportunities' is empty".to_string(),
                "missing SWOT section: threats".to_string(),
            ]
        );
    }

    #[test]
    fn test_section_must_be_list() {
        let body = json!({
            "strengths": "many",
            "weaknesses": ["a"],
            "opportunities": ["b"],
            "threats": ["c"]
        });
        let report = validate(&body, &ctx());
        assert_eq!(report.violations, vec!["SWOT section 'strengths' is not a list".to_string()]);
    }
}
