//! Competitor discovery validator.
//!
//! Generated competitor lists tend to degrade into placeholders such as
//! "Startup A" or "Industry Leader". Those are violations; real company
//! names must pass untouched.

use std::sync::OnceLock;

use regex::RegexSet;
use serde::Serialize;
use serde_json::Value;

use super::{lookup, scopes, ValidationContext, ValidationReport};

const PLACEHOLDER_PATTERNS: &[&str] = &[
    r"(?i)^startup\s*[a-z0-9]$",
    r"(?i)^competitor\s*(?:[a-z]|\d+)$",
    r"(?i)^company\s*(?:[a-z]|\d+)$",
    r"(?i)^(?:player|rival|vendor|brand)\s*(?:[a-z]|\d+)$",
    r"(?i)^(?:the\s+)?(?:industry|market)\s+leaders?$",
    r"(?i)^(?:example|sample|generic|placeholder|unknown|fictional)\s+(?:competitor|company|startup|business)$",
    r"(?i)^(?:competitor|company)\s+name$",
    r"(?i)^(?:tbd|n/?a|none)$",
];

fn placeholder_patterns() -> &'static RegexSet {
    static PATTERNS: OnceLock<RegexSet> = OnceLock::new();
    PATTERNS.get_or_init(|| RegexSet::new(PLACEHOLDER_PATTERNS).unwrap_or_else(|_| RegexSet::empty()))
}

/// Whether a competitor name is a generic placeholder.
pub fn is_placeholder_name(name: &str) -> bool {
    placeholder_patterns().is_match(name.trim())
}

/// Breakdown of a competitor list.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CompetitorAudit {
    /// Entries with a real name and a description
    pub valid: Vec<String>,
    /// Entries whose name matched a placeholder pattern
    pub placeholders: Vec<String>,
    /// Declared competitors found among returned names
    pub matched_declared: Vec<String>,
}

fn competitor_list(body: &Value) -> Option<&Vec<Value>> {
    if let Value::Array(items) = body {
        return Some(items);
    }
    lookup(&scopes(body, &[]), &["competitors"]).and_then(Value::as_array)
}

fn entry_text<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| entry.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Audit a competitor response, returning the breakdown and its findings.
pub fn audit(body: &Value, context: &ValidationContext) -> (CompetitorAudit, ValidationReport) {
    let mut audit = CompetitorAudit::default();
    let mut report = ValidationReport::new();

    let Some(items) = competitor_list(body) else {
        report.violation("competitors response is not a list");
        return (audit, report);
    };
    if items.is_empty() {
        report.violation("no competitors returned");
        return (audit, report);
    }

    let mut returned_names = Vec::new();
    for (index, entry) in items.iter().enumerate() {
        if !entry.is_object() {
            report.violation(format!("competitor #{} is not an object", index + 1));
            continue;
        }
        let Some(name) = entry_text(entry, &["name", "companyName", "company"]) else {
            report.violation(format!("competitor #{} missing name", index + 1));
            continue;
        };
        returned_names.push(name.to_lowercase());

        if is_placeholder_name(name) {
            report.violation(format!("fake competitor name: '{}'", name));
            audit.placeholders.push(name.to_string());
            continue;
        }
        if entry_text(entry, &["description", "summary", "overview"]).is_none() {
            report.violation(format!("competitor '{}' missing description", name));
            continue;
        }
        audit.valid.push(name.to_string());
    }

    if audit.valid.is_empty() {
        report.violation("no valid competitors");
    }

    for declared in &context.declared_competitors {
        let needle = declared.trim().to_lowercase();
        if !needle.is_empty() && returned_names.iter().any(|n| n.contains(&needle)) {
            audit.matched_declared.push(declared.clone());
        }
    }
    if !context.declared_competitors.is_empty() {
        if audit.matched_declared.is_empty() {
            report.note(format!(
                "none of the declared competitors ({}) appear in results",
                context.declared_competitors.join(", ")
            ));
        } else {
            report.note(format!(
                "declared competitors found: {}",
                audit.matched_declared.join(", ")
            ));
        }
    }

    (audit, report)
}

/// Competitor validator.
pub fn validate(body: &Value, context: &ValidationContext) -> ValidationReport {
    audit(body, context).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use serde_json::json;

    fn ctx() -> ValidationContext {
        ValidationContext::for_stage(Stage::Mvp)
    }

    fn fake_name_count(report: &ValidationReport) -> usize {
        report
            .violations
            .iter()
            .filter(|v| v.starts_with("fake competitor name"))
            .count()
    }

    #[test]
    fn test_placeholder_names_rejected() {
        for name in [
            "Startup A",
            "startup b",
            "StartupC",
            "Competitor 1",
            "competitor B",
            "Company X",
            "Industry Leader",
            "The Market Leader",
            "Generic Competitor",
            "Player 2",
            "N/A",
        ] {
            assert!(is_placeholder_name(name), "{} should be a placeholder", name);
        }
    }

    #[test]
    fn test_real_company_names_accepted() {
        for name in [
            "Stripe",
            "Startup Grind",
            "CompetitorIQ",
            "Company.com",
            "Leader Bank",
            "Xero",
            "Industry Dive",
            "A",
            "Klaviyo",
            "Click & Grow",
        ] {
            assert!(!is_placeholder_name(name), "{} is a real name", name);
        }
    }

    #[test]
    fn test_single_placeholder_entry() {
        let (audit, report) = audit(&json!([{"name": "Startup A"}]), &ctx());
        assert_eq!(fake_name_count(&report), 1);
        assert!(audit.valid.is_empty());
        assert_eq!(audit.placeholders, vec!["Startup A".to_string()]);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_valid_list_under_key() {
        let body = json!({"competitors": [
            {"name": "QuickBooks", "description": "Accounting suite for SMBs"},
            {"name": "Xero", "description": "Cloud accounting", "valuation": 1.2e10}
        ]});
        let (audit, report) = audit(&body, &ctx());
        assert!(report.is_valid(), "{:?}", report.violations);
        assert_eq!(audit.valid.len(), 2);
    }

    #[test]
    fn test_missing_description_and_name() {
        let body = json!({"competitors": [
            {"name": "Xero"},
            {"description": "nameless"},
            "just a string"
        ]});
        let report = validate(&body, &ctx());
        assert!(report.violations.contains(&"competitor 'Xero' missing description".to_string()));
        assert!(report.violations.contains(&"competitor #2 missing name".to_string()));
        assert!(report.violations.contains(&"competitor #3 is not an object".to_string()));
    }

    #[test]
    fn test_empty_and_non_list() {
        assert_eq!(
            validate(&json!({"competitors": []}), &ctx()).violations,
            vec!["no competitors returned".to_string()]
        );
        assert_eq!(
            validate(&json!({"message": "rate limited"}), &ctx()).violations,
            vec!["competitors response is not a list".to_string()]
        );
    }

    #[test]
    fn test_declared_competitor_cross_check_is_informational() {
        let mut context = ctx();
        context.declared_competitors = vec!["xero".to_string(), "Sage".to_string()];
        let body = json!([{"name": "Xero Limited", "description": "Cloud accounting"}]);
        let (audit, report) = audit(&body, &context);
        assert!(report.is_valid());
        assert_eq!(audit.matched_declared, vec!["xero".to_string()]);
        assert!(report.notes[0].contains("xero"));
    }
}
