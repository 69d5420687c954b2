//! Checks that a free-text sub-category shows up in generated output.

use serde_json::Value;

use super::{ValidationContext, ValidationReport};
use crate::corpus::CATCH_ALL_CATEGORY;

/// Split a sub-category on whitespace and hyphens, lowercased.
pub fn tokenize(custom_category: &str) -> Vec<String> {
    custom_category
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Every string value and object key in `body`, lowercased.
fn text_fragments(body: &Value, out: &mut Vec<String>) {
    match body {
        Value::String(s) => out.push(s.to_lowercase()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Array(items) => items.iter().for_each(|item| text_fragments(item, out)),
        Value::Object(map) => {
            for (key, value) in map {
                out.push(key.to_lowercase());
                text_fragments(value, out);
            }
        }
        Value::Null | Value::Bool(_) => {}
    }
}

/// True when `token` occurs in `text` with no letter or digit on either side.
fn contains_word(text: &str, token: &str) -> bool {
    text.match_indices(token).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + token.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Applies only to the catch-all category with a sub-category set.
///
/// A token counts when it appears as a whole word in any string value or key
/// of the body.
pub fn validate(body: &Value, context: &ValidationContext) -> ValidationReport {
    let mut report = ValidationReport::new();
    if !context.category.eq_ignore_ascii_case(CATCH_ALL_CATEGORY) {
        return report;
    }
    let Some(custom) = context.custom_category.as_deref() else {
        return report;
    };
    let tokens = tokenize(custom);
    if tokens.is_empty() {
        return report;
    }

    let mut fragments = Vec::new();
    text_fragments(body, &mut fragments);
    let reflected = tokens
        .iter()
        .find(|t| fragments.iter().any(|text| contains_word(text, t)));
    match reflected {
        Some(token) => report.note(format!("custom category reflected via '{}'", token)),
        None => report.violation("custom category not reflected"),
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use serde_json::json;

    fn ctx(category: &str, custom: Option<&str>) -> ValidationContext {
        let mut ctx = ValidationContext::for_stage(Stage::Mvp);
        ctx.category = category.to_string();
        ctx.custom_category = custom.map(str::to_string);
        ctx
    }

    #[test]
    fn test_tokenize_on_whitespace_and_hyphen() {
        assert_eq!(
            tokenize("pet-wellness  Wearables"),
            vec!["pet".to_string(), "wellness".to_string(), "wearables".to_string()]
        );
        assert!(tokenize(" - ").is_empty());
    }

    #[test]
    fn test_reflected_token_passes() {
        let body = json!({"strengths": ["Strong position in WELLNESS for pets"]});
        let report = validate(&body, &ctx("Other", Some("pet-wellness wearables")));
        assert!(report.is_valid());
        assert_eq!(report.notes.len(), 1);
    }

    #[test]
    fn test_missing_token_fails() {
        let body = json!({"strengths": ["Great fintech product"]});
        let report = validate(&body, &ctx("other", Some("Urban Hydroponics")));
        assert_eq!(report.violations, vec!["custom category not reflected".to_string()]);
    }

    #[test]
    fn test_token_inside_longer_word_does_not_count() {
        let body = json!({"competitors": [{"name": "Carpetly"}]});
        let report = validate(&body, &ctx("Other", Some("pet-wellness wearables")));
        assert!(!report.is_valid());
    }

    #[test]
    fn test_token_after_escaped_newline_counts() {
        let body = json!({"strengths": ["Strong brand.\nPet owners love it"]});
        let report = validate(&body, &ctx("Other", Some("pet-wellness")));
        assert!(report.is_valid(), "{:?}", report.violations);
    }

    #[test]
    fn test_token_with_punctuation_counts() {
        let body = json!({"strengths": ["Leading AI/ML platform"]});
        assert!(validate(&body, &ctx("Other", Some("AI/ML"))).is_valid());

        let body = json!({"gtm": {"channels": ["C++ tooling communities"]}});
        assert!(validate(&body, &ctx("Other", Some("C++ tooling"))).is_valid());
    }

    #[test]
    fn test_not_applicable_outside_catch_all() {
        let body = json!({});
        assert!(validate(&body, &ctx("FinTech", Some("payments"))).is_valid());
        assert!(validate(&body, &ctx("Other", None)).is_valid());
    }
}
