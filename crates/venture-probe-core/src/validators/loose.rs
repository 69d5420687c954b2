//! Presence and length checks for free-form endpoints.

use serde_json::Value;

use super::{lookup, lookup_text, scopes, ValidationContext, ValidationReport};

/// Minimum serialized size for simulation and go-to-market payloads.
pub const MIN_PAYLOAD_CHARS: usize = 20;

fn non_empty_payload(body: &Value, label: &str) -> ValidationReport {
    let mut report = ValidationReport::new();
    let empty = match body {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => true,
    };
    if empty {
        report.violation(format!("{} response is empty", label));
    } else if body.to_string().len() < MIN_PAYLOAD_CHARS {
        report.violation(format!(
            "{} response is too short (< {} chars)",
            label, MIN_PAYLOAD_CHARS
        ));
    }
    report
}

/// News feed: a non-empty article list.
pub fn validate_news(body: &Value, _context: &ValidationContext) -> ValidationReport {
    let mut report = ValidationReport::new();
    let list = match body {
        Value::Array(items) => Some(items),
        _ => lookup(&scopes(body, &[]), &["news", "articles", "items", "results"])
            .and_then(Value::as_array),
    };
    match list {
        None => report.violation("news response has no article list"),
        Some(items) if items.is_empty() => report.violation("news feed is empty"),
        Some(_) => {}
    }
    report
}

/// Chat: a non-empty reply text.
pub fn validate_chat(body: &Value, _context: &ValidationContext) -> ValidationReport {
    let mut report = ValidationReport::new();
    if let Value::String(s) = body {
        if s.trim().is_empty() {
            report.violation("chat reply is empty");
        }
        return report;
    }
    let reply = lookup_text(
        &scopes(body, &[]),
        &["reply", "response", "message", "answer", "content"],
    );
    if reply.is_none() {
        report.violation("chat reply is empty");
    }
    report
}

pub fn validate_simulation(body: &Value, _context: &ValidationContext) -> ValidationReport {
    non_empty_payload(body, "simulation")
}

pub fn validate_gtm(body: &Value, _context: &ValidationContext) -> ValidationReport {
    non_empty_payload(body, "gtm")
}
