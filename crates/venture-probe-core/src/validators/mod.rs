//! Domain validators for AI-generated analysis output.
//!
//! Each validator is a pure function from a response body and a
//! [`ValidationContext`] to a [`ValidationReport`]. Validators never panic;
//! unexpected shapes become violation strings. The [`ValidatorRegistry`]
//! maps a [`ResponseKind`] to the validators that apply to it.

pub mod competitors;
pub mod custom_category;
pub mod loose;
pub mod market;
pub mod questionnaire;
pub mod swot;
pub mod valuation;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::corpus::{as_number, ScenarioCase, ValuationRange};
use crate::stage::Stage;

/// Kind of response body a validator understands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Questionnaire,
    Valuation,
    Competitors,
    Swot,
    News,
    Chat,
    Simulation,
    Gtm,
}

/// Scenario facts a validator may consult.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationContext {
    pub stage: Stage,
    pub category: String,
    pub custom_category: Option<String>,
    pub declared_competitors: Vec<String>,
    pub expected_valuation: Option<ValuationRange>,
}

impl ValidationContext {
    /// Context with only a stage set.
    pub fn for_stage(stage: Stage) -> Self {
        ValidationContext {
            stage,
            category: String::new(),
            custom_category: None,
            declared_competitors: Vec::new(),
            expected_valuation: None,
        }
    }

    pub fn for_scenario(case: &ScenarioCase) -> Self {
        ValidationContext {
            stage: case.stage,
            category: case.category.clone(),
            custom_category: case.custom_category.clone(),
            declared_competitors: case.declared_competitors(),
            expected_valuation: case.expectations.valuation_range,
        }
    }
}

/// Violations fail an outcome; notes are informational only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub violations: Vec<String>,
    pub notes: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn violation(&mut self, message: impl Into<String>) {
        self.violations.push(message.into());
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    /// Append another report's findings.
    pub fn merge(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
        self.notes.extend(other.notes);
    }

    /// No violations.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Signature shared by all validators.
pub type ValidatorFn = fn(&Value, &ValidationContext) -> ValidationReport;

/// Response kind → validators, applied in registration order.
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<ResponseKind, Vec<ValidatorFn>>,
}

impl ValidatorRegistry {
    /// Registry with no validators.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in validator registered.
    pub fn standard() -> Self {
        Self::empty()
            .with(ResponseKind::Questionnaire, questionnaire::validate)
            .with(ResponseKind::Valuation, valuation::validate)
            .with(ResponseKind::Competitors, competitors::validate)
            .with(ResponseKind::Competitors, custom_category::validate)
            .with(ResponseKind::Swot, swot::validate)
            .with(ResponseKind::Swot, custom_category::validate)
            .with(ResponseKind::News, loose::validate_news)
            .with(ResponseKind::Chat, loose::validate_chat)
            .with(ResponseKind::Simulation, loose::validate_simulation)
            .with(ResponseKind::Simulation, market::validate_if_present)
            .with(ResponseKind::Gtm, loose::validate_gtm)
            .with(ResponseKind::Gtm, custom_category::validate)
    }

    /// Register a validator for a response kind.
    pub fn with(mut self, kind: ResponseKind, validator: ValidatorFn) -> Self {
        self.register(kind, validator);
        self
    }

    pub fn register(&mut self, kind: ResponseKind, validator: ValidatorFn) {
        self.validators.entry(kind).or_default().push(validator);
    }

    /// Number of validators registered for a kind.
    pub fn count(&self, kind: ResponseKind) -> usize {
        self.validators.get(&kind).map_or(0, Vec::len)
    }

    /// Run every validator registered for `kind` and merge their findings.
    pub fn validate(
        &self,
        kind: ResponseKind,
        body: &Value,
        context: &ValidationContext,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();
        match self.validators.get(&kind) {
            Some(validators) => {
                for validator in validators {
                    report.merge(validator(body, context));
                }
            }
            None => report.note(format!("no validator registered for {:?}", kind)),
        }
        report
    }
}

// ---------------------------------------------------------------------------
// Shape helpers
// ---------------------------------------------------------------------------

const WRAPPER_KEYS: &[&str] = &["data", "result", "analysis"];

/// The body plus any wrapper objects it nests its payload in.
pub(crate) fn scopes<'a>(body: &'a Value, extra_wrappers: &[&str]) -> Vec<&'a Value> {
    let mut found = vec![body];
    let mut i = 0;
    while i < found.len() && found.len() < 16 {
        let current = found[i];
        for key in WRAPPER_KEYS.iter().chain(extra_wrappers) {
            if let Some(inner) = current.get(*key).filter(|v| v.is_object()) {
                found.push(inner);
            }
        }
        i += 1;
    }
    found
}

/// First non-null value under any of `keys` in any scope.
pub(crate) fn lookup<'a>(scopes: &[&'a Value], keys: &[&str]) -> Option<&'a Value> {
    scopes
        .iter()
        .flat_map(|scope| keys.iter().filter_map(move |k| scope.get(*k)))
        .find(|v| !v.is_null())
}

/// First numeric value under any of `keys` in any scope.
pub(crate) fn lookup_number(scopes: &[&Value], keys: &[&str]) -> Option<f64> {
    scopes
        .iter()
        .flat_map(|scope| keys.iter().filter_map(move |k| scope.get(*k)))
        .find_map(as_number)
}

/// First non-empty string under any of `keys` in any scope.
pub(crate) fn lookup_text<'a>(scopes: &[&'a Value], keys: &[&str]) -> Option<&'a str> {
    scopes
        .iter()
        .flat_map(|scope| keys.iter().filter_map(move |k| scope.get(*k)))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
}
