//! TAM / SAM / SOM nesting checks.

use serde_json::Value;

use super::{lookup_number, scopes, ValidationContext, ValidationReport};

const MARKET_WRAPPERS: &[&str] = &["valuation", "marketSize", "market_size", "market", "marketSizing"];
const TAM_KEYS: &[&str] = &["tam", "TAM", "totalAddressableMarket"];
const SAM_KEYS: &[&str] = &["sam", "SAM", "serviceableAddressableMarket"];
const SOM_KEYS: &[&str] = &["som", "SOM", "serviceableObtainableMarket"];

/// Market-size triple extracted from a response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketTriple {
    pub tam: Option<f64>,
    pub sam: Option<f64>,
    pub som: Option<f64>,
}

impl MarketTriple {
    pub fn extract(body: &Value) -> Self {
        let scopes = scopes(body, MARKET_WRAPPERS);
        MarketTriple {
            tam: lookup_number(&scopes, TAM_KEYS),
            sam: lookup_number(&scopes, SAM_KEYS),
            som: lookup_number(&scopes, SOM_KEYS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tam.is_none() && self.sam.is_none() && self.som.is_none()
    }
}

/// Check `0 < SOM <= SAM <= TAM`; missing figures are violations.
pub fn check_triple(triple: &MarketTriple, report: &mut ValidationReport) {
    for (label, value) in [("TAM", triple.tam), ("SAM", triple.sam), ("SOM", triple.som)] {
        match value {
            None => report.violation(format!("missing field: {}", label)),
            Some(v) if v <= 0.0 => report.violation(format!("{} must be positive (got {})", label, v)),
            Some(_) => {}
        }
    }

    if let (Some(tam), Some(sam)) = (triple.tam, triple.sam) {
        if sam > tam {
            report.violation("SAM > TAM (invalid)");
        }
    }
    if let (Some(sam), Some(som)) = (triple.sam, triple.som) {
        if som > sam {
            report.violation("SOM > SAM (invalid)");
        }
    }
}

/// Market-size validator: the triple must be present and nested.
pub fn validate(body: &Value, _context: &ValidationContext) -> ValidationReport {
    let mut report = ValidationReport::new();
    check_triple(&MarketTriple::extract(body), &mut report);
    report
}

/// Like [`validate`], but only when the response carries market figures.
pub fn validate_if_present(body: &Value, context: &ValidationContext) -> ValidationReport {
    if MarketTriple::extract(body).is_empty() {
        ValidationReport::new()
    } else {
        validate(body, context)
    }
}
