//! Scenario corpus: synthetic personas driven through the analysis API.
//!
//! The built-in catalogue covers every stage plus the catch-all category.
//! A JSON file with the same schema can replace it.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::error::{HarnessError, Result};
use crate::scores::{reference_valuation, ScoreVector};
use crate::stage::Stage;

/// Category value that requires a free-text sub-category.
pub const CATCH_ALL_CATEGORY: &str = "Other";

/// Questionnaire identifiers.
pub mod questions {
    pub const COMPANY_NAME: &str = "company_name";
    pub const INDUSTRY: &str = "industry";
    pub const STAGE: &str = "stage";
    pub const PROBLEM: &str = "problem";
    pub const SOLUTION: &str = "solution";
    pub const TARGET_MARKET: &str = "target_market";
    pub const BUSINESS_MODEL: &str = "business_model";
    pub const TEAM_SIZE: &str = "team_size";
    pub const FOUNDER_EXPERIENCE_YEARS: &str = "founder_experience_years";
    pub const MONTHLY_REVENUE: &str = "monthly_revenue";
    pub const INVESTMENT_RAISED: &str = "investment_raised";
    pub const MARKET_SIZE: &str = "market_size";
    pub const COMPETITORS: &str = "competitors";
    pub const UNIQUE_ADVANTAGE: &str = "unique_advantage";

    /// Questions every scenario must answer before analysis.
    pub const REQUIRED: &[&str] = &[
        COMPANY_NAME,
        INDUSTRY,
        STAGE,
        PROBLEM,
        SOLUTION,
        TARGET_MARKET,
        BUSINESS_MODEL,
        TEAM_SIZE,
        MONTHLY_REVENUE,
        INVESTMENT_RAISED,
    ];
}

/// Inclusive bounds a returned valuation is expected to fall within.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValuationRange {
    pub min: f64,
    pub max: f64,
}

impl ValuationRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Invariants the scenario expects the service to respect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Expectations {
    /// Competitor names the founder declared
    #[serde(default)]
    pub competitors: Vec<String>,
    /// Whether the company earns revenue
    pub has_revenue: bool,
    /// Expected valuation bounds, when known
    #[serde(default)]
    pub valuation_range: Option<ValuationRange>,
}

/// One synthetic test subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioCase {
    /// Stable identifier, also used to derive the login identity
    pub id: String,
    /// Founder persona description
    pub persona: String,
    /// Primary category, e.g. "FinTech" or [`CATCH_ALL_CATEGORY`]
    pub category: String,
    /// Free-text sub-category for the catch-all category
    #[serde(default)]
    pub custom_category: Option<String>,
    pub stage: Stage,
    /// Questionnaire answers keyed by question identifier
    pub responses: BTreeMap<String, Value>,
    pub expectations: Expectations,
}

impl ScenarioCase {
    /// Company name from the questionnaire, falling back to the id.
    pub fn company_name(&self) -> &str {
        self.text(questions::COMPANY_NAME).unwrap_or(&self.id)
    }

    /// Non-empty string answer.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.responses
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Numeric answer; numeric strings such as "$1,200,000" are accepted.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.responses.get(key).and_then(as_number)
    }

    /// List answer; a single string counts as a one-element list.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.responses.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
            _ => Vec::new(),
        }
    }

    /// Competitors the founder declared, from expectations or the questionnaire.
    pub fn declared_competitors(&self) -> Vec<String> {
        if self.expectations.competitors.is_empty() {
            self.list(questions::COMPETITORS)
        } else {
            self.expectations.competitors.clone()
        }
    }

    /// Category label sent to the API.
    pub fn effective_category(&self) -> &str {
        if self.is_custom_category() {
            self.custom_category.as_deref().unwrap_or(&self.category)
        } else {
            &self.category
        }
    }

    /// Catch-all category carrying a sub-category.
    pub fn is_custom_category(&self) -> bool {
        self.category.eq_ignore_ascii_case(CATCH_ALL_CATEGORY)
            && self
                .custom_category
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty())
    }

    /// Score vector derived from the questionnaire.
    pub fn scores(&self) -> ScoreVector {
        ScoreVector::from_scenario(self)
    }

    /// Reference valuation for the scenario's stage and scores.
    pub fn reference_valuation(&self) -> f64 {
        reference_valuation(
            self.stage,
            &self.scores(),
            self.number(questions::INVESTMENT_RAISED).unwrap_or(0.0),
            self.number(questions::MONTHLY_REVENUE).unwrap_or(0.0),
        )
    }

    /// Questionnaire answers as one JSON object.
    pub fn responses_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.responses)?)
    }
}

/// Interpret a JSON value as a number, accepting formatted numeric strings.
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, ',' | '$' | '_' | ' '))
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Reject empty corpora and duplicate ids.
pub fn validate_corpus(corpus: &[ScenarioCase]) -> Result<()> {
    if corpus.is_empty() {
        return Err(HarnessError::Corpus("corpus contains no scenarios".to_string()));
    }
    let mut seen = HashSet::new();
    for case in corpus {
        if case.id.trim().is_empty() {
            return Err(HarnessError::Corpus("scenario with empty id".to_string()));
        }
        if !seen.insert(case.id.as_str()) {
            return Err(HarnessError::Corpus(format!(
                "duplicate scenario id: {}",
                case.id
            )));
        }
    }
    Ok(())
}

/// Load a corpus from a JSON array of scenarios.
pub fn load_corpus(path: &Path) -> Result<Vec<ScenarioCase>> {
    let content = std::fs::read_to_string(path)?;
    let corpus: Vec<ScenarioCase> = serde_json::from_str(&content)?;
    validate_corpus(&corpus)?;
    Ok(corpus)
}

/// SHA-256 over the serialized corpus, for report reproducibility.
pub fn corpus_digest(corpus: &[ScenarioCase]) -> Result<String> {
    let bytes = serde_json::to_vec(corpus)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

struct Persona<'a> {
    id: &'a str,
    persona: &'a str,
    category: &'a str,
    custom_category: Option<&'a str>,
    stage: Stage,
    valuation_range: Option<(f64, f64)>,
}

fn scenario(p: Persona<'_>, answers: Value) -> ScenarioCase {
    let mut responses: BTreeMap<String, Value> = match answers {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    };
    responses.insert(questions::STAGE.to_string(), json!(p.stage.name()));
    responses
        .entry(questions::INDUSTRY.to_string())
        .or_insert_with(|| json!(p.custom_category.unwrap_or(p.category)));

    let has_revenue = responses
        .get(questions::MONTHLY_REVENUE)
        .and_then(as_number)
        .is_some_and(|r| r > 0.0);
    let competitors = match responses.get(questions::COMPETITORS) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    ScenarioCase {
        id: p.id.to_string(),
        persona: p.persona.to_string(),
        category: p.category.to_string(),
        custom_category: p.custom_category.map(str::to_string),
        stage: p.stage,
        responses,
        expectations: Expectations {
            competitors,
            has_revenue,
            valuation_range: p
                .valuation_range
                .map(|(min, max)| ValuationRange { min, max }),
        },
    }
}

/// The built-in scenario catalogue.
pub fn builtin_corpus() -> Vec<ScenarioCase> {
    vec![
        scenario(
            Persona {
                id: "idea-greenroute",
                persona: "First-time founder, logistics background",
                category: "Logistics",
                custom_category: None,
                stage: Stage::Idea,
                valuation_range: Some((250_000.0, 5_000_000.0)),
            },
            json!({
                "company_name": "GreenRoute",
                "problem": "Last-mile delivery vans run half empty in mid-sized cities",
                "solution": "Shared routing marketplace pooling parcels across couriers",
                "target_market": "Regional courier companies in the EU",
                "business_model": "Per-parcel routing fee",
                "team_size": 2,
                "founder_experience_years": 4,
                "monthly_revenue": 0,
                "investment_raised": 0,
                "market_size": 4_000_000_000u64,
                "competitors": ["Onfleet", "Routific"],
                "unique_advantage": "Cross-courier pooling without owning a fleet"
            }),
        ),
        scenario(
            Persona {
                id: "mvp-ledgerly",
                persona: "Ex-banker and engineer duo",
                category: "FinTech",
                custom_category: None,
                stage: Stage::Mvp,
                valuation_range: Some((2_000_000.0, 30_000_000.0)),
            },
            json!({
                "company_name": "Ledgerly",
                "problem": "Small businesses reconcile invoices by hand every month",
                "solution": "Automated bank-to-invoice reconciliation",
                "target_market": "SMBs with 10-200 employees",
                "business_model": "SaaS subscription",
                "team_size": 4,
                "founder_experience_years": 9,
                "monthly_revenue": 0,
                "investment_raised": 5_000_000,
                "market_size": 12_000_000_000u64,
                "competitors": ["QuickBooks", "Xero"],
                "unique_advantage": "Bank-side matching with sub-minute sync"
            }),
        ),
        scenario(
            Persona {
                id: "beta-medibridge",
                persona: "Clinician founder with a technical co-founder",
                category: "HealthTech",
                custom_category: None,
                stage: Stage::Beta,
                valuation_range: Some((3_000_000.0, 50_000_000.0)),
            },
            json!({
                "company_name": "MediBridge",
                "problem": "Referral letters between clinics get lost or delayed",
                "solution": "Secure referral routing with status tracking",
                "target_market": "Independent clinics and regional hospitals",
                "business_model": "Per-seat subscription",
                "team_size": 7,
                "founder_experience_years": 12,
                "monthly_revenue": 8_000,
                "investment_raised": 1_200_000,
                "market_size": "$6,500,000,000",
                "competitors": ["Epic", "Doximity"],
                "unique_advantage": "Works over fax-era systems without integration work"
            }),
        ),
        scenario(
            Persona {
                id: "launched-tutorloop",
                persona: "Former tutor turned product manager",
                category: "EdTech",
                custom_category: None,
                stage: Stage::Launched,
                valuation_range: Some((5_000_000.0, 150_000_000.0)),
            },
            json!({
                "company_name": "TutorLoop",
                "problem": "Students cannot find affordable exam tutoring at short notice",
                "solution": "On-demand peer tutoring with verified tutors",
                "target_market": "High school students preparing for national exams",
                "business_model": "Marketplace commission",
                "team_size": 15,
                "founder_experience_years": 6,
                "monthly_revenue": 60_000,
                "investment_raised": 3_000_000,
                "market_size": 9_000_000_000u64,
                "competitors": ["Chegg", "Varsity Tutors"],
                "unique_advantage": "Tutors are top scorers from the previous exam cycle"
            }),
        ),
        scenario(
            Persona {
                id: "growing-cartwise",
                persona: "Serial e-commerce operator",
                category: "E-commerce",
                custom_category: None,
                stage: Stage::Growing,
                valuation_range: Some((20_000_000.0, 500_000_000.0)),
            },
            json!({
                "company_name": "CartWise",
                "problem": "Independent shops lose sales to abandoned checkouts",
                "solution": "Checkout recovery with personalised incentives",
                "target_market": "Shopify and WooCommerce merchants",
                "business_model": "Revenue share on recovered sales",
                "team_size": 40,
                "founder_experience_years": 15,
                "monthly_revenue": 450_000,
                "investment_raised": 18_000_000,
                "market_size": 30_000_000_000u64,
                "competitors": ["Klaviyo", "Omnisend"],
                "unique_advantage": "Incentives priced per shopper from margin data"
            }),
        ),
        scenario(
            Persona {
                id: "established-steelgrid",
                persona: "Industrial software veteran",
                category: "SaaS",
                custom_category: None,
                stage: Stage::Established,
                valuation_range: Some((100_000_000.0, 2_000_000_000.0)),
            },
            json!({
                "company_name": "SteelGrid",
                "problem": "Factories schedule maintenance on fixed calendars, not machine state",
                "solution": "Predictive maintenance scheduling from sensor data",
                "target_market": "Mid-size manufacturers in North America",
                "business_model": "Enterprise annual licence",
                "team_size": 220,
                "founder_experience_years": 22,
                "monthly_revenue": 3_500_000,
                "investment_raised": 90_000_000,
                "market_size": 45_000_000_000u64,
                "competitors": ["Uptake", "Augury"],
                "unique_advantage": "Ten years of labelled failure data across 400 plants"
            }),
        ),
        scenario(
            Persona {
                id: "other-hydroponic-kits",
                persona: "Urban farmer with a retail background",
                category: CATCH_ALL_CATEGORY,
                custom_category: Some("Urban Hydroponics"),
                stage: Stage::Mvp,
                valuation_range: None,
            },
            json!({
                "company_name": "LeafStack",
                "problem": "Apartment dwellers cannot grow fresh herbs year round",
                "solution": "Modular countertop hydroponic kits with a refill subscription",
                "target_market": "Urban households in dense cities",
                "business_model": "Hardware plus consumables subscription",
                "team_size": 3,
                "founder_experience_years": 5,
                "monthly_revenue": 0,
                "investment_raised": 250_000,
                "competitors": ["AeroGarden", "Click & Grow"],
                "unique_advantage": "Stackable modules that share one pump"
            }),
        ),
        scenario(
            Persona {
                id: "other-pet-wellness",
                persona: "Veterinarian founder",
                category: CATCH_ALL_CATEGORY,
                custom_category: Some("pet-wellness wearables"),
                stage: Stage::Beta,
                valuation_range: None,
            },
            json!({
                "company_name": "PawPulse",
                "problem": "Owners notice pet illness only after symptoms are severe",
                "solution": "Collar sensor tracking activity and resting heart rate",
                "target_market": "Dog owners in North America and Europe",
                "business_model": "Device sale plus monitoring subscription",
                "team_size": 6,
                "founder_experience_years": 11,
                "monthly_revenue": 15_000,
                "investment_raised": 2_000_000,
                "market_size": 3_000_000_000u64,
                "competitors": ["Whistle", "FitBark"],
                "unique_advantage": "Veterinary-grade heart rate baseline per breed"
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_corpus_is_valid() {
        let corpus = builtin_corpus();
        assert_eq!(corpus.len(), 8);
        validate_corpus(&corpus).expect("builtin corpus valid");
    }

    #[test]
    fn test_builtin_corpus_covers_every_stage() {
        let corpus = builtin_corpus();
        for stage in Stage::ALL {
            assert!(corpus.iter().any(|c| c.stage == stage), "missing {stage}");
        }
        assert!(corpus.iter().any(|c| c.is_custom_category()));
    }

    #[test]
    fn test_builtin_corpus_answers_required_questions() {
        for case in builtin_corpus() {
            for key in questions::REQUIRED {
                assert!(case.responses.contains_key(*key), "{} lacks {}", case.id, key);
            }
        }
    }

    #[test]
    fn test_revenue_flag_follows_monthly_revenue() {
        let corpus = builtin_corpus();
        let ledgerly = corpus.iter().find(|c| c.id == "mvp-ledgerly").unwrap();
        assert!(!ledgerly.expectations.has_revenue);
        let cartwise = corpus.iter().find(|c| c.id == "growing-cartwise").unwrap();
        assert!(cartwise.expectations.has_revenue);
    }

    #[test]
    fn test_number_accepts_formatted_strings() {
        let corpus = builtin_corpus();
        let medibridge = corpus.iter().find(|c| c.id == "beta-medibridge").unwrap();
        assert_eq!(
            medibridge.number(questions::MARKET_SIZE),
            Some(6_500_000_000.0)
        );
        assert_eq!(as_number(&json!("n/a")), None);
        assert_eq!(as_number(&json!(null)), None);
    }

    #[test]
    fn test_effective_category() {
        let corpus = builtin_corpus();
        let leaf = corpus
            .iter()
            .find(|c| c.id == "other-hydroponic-kits")
            .unwrap();
        assert_eq!(leaf.effective_category(), "Urban Hydroponics");
        let ledgerly = corpus.iter().find(|c| c.id == "mvp-ledgerly").unwrap();
        assert_eq!(ledgerly.effective_category(), "FinTech");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut corpus = builtin_corpus();
        corpus.push(corpus[0].clone());
        let err = validate_corpus(&corpus).unwrap_err();
        assert!(err.to_string().contains("duplicate scenario id"));
    }

    #[test]
    fn test_empty_corpus_rejected() {
        assert!(validate_corpus(&[]).is_err());
    }

    #[test]
    fn test_load_corpus_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        let corpus = builtin_corpus();
        std::fs::write(&path, serde_json::to_string(&corpus).unwrap()).unwrap();

        let loaded = load_corpus(&path).expect("load corpus");
        assert_eq!(loaded, corpus);
    }

    #[test]
    fn test_corpus_digest_deterministic_and_order_sensitive() {
        let corpus = builtin_corpus();
        let d1 = corpus_digest(&corpus).unwrap();
        let d2 = corpus_digest(&builtin_corpus()).unwrap();
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 64);

        let mut reversed = corpus.clone();
        reversed.reverse();
        assert_ne!(d1, corpus_digest(&reversed).unwrap());
    }
}
