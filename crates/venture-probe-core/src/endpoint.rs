//! Analysis endpoints exercised by the battery.

use serde::{Deserialize, Serialize};
use serde_json::json;
use venture_probe_client::{ApiRequest, HttpMethod};

use crate::corpus::{questions, ScenarioCase};
use crate::error::{HarnessError, Result};
use crate::validators::ResponseKind;

pub const SIGNUP_PATH: &str = "/auth/signup";
pub const LOGIN_PATH: &str = "/auth/login";
pub const QUESTIONNAIRE_PATH: &str = "/questionnaire/save";

/// Endpoint names for the setup calls, used as latency keys.
pub const SIGNUP_ENDPOINT: &str = "auth_signup";
pub const LOGIN_ENDPOINT: &str = "auth_login";
pub const QUESTIONNAIRE_ENDPOINT: &str = "questionnaire_save";

/// Analysis endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// POST /analysis/valuation
    Valuation,
    /// POST /analysis/competitors
    Competitors,
    /// POST /analysis/swot
    Swot,
    /// GET /news
    News,
    /// POST /chat
    Chat,
    /// POST /simulation
    Simulation,
    /// POST /gtm
    Gtm,
}

impl Endpoint {
    /// Default battery, in call order.
    pub const ALL: [Endpoint; 7] = [
        Endpoint::Valuation,
        Endpoint::Competitors,
        Endpoint::Swot,
        Endpoint::News,
        Endpoint::Chat,
        Endpoint::Simulation,
        Endpoint::Gtm,
    ];

    /// Get the endpoint name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Valuation => "valuation",
            Endpoint::Competitors => "competitors",
            Endpoint::Swot => "swot",
            Endpoint::News => "news",
            Endpoint::Chat => "chat",
            Endpoint::Simulation => "simulation",
            Endpoint::Gtm => "gtm",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Valuation => "/analysis/valuation",
            Endpoint::Competitors => "/analysis/competitors",
            Endpoint::Swot => "/analysis/swot",
            Endpoint::News => "/news",
            Endpoint::Chat => "/chat",
            Endpoint::Simulation => "/simulation",
            Endpoint::Gtm => "/gtm",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            Endpoint::News => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }

    /// Response kind used to select validators.
    pub fn kind(&self) -> ResponseKind {
        match self {
            Endpoint::Valuation => ResponseKind::Valuation,
            Endpoint::Competitors => ResponseKind::Competitors,
            Endpoint::Swot => ResponseKind::Swot,
            Endpoint::News => ResponseKind::News,
            Endpoint::Chat => ResponseKind::Chat,
            Endpoint::Simulation => ResponseKind::Simulation,
            Endpoint::Gtm => ResponseKind::Gtm,
        }
    }

    /// Endpoints backed by generative computation; paced after each call.
    pub fn is_expensive(&self) -> bool {
        !matches!(self, Endpoint::News)
    }

    /// Parse an endpoint name.
    pub fn parse(name: &str) -> Result<Endpoint> {
        let name = name.trim().to_lowercase();
        Endpoint::ALL
            .into_iter()
            .find(|e| e.name() == name)
            .ok_or(HarnessError::UnknownEndpoint(name))
    }

    /// Parse a comma-separated endpoint list, keeping order.
    pub fn parse_list(list: &str) -> Result<Vec<Endpoint>> {
        list.split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Endpoint::parse)
            .collect()
    }

    /// Build the unauthenticated request for a scenario.
    pub fn request(&self, case: &ScenarioCase) -> Result<ApiRequest> {
        let request = match self {
            Endpoint::News => ApiRequest::get(self.path()),
            Endpoint::Chat => ApiRequest::post(
                self.path(),
                json!({
                    "message": format!(
                        "What are the three biggest risks for {} at the {} stage?",
                        case.company_name(),
                        case.stage
                    ),
                }),
            ),
            _ => ApiRequest::post(
                self.path(),
                json!({
                    "companyName": case.company_name(),
                    "industry": case.effective_category(),
                    "category": case.category,
                    "customCategory": case.custom_category,
                    "stage": case.stage,
                    "targetMarket": case.text(questions::TARGET_MARKET),
                    "responses": case.responses_json()?,
                }),
            ),
        };
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::builtin_corpus;

    #[test]
    fn test_endpoint_names_round_trip() {
        for endpoint in Endpoint::ALL {
            assert_eq!(Endpoint::parse(endpoint.name()).unwrap(), endpoint);
        }
    }

    #[test]
    fn test_parse_list() {
        let list = Endpoint::parse_list("valuation, SWOT,news").unwrap();
        assert_eq!(list, vec![Endpoint::Valuation, Endpoint::Swot, Endpoint::News]);

        let err = Endpoint::parse_list("valuation,pricing").unwrap_err();
        assert!(matches!(err, HarnessError::UnknownEndpoint(name) if name == "pricing"));
    }

    #[test]
    fn test_only_news_is_cheap_and_get() {
        for endpoint in Endpoint::ALL {
            let cheap = endpoint == Endpoint::News;
            assert_eq!(endpoint.is_expensive(), !cheap);
            assert_eq!(endpoint.method() == HttpMethod::Get, cheap);
        }
    }

    #[test]
    fn test_analysis_request_body() {
        let corpus = builtin_corpus();
        let case = corpus.iter().find(|c| c.id == "other-pet-wellness").unwrap();
        let request = Endpoint::Swot.request(case).unwrap();
        assert_eq!(request.path, "/analysis/swot");
        let body = request.body.unwrap();
        assert_eq!(body["industry"], "pet-wellness wearables");
        assert_eq!(body["stage"], "Beta");
        assert_eq!(body["responses"]["company_name"], "PawPulse");
        assert!(request.token.is_none());
    }

    #[test]
    fn test_chat_request_mentions_company() {
        let corpus = builtin_corpus();
        let request = Endpoint::Chat.request(&corpus[1]).unwrap();
        let message = request.body.unwrap()["message"].as_str().unwrap().to_string();
        assert!(message.contains("Ledgerly"));
        assert!(message.contains("MVP"));
    }
}
