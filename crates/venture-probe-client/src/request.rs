//! Request and result types shared by every transport.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// HTTP methods used by the analysis API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// One logical call against the API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL, e.g. `/analysis/swot`
    pub path: String,
    /// JSON body, serialized when present
    pub body: Option<Value>,
    /// Bearer token, sent as `Authorization: Bearer <token>`
    pub token: Option<String>,
}

impl ApiRequest {
    /// GET request without a body.
    pub fn get(path: &str) -> Self {
        ApiRequest {
            method: HttpMethod::Get,
            path: path.to_string(),
            body: None,
            token: None,
        }
    }

    /// POST request with a JSON body.
    pub fn post(path: &str, body: Value) -> Self {
        ApiRequest {
            method: HttpMethod::Post,
            path: path.to_string(),
            body: Some(body),
            token: None,
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

/// Outcome of a call after the retry budget is spent or a response is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    /// Last observed HTTP status; `None` when no response ever arrived
    pub status: Option<u16>,
    /// Parsed body, `{"rawResponse": ...}` for unparsable text, `null` otherwise
    pub body: Value,
    /// Wall-clock time across all attempts
    pub latency_ms: u64,
    /// Attempts performed
    pub attempts: u32,
    /// Set when the call could not produce a parsed response
    pub error: Option<String>,
}

impl CallResult {
    /// Result for a call that never reached the network.
    pub fn not_sent(error: String) -> Self {
        CallResult {
            status: None,
            body: Value::Null,
            latency_ms: 0,
            attempts: 0,
            error: Some(error),
        }
    }

    /// Synthetic payload wrapping a non-JSON response body.
    pub fn raw_payload(text: &str) -> Value {
        json!({ "rawResponse": text })
    }

    /// 2xx status with a parsed body.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && matches!(self.status, Some(s) if (200..300).contains(&s))
    }

    /// Remote backpressure: 429 Too Many Requests or 503 Service Unavailable.
    pub fn is_backpressure(&self) -> bool {
        matches!(self.status, Some(429) | Some(503))
    }

    /// Raw text captured from an unparsable body, if any.
    pub fn raw_response(&self) -> Option<&str> {
        self.body.get("rawResponse").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: Option<u16>, error: Option<&str>) -> CallResult {
        CallResult {
            status,
            body: Value::Null,
            latency_ms: 12,
            attempts: 1,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_success_requires_2xx_and_no_error() {
        assert!(result(Some(200), None).is_success());
        assert!(result(Some(201), None).is_success());
        assert!(!result(Some(200), Some("not json")).is_success());
        assert!(!result(Some(404), None).is_success());
        assert!(!result(None, Some("refused")).is_success());
    }

    #[test]
    fn test_backpressure_statuses() {
        assert!(result(Some(429), None).is_backpressure());
        assert!(result(Some(503), Some("html body")).is_backpressure());
        assert!(!result(Some(500), None).is_backpressure());
        assert!(!result(None, Some("timeout")).is_backpressure());
    }

    #[test]
    fn test_request_builders() {
        let req = ApiRequest::post("/chat", json!({"message": "hi"})).with_token("abc");
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.token.as_deref(), Some("abc"));

        let req = ApiRequest::get("/news");
        assert!(req.body.is_none());
        assert_eq!(req.method.as_str(), "GET");
    }

    #[test]
    fn test_raw_response_accessor() {
        let mut r = result(Some(502), Some("bad gateway"));
        r.body = CallResult::raw_payload("<html>oops</html>");
        assert_eq!(r.raw_response(), Some("<html>oops</html>"));
    }
}
