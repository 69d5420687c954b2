//! reqwest-backed transport
//!
//! Executes one logical call with bounded retries. Latency covers every
//! attempt plus the delays between them, up to the last body read.

use crate::error::ClientError;
use crate::policy::RetryPolicy;
use crate::request::{ApiRequest, CallResult};
use crate::{Result, Transport};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the analysis API, e.g. `http://localhost:3000/api`
    pub base_url: String,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: "http://localhost:3000/api".to_string(),
            timeout: Duration::from_secs(60),
            user_agent: format!("venture-probe/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create config for a specific server
    pub fn new(base_url: &str) -> Self {
        ClientConfig {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Set the per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

enum Attempt {
    Parsed { status: u16, body: Value },
    Unparsable { status: u16, raw: String, error: ClientError },
    Failed(ClientError),
}

/// HTTP transport with an injected retry policy
pub struct HttpClient {
    base_url: String,
    http_client: reqwest::Client,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Create a new client
    pub fn new(config: ClientConfig, policy: RetryPolicy) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        Ok(HttpClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            policy,
        })
    }

    /// Retry policy in effect
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Resolve an endpoint path against the base URL
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Url::parse(&joined).map_err(|e| ClientError::InvalidUrl(joined, e.to_string()))
    }

    async fn attempt(&self, url: &Url, request: &ApiRequest) -> Attempt {
        let mut builder = self
            .http_client
            .request(request.method.into(), url.clone())
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            match serde_json::to_vec(body) {
                Ok(bytes) => builder = builder.body(bytes),
                Err(e) => return Attempt::Failed(ClientError::Json(e)),
            }
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => return Attempt::Failed(e.into()),
        };
        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => return Attempt::Failed(e.into()),
        };

        if text.trim().is_empty() {
            return Attempt::Parsed {
                status,
                body: Value::Null,
            };
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(body) => Attempt::Parsed { status, body },
            Err(e) => Attempt::Unparsable {
                status,
                raw: text,
                error: ClientError::Parse {
                    status,
                    reason: e.to_string(),
                },
            },
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn call(&self, request: &ApiRequest) -> CallResult {
        let start = Instant::now();
        let url = match self.url_for(&request.path) {
            Ok(url) => url,
            Err(e) => return CallResult::not_sent(e.to_string()),
        };

        let max_attempts = self.policy.attempts();
        let mut last_status = None;
        let mut last_body = Value::Null;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match self.attempt(&url, request).await {
                Attempt::Parsed { status, body } => {
                    if attempt < max_attempts && self.policy.should_retry_status(status) {
                        debug!(
                            path = %request.path,
                            status,
                            attempt,
                            "Retrying on selected status"
                        );
                        last_status = Some(status);
                        tokio::time::sleep(self.policy.delay.after_attempt(attempt)).await;
                        continue;
                    }
                    return CallResult {
                        status: Some(status),
                        body,
                        latency_ms: elapsed_ms(start),
                        attempts: attempt,
                        error: None,
                    };
                }
                Attempt::Unparsable { status, raw, error } => {
                    warn!(path = %request.path, status, attempt, "Response body is not JSON");
                    last_status = Some(status);
                    last_body = CallResult::raw_payload(&raw);
                    last_error = Some(error.to_string());
                }
                Attempt::Failed(error) => {
                    warn!(path = %request.path, attempt, error = %error, "Request attempt failed");
                    let retryable = error.is_retryable();
                    last_body = Value::Null;
                    last_error = Some(error.to_string());
                    if !retryable {
                        return CallResult {
                            status: last_status,
                            body: last_body,
                            latency_ms: elapsed_ms(start),
                            attempts: attempt,
                            error: last_error,
                        };
                    }
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.policy.delay.after_attempt(attempt)).await;
            }
        }

        CallResult {
            status: last_status,
            body: last_body,
            latency_ms: elapsed_ms(start),
            attempts: max_attempts,
            error: last_error,
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DelaySchedule;

    fn client(base: &str) -> HttpClient {
        HttpClient::new(
            ClientConfig::new(base),
            RetryPolicy::new(1, DelaySchedule::Fixed(0)),
        )
        .expect("client")
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(!config.base_url.is_empty());
        assert!(config.user_agent.starts_with("venture-probe/"));
    }

    #[test]
    fn test_url_for_joins_paths() {
        let c = client("http://localhost:3000/api/");
        assert_eq!(
            c.url_for("/auth/login").unwrap().as_str(),
            "http://localhost:3000/api/auth/login"
        );
        assert_eq!(
            c.url_for("news").unwrap().as_str(),
            "http://localhost:3000/api/news"
        );
    }

    #[test]
    fn test_url_for_rejects_garbage_base() {
        let c = client("not a url");
        assert!(matches!(
            c.url_for("/news"),
            Err(ClientError::InvalidUrl(_, _))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_sent() {
        let c = client("not a url");
        let result = c.call(&ApiRequest::get("/news")).await;
        assert_eq!(result.attempts, 0);
        assert!(result.status.is_none());
        assert!(result.error.is_some());
    }
}
