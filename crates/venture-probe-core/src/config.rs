//! Harness configuration.
//!
//! Defaults come from `VENTURE_PROBE_*` environment variables; the CLI
//! overrides individual fields through the `with_*` builders.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use venture_probe_client::{ClientConfig, DelaySchedule, RetryPolicy};

use crate::endpoint::Endpoint;
use crate::error::{HarnessError, Result};
use crate::orchestrator::{Credentials, PacingConfig};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_PASSWORD: &str = "ProbePassw0rd!";
pub const DEFAULT_EMAIL_DOMAIN: &str = "probe.venture.test";
/// Overall efficiency, in percent, a run must reach to pass.
pub const DEFAULT_PASS_THRESHOLD: f64 = 75.0;

/// Harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarnessConfig {
    /// API base URL, e.g. `http://localhost:3000/api`
    pub base_url: String,
    /// Password for synthetic identities
    pub password: String,
    /// Domain of synthetic identity emails
    pub email_domain: String,
    /// Per-attempt request timeout
    pub timeout_secs: u64,
    /// Attempts per call, including the first
    pub max_retries: u32,
    /// Delay between attempts
    pub retry_delay_ms: u64,
    /// Grow the retry delay with each attempt instead of keeping it fixed
    #[serde(default)]
    pub linear_backoff: bool,
    /// Pause after each expensive endpoint
    pub pacing_ms: u64,
    /// Pause between scenarios
    pub scenario_delay_ms: u64,
    /// Endpoint battery, in call order
    pub endpoints: Vec<Endpoint>,
    /// Minimum overall efficiency, in percent
    pub pass_threshold: f64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            base_url: env_or("VENTURE_PROBE_BASE_URL", DEFAULT_BASE_URL),
            password: env_or("VENTURE_PROBE_PASSWORD", DEFAULT_PASSWORD),
            email_domain: env_or("VENTURE_PROBE_EMAIL_DOMAIN", DEFAULT_EMAIL_DOMAIN),
            timeout_secs: 60,
            max_retries: 3,
            retry_delay_ms: 1000,
            linear_backoff: false,
            pacing_ms: 5000,
            scenario_delay_ms: 2000,
            endpoints: Endpoint::ALL.to_vec(),
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

impl HarnessConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Config for a specific base URL, ignoring the environment.
    pub fn new(base_url: &str) -> Self {
        HarnessConfig {
            base_url: base_url.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_endpoints(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn with_linear_backoff(mut self, linear_backoff: bool) -> Self {
        self.linear_backoff = linear_backoff;
        self
    }

    pub fn with_pacing(mut self, pacing_ms: u64, scenario_delay_ms: u64) -> Self {
        self.pacing_ms = pacing_ms;
        self.scenario_delay_ms = scenario_delay_ms;
        self
    }

    pub fn with_pass_threshold(mut self, pass_threshold: f64) -> Self {
        self.pass_threshold = pass_threshold;
        self
    }

    /// Reject settings the harness cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(HarnessError::InvalidConfig("base URL is empty".to_string()));
        }
        if self.endpoints.is_empty() {
            return Err(HarnessError::InvalidConfig(
                "endpoint battery is empty".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(HarnessError::InvalidConfig(
                "max retries must be at least 1".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.pass_threshold) {
            return Err(HarnessError::InvalidConfig(format!(
                "pass threshold must be within 0..=100 (got {})",
                self.pass_threshold
            )));
        }
        if self.password.is_empty() {
            return Err(HarnessError::InvalidConfig("password is empty".to_string()));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url).with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let delay = if self.linear_backoff {
            DelaySchedule::Linear(self.retry_delay_ms)
        } else {
            DelaySchedule::Fixed(self.retry_delay_ms)
        };
        RetryPolicy::new(self.max_retries, delay)
    }

    pub fn pacing(&self) -> PacingConfig {
        PacingConfig {
            expensive_endpoint: Duration::from_millis(self.pacing_ms),
            between_scenarios: Duration::from_millis(self.scenario_delay_ms),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.password, &self.email_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_defaults() {
        let config = HarnessConfig::new("http://api.test");
        assert_eq!(config.base_url, "http://api.test");
        assert_eq!(config.endpoints.len(), 7);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.pacing().expensive_endpoint, Duration::from_secs(5));
        assert_eq!(config.pacing().between_scenarios, Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = HarnessConfig::new("http://api.test")
            .with_base_url("http://other.test")
            .with_endpoints(vec![Endpoint::News])
            .with_retries(5, 10)
            .with_pacing(0, 0)
            .with_pass_threshold(90.0);
        assert_eq!(config.base_url, "http://other.test");
        assert_eq!(config.endpoints, vec![Endpoint::News]);
        assert_eq!(config.retry_policy().attempts(), 5);
        assert_eq!(config.pacing().expensive_endpoint, Duration::ZERO);
        assert_eq!(config.pass_threshold, 90.0);
    }

    #[test]
    fn test_retry_schedule_follows_backoff_flag() {
        let fixed = HarnessConfig::new("http://api.test").with_retries(3, 200);
        assert_eq!(fixed.retry_policy().delay, DelaySchedule::Fixed(200));
        assert_eq!(
            fixed.retry_policy().delay.after_attempt(2),
            Duration::from_millis(200)
        );

        let linear = fixed.with_linear_backoff(true);
        assert_eq!(linear.retry_policy().delay, DelaySchedule::Linear(200));
        assert_eq!(
            linear.retry_policy().delay.after_attempt(2),
            Duration::from_millis(400)
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = HarnessConfig::new("http://api.test");
        assert!(base.clone().with_endpoints(vec![]).validate().is_err());
        assert!(base.clone().with_retries(0, 10).validate().is_err());
        assert!(base.clone().with_pass_threshold(101.0).validate().is_err());
        assert!(base.clone().with_pass_threshold(f64::NAN).validate().is_err());
        assert!(base.with_base_url(" ").validate().is_err());
    }

    #[test]
    fn test_client_config_uses_timeout() {
        let config = HarnessConfig::new("http://api.test");
        let client = config.client_config();
        assert_eq!(client.base_url, "http://api.test");
        assert_eq!(client.timeout, Duration::from_secs(60));
    }
}
