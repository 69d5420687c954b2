//! Scenario orchestration.
//!
//! Each scenario runs `authenticate -> save questionnaire -> endpoint battery`
//! strictly in sequence. A scenario that errors or panics is recorded as a
//! fully failed battery and the run moves on to the next one.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use futures::FutureExt;
use serde_json::{json, Value};
use tracing::{debug, Instrument};
use venture_probe_client::{ApiRequest, CallResult, Transport};

use crate::corpus::ScenarioCase;
use crate::endpoint::{
    Endpoint, LOGIN_ENDPOINT, LOGIN_PATH, QUESTIONNAIRE_ENDPOINT, QUESTIONNAIRE_PATH,
    SIGNUP_ENDPOINT, SIGNUP_PATH,
};
use crate::obs::{
    emit_endpoint_checked, emit_run_finished, emit_run_started, emit_scenario_aborted,
    emit_scenario_finished, emit_scenario_started, scenario_span,
};
use crate::outcome::{RunAccumulator, ScenarioOutcome, TestOutcome};
use crate::validators::{ResponseKind, ValidationContext, ValidationReport, ValidatorRegistry};

const HTTP_CONFLICT: u16 = 409;

/// Delays that keep the remote service below its rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Pause after each expensive endpoint when another endpoint follows
    pub expensive_endpoint: Duration,
    /// Pause before every scenario but the first
    pub between_scenarios: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            expensive_endpoint: Duration::from_secs(5),
            between_scenarios: Duration::from_secs(2),
        }
    }
}

impl PacingConfig {
    /// No pauses at all.
    pub fn none() -> Self {
        PacingConfig {
            expensive_endpoint: Duration::ZERO,
            between_scenarios: Duration::ZERO,
        }
    }
}

/// Identity used for the synthetic accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub password: String,
    pub email_domain: String,
}

impl Credentials {
    pub fn new(password: &str, email_domain: &str) -> Self {
        Credentials {
            password: password.to_string(),
            email_domain: email_domain.to_string(),
        }
    }

    /// Stable login email for a scenario, so reruns hit the login path.
    pub fn email_for(&self, scenario_id: &str) -> String {
        format!("probe+{}@{}", scenario_id, self.email_domain)
    }
}

/// Bearer token from an auth response: `accessToken` or `token`, top-level
/// or nested under `data`.
pub fn extract_token(body: &Value) -> Option<String> {
    [Some(body), body.get("data")]
        .into_iter()
        .flatten()
        .flat_map(|scope| ["accessToken", "token"].map(|k| scope.get(k)))
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

fn require_token(body: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    if extract_token(body).is_none() {
        report.violation("missing field: accessToken");
    }
    report
}

fn describe(call: &CallResult) -> String {
    match (&call.error, call.status) {
        (Some(error), _) => error.clone(),
        (None, Some(status)) => format!("HTTP {}", status),
        (None, None) => "no response".to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Drives every scenario through the endpoint battery.
pub struct ScenarioRunner {
    transport: Arc<dyn Transport>,
    battery: Vec<Endpoint>,
    registry: ValidatorRegistry,
    pacing: PacingConfig,
    credentials: Credentials,
}

impl ScenarioRunner {
    /// Runner with the standard validators, default pacing and credentials.
    pub fn new(transport: Arc<dyn Transport>, battery: Vec<Endpoint>) -> Self {
        ScenarioRunner {
            transport,
            battery,
            registry: ValidatorRegistry::standard(),
            pacing: PacingConfig::default(),
            credentials: Credentials::new(
                crate::config::DEFAULT_PASSWORD,
                crate::config::DEFAULT_EMAIL_DOMAIN,
            ),
        }
    }

    pub fn with_registry(mut self, registry: ValidatorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn battery(&self) -> &[Endpoint] {
        &self.battery
    }

    /// Run the corpus under a fresh run id.
    pub async fn run(&self, corpus: &[ScenarioCase]) -> RunAccumulator {
        self.run_with(RunAccumulator::default(), corpus).await
    }

    /// Run the corpus, folding every scenario into `acc`.
    pub async fn run_with(
        &self,
        mut acc: RunAccumulator,
        corpus: &[ScenarioCase],
    ) -> RunAccumulator {
        let start = Instant::now();
        emit_run_started(&acc.run_id, corpus.len(), self.battery.len());

        for (index, case) in corpus.iter().enumerate() {
            if index > 0 && !self.pacing.between_scenarios.is_zero() {
                tokio::time::sleep(self.pacing.between_scenarios).await;
            }
            let outcome = self.run_isolated(&acc.run_id, case).await;
            emit_scenario_finished(&acc.run_id, &outcome);
            acc.absorb(outcome);
        }

        emit_run_finished(
            &acc.run_id,
            start.elapsed().as_millis() as u64,
            acc.overall.passed,
            acc.overall.total,
        );
        acc
    }

    /// Run one scenario, converting errors and panics into an all-failed battery.
    async fn run_isolated(&self, run_id: &str, case: &ScenarioCase) -> ScenarioOutcome {
        let guarded = AssertUnwindSafe(self.run_scenario(run_id, case))
            .catch_unwind()
            .instrument(scenario_span(run_id, &case.id));

        let reason = match guarded.await {
            Ok(Ok(outcome)) => return outcome,
            Ok(Err(e)) => format!("scenario error: {:#}", e),
            Err(payload) => format!("scenario panicked: {}", panic_message(&*payload)),
        };
        emit_scenario_aborted(run_id, &case.id, &reason);
        ScenarioOutcome::aborted(case, &self.battery, &reason)
    }

    /// Authenticate, persist the questionnaire, then call every battery endpoint.
    pub async fn run_scenario(
        &self,
        run_id: &str,
        case: &ScenarioCase,
    ) -> anyhow::Result<ScenarioOutcome> {
        emit_scenario_started(run_id, &case.id, case.effective_category());
        let mut outcome = ScenarioOutcome::new(case);
        let context = ValidationContext::for_scenario(case);

        let token = match self.authenticate(run_id, case, &mut outcome).await {
            Ok(token) => token,
            Err(e) => {
                let reason = format!("authentication failed: {:#}", e);
                outcome.fail_remaining(&self.battery, &reason);
                outcome.aborted = Some(reason);
                return Ok(outcome);
            }
        };

        let responses = case
            .responses_json()
            .with_context(|| format!("serializing responses of {}", case.id))?;
        let completeness =
            self.registry
                .validate(ResponseKind::Questionnaire, &responses, &context);
        let save = self
            .transport
            .call(
                &ApiRequest::post(
                    QUESTIONNAIRE_PATH,
                    json!({
                        "companyName": case.company_name(),
                        "category": case.effective_category(),
                        "stage": case.stage,
                        "responses": responses,
                    }),
                )
                .with_token(&token),
            )
            .await;
        let saved = TestOutcome::evaluate(QUESTIONNAIRE_ENDPOINT, &save, |_| completeness);
        emit_endpoint_checked(run_id, &saved);
        outcome.setup.push(saved);

        for (index, endpoint) in self.battery.iter().enumerate() {
            let request = endpoint.request(case)?.with_token(&token);
            let call = self.transport.call(&request).await;
            let checked = TestOutcome::evaluate(endpoint.name(), &call, |body| {
                self.registry.validate(endpoint.kind(), body, &context)
            });
            emit_endpoint_checked(run_id, &checked);
            outcome.endpoints.push(checked);

            let more = index + 1 < self.battery.len();
            if more && endpoint.is_expensive() && !self.pacing.expensive_endpoint.is_zero() {
                debug!(endpoint = endpoint.name(), "pacing after expensive endpoint");
                tokio::time::sleep(self.pacing.expensive_endpoint).await;
            }
        }

        Ok(outcome)
    }

    /// Sign up, falling back to login when the identity already exists.
    async fn authenticate(
        &self,
        run_id: &str,
        case: &ScenarioCase,
        outcome: &mut ScenarioOutcome,
    ) -> anyhow::Result<String> {
        let email = self.credentials.email_for(&case.id);

        let signup = self
            .transport
            .call(&ApiRequest::post(
                SIGNUP_PATH,
                json!({
                    "email": email,
                    "password": self.credentials.password,
                    "name": case.persona,
                    "companyName": case.company_name(),
                }),
            ))
            .await;

        if signup.status == Some(HTTP_CONFLICT) {
            let accepted = TestOutcome::accepted(
                SIGNUP_ENDPOINT,
                &signup,
                "identity already exists, falling back to login",
            );
            emit_endpoint_checked(run_id, &accepted);
            outcome.setup.push(accepted);
        } else {
            let checked = TestOutcome::evaluate(SIGNUP_ENDPOINT, &signup, require_token);
            emit_endpoint_checked(run_id, &checked);
            outcome.setup.push(checked);

            if signup.is_success() {
                if let Some(token) = extract_token(&signup.body) {
                    return Ok(token);
                }
            } else {
                bail!("signup returned {}", describe(&signup));
            }
        }

        let login = self
            .transport
            .call(&ApiRequest::post(
                LOGIN_PATH,
                json!({
                    "email": email,
                    "password": self.credentials.password,
                }),
            ))
            .await;
        let checked = TestOutcome::evaluate(LOGIN_ENDPOINT, &login, require_token);
        emit_endpoint_checked(run_id, &checked);
        outcome.setup.push(checked);

        if !login.is_success() {
            bail!("login returned {}", describe(&login));
        }
        extract_token(&login.body).context("login response carried no token")
    }
}
