//! Venture-Probe Client: resilient JSON requests against the analysis API
//!
//! Every call goes through a single [`RetryPolicy`] owned by the client, so
//! call sites never hand-roll backoff. A call never fails outright: the
//! outcome is always a [`CallResult`] carrying status, body, latency and an
//! optional error string, which the harness turns into a test outcome.
//!
//! ## Retry rules
//!
//! - Transport errors (refused, reset, timeout) are retried.
//! - Bodies that fail to parse as JSON are retried.
//! - Parsed JSON is returned as-is whatever the status, unless the policy's
//!   status predicate selects that status.

pub mod error;
pub mod http;
pub mod policy;
pub mod request;

pub use error::ClientError;
pub use http::{ClientConfig, HttpClient};
pub use policy::{DelaySchedule, RetryPolicy};
pub use request::{ApiRequest, CallResult, HttpMethod};

use async_trait::async_trait;

/// Result type for client construction and URL handling
pub type Result<T> = std::result::Result<T, ClientError>;

/// Anything able to execute an [`ApiRequest`].
///
/// Implementations must be infallible at the type level: failures are
/// reported through [`CallResult::error`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the request, including any retries, and report the outcome.
    async fn call(&self, request: &ApiRequest) -> CallResult;
}
