//! In-memory transport fake (testing only)
//!
//! `ScriptedTransport` answers each path with queued or sticky responses and
//! records every request it sees, so orchestration can be tested without a
//! network.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;
use venture_probe_client::{ApiRequest, CallResult, Transport};

/// Build a parsed response as the HTTP client would return it.
pub fn response(status: u16, body: Value, latency_ms: u64) -> CallResult {
    CallResult {
        status: Some(status),
        body,
        latency_ms,
        attempts: 1,
        error: None,
    }
}

/// A 200 response with a fixed 10ms latency.
pub fn ok(body: Value) -> CallResult {
    response(200, body, 10)
}

type PanicRule = (String, fn(&ApiRequest) -> bool);

/// A request as recorded by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: ApiRequest,
    pub at: Instant,
}

/// Path-routed fake transport.
#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<CallResult>>>,
    sticky: Mutex<HashMap<String, CallResult>>,
    panics: Mutex<Vec<PanicRule>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call to `path` with `result` once the queue is drained.
    pub fn respond(self, path: &str, result: CallResult) -> Self {
        self.sticky
            .lock()
            .unwrap()
            .insert(path.to_string(), result);
        self
    }

    /// Answer the next call to `path` with `result`.
    pub fn respond_once(self, path: &str, result: CallResult) -> Self {
        self.queued
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(result);
        self
    }

    /// Panic inside `call` when a request to `path` matches `rule`.
    pub fn panic_when(self, path: &str, rule: fn(&ApiRequest) -> bool) -> Self {
        self.panics.lock().unwrap().push((path.to_string(), rule));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made to `path`.
    pub fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.request.path == path)
            .count()
    }

    fn next_response(&self, path: &str) -> CallResult {
        if let Some(result) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
        {
            return result;
        }
        self.sticky
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| response(404, json!({"error": "no route"}), 1))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call(&self, request: &ApiRequest) -> CallResult {
        self.calls.lock().unwrap().push(RecordedCall {
            request: request.clone(),
            at: Instant::now(),
        });

        let should_panic = self
            .panics
            .lock()
            .unwrap()
            .iter()
            .any(|(path, rule)| *path == request.path && rule(request));
        if should_panic {
            panic!("scripted panic on {}", request.path);
        }

        self.next_response(&request.path)
    }
}
