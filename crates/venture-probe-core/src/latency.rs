//! Per-endpoint latency samples and percentile statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Distribution summary for one endpoint, in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatencySummary {
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub min: u64,
    pub max: u64,
    pub avg: f64,
    pub count: usize,
}

/// Nearest-rank percentile of `samples`.
///
/// Index is `ceil(p / 100 × n) − 1` clamped to `[0, n − 1]` over the sorted
/// samples. An empty sample yields 0.
pub fn percentile(samples: &[u64], p: f64) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    nearest_rank(&sorted, p)
}

fn nearest_rank(sorted: &[u64], p: f64) -> u64 {
    let n = sorted.len();
    let rank = (p / 100.0 * n as f64).ceil();
    let index = if rank.is_nan() || rank < 1.0 {
        0
    } else {
        (rank as usize - 1).min(n - 1)
    };
    sorted[index]
}

/// Append-only latency store keyed by endpoint name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencyAggregator {
    samples: BTreeMap<String, Vec<u64>>,
}

impl LatencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, endpoint: &str, latency_ms: u64) {
        self.samples
            .entry(endpoint.to_string())
            .or_default()
            .push(latency_ms);
    }

    /// Samples recorded for an endpoint, in arrival order.
    pub fn samples(&self, endpoint: &str) -> &[u64] {
        self.samples
            .get(endpoint)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn percentile(&self, endpoint: &str, p: f64) -> u64 {
        percentile(self.samples(endpoint), p)
    }

    /// Summary for an endpoint, `None` when it has no samples.
    pub fn summary(&self, endpoint: &str) -> Option<LatencySummary> {
        let samples = self.samples(endpoint);
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let total: u64 = sorted.iter().sum();

        Some(LatencySummary {
            p50: nearest_rank(&sorted, 50.0),
            p90: nearest_rank(&sorted, 90.0),
            p99: nearest_rank(&sorted, 99.0),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            avg: total as f64 / sorted.len() as f64,
            count: sorted.len(),
        })
    }

    /// Summaries for every endpoint with at least one sample.
    pub fn summaries(&self) -> BTreeMap<String, LatencySummary> {
        self.samples
            .keys()
            .filter_map(|name| self.summary(name).map(|s| (name.clone(), s)))
            .collect()
    }

    pub fn total_samples(&self) -> usize {
        self.samples.values().map(Vec::len).sum()
    }
}
