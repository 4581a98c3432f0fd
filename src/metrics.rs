//! Per-source fetch metrics
//!
//! Tracks latency percentiles and success rates for every data source over a
//! rolling window of recent fetches.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::types::SourceId;

/// Maximum number of samples to keep for metrics calculation
const MAX_SAMPLES: usize = 100;

/// Metrics for a single source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMetrics {
    pub source: SourceId,
    /// 50th percentile latency of successful fetches, in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency of successful fetches, in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    pub total_requests: u64,
    pub failed_requests: u64,
}

impl SourceMetrics {
    /// Creates metrics with no data
    pub fn empty(source: SourceId) -> Self {
        Self {
            source,
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_requests: 0,
            failed_requests: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct LatencySample {
    duration_ms: f64,
    success: bool,
}

#[derive(Debug, Default)]
struct Counters {
    samples: VecDeque<LatencySample>,
    total: u64,
    failed: u64,
}

/// Collects fetch samples for one source
pub struct MetricsCollector {
    source: SourceId,
    counters: RwLock<Counters>,
}

impl MetricsCollector {
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            counters: RwLock::new(Counters {
                samples: VecDeque::with_capacity(MAX_SAMPLES),
                ..Counters::default()
            }),
        }
    }

    /// Records a fetch with its duration and success status
    pub async fn record_request(&self, duration: Duration, success: bool) {
        let mut counters = self.counters.write().await;
        counters.total += 1;
        if !success {
            counters.failed += 1;
        }
        if counters.samples.len() >= MAX_SAMPLES {
            counters.samples.pop_front();
        }
        counters.samples.push_back(LatencySample {
            duration_ms: duration.as_secs_f64() * 1000.0,
            success,
        });
    }

    /// Computes current metrics from collected samples
    pub async fn get_metrics(&self) -> SourceMetrics {
        let counters = self.counters.read().await;
        if counters.samples.is_empty() {
            return SourceMetrics::empty(self.source);
        }

        let mut latencies: Vec<f64> = counters
            .samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.duration_ms)
            .collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if counters.total > 0 {
            (counters.total - counters.failed) as f64 / counters.total as f64
        } else {
            1.0
        };

        SourceMetrics {
            source: self.source,
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: counters.total,
            failed_requests: counters.failed,
        }
    }
}

/// One collector per source
pub struct MetricsRegistry {
    collectors: HashMap<SourceId, MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        let collectors = SourceId::all()
            .iter()
            .map(|s| (*s, MetricsCollector::new(*s)))
            .collect();
        Self { collectors }
    }

    pub async fn record(&self, source: SourceId, duration: Duration, success: bool) {
        if let Some(collector) = self.collectors.get(&source) {
            collector.record_request(duration, success).await;
        }
    }

    pub async fn get(&self, source: SourceId) -> SourceMetrics {
        match self.collectors.get(&source) {
            Some(collector) => collector.get_metrics().await,
            None => SourceMetrics::empty(source),
        }
    }

    /// Metrics for every source, in dashboard order
    pub async fn all(&self) -> Vec<SourceMetrics> {
        let mut result = Vec::with_capacity(self.collectors.len());
        for source in SourceId::all() {
            result.push(self.get(*source).await);
        }
        result
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_collector() {
        let collector = MetricsCollector::new(SourceId::Weather);

        collector.record_request(Duration::from_millis(100), true).await;
        collector.record_request(Duration::from_millis(200), true).await;
        collector.record_request(Duration::from_millis(150), false).await;

        let metrics = collector.get_metrics().await;

        assert_eq!(metrics.source, SourceId::Weather);
        assert_eq!(metrics.total_requests, 3);
        assert_eq!(metrics.failed_requests, 1);
        assert!(metrics.success_rate > 0.6 && metrics.success_rate < 0.7);
        assert_eq!(metrics.latency_p99_ms, 200.0);
    }

    #[tokio::test]
    async fn test_registry_isolates_sources() {
        let registry = MetricsRegistry::new();
        registry.record(SourceId::News, Duration::from_millis(10), false).await;

        assert_eq!(registry.get(SourceId::News).await.failed_requests, 1);
        assert_eq!(registry.get(SourceId::Crypto).await, SourceMetrics::empty(SourceId::Crypto));
        assert_eq!(registry.all().await.len(), SourceId::all().len());
    }

    #[test]
    fn test_percentile() {
        let values: Vec<f64> = (1..=11).map(f64::from).collect();
        assert_eq!(percentile(&values, 50.0), 6.0);
        assert_eq!(percentile(&values, 99.0), 11.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
