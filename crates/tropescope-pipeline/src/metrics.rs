//! Metrics collection for pipeline runs

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated concurrently by every classification
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    classifications: AtomicU64,
    cache_hits: AtomicU64,
    fast_path: AtomicU64,
    pipeline_runs: AtomicU64,
    degraded: AtomicU64,
    failures: AtomicU64,
}

impl PipelineMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// A classification was requested
    pub fn record_classification(&self) {
        self.classifications.fetch_add(1, Ordering::Relaxed);
    }

    /// A result was served without running a computation
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A short input skipped the stages
    pub fn record_fast_path(&self) {
        self.fast_path.fetch_add(1, Ordering::Relaxed);
    }

    /// The oracle-backed stages started for an input
    pub fn record_pipeline_run(&self) {
        self.pipeline_runs.fetch_add(1, Ordering::Relaxed);
    }

    /// A result was produced with at least one soft failure
    pub fn record_degraded(&self) {
        self.degraded.fetch_add(1, Ordering::Relaxed);
    }

    /// A classification ended in an error
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            classifications: self.classifications.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            fast_path: self.fast_path.load(Ordering::Relaxed),
            pipeline_runs: self.pipeline_runs.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.classifications.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.fast_path.store(0, Ordering::Relaxed);
        self.pipeline_runs.store(0, Ordering::Relaxed);
        self.degraded.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
    }
}

/// Counter values at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Classifications requested; duplicate texts within one batch count once
    pub classifications: u64,
    /// Served from cache or from a concurrent identical request
    pub cache_hits: u64,
    /// Short inputs answered without the oracle
    pub fast_path: u64,
    /// Executions of the oracle-backed stages
    pub pipeline_runs: u64,
    /// Results carrying a degradation marker
    pub degraded: u64,
    /// Classifications that returned an error
    pub failures: u64,
}

impl MetricsSnapshot {
    /// Fraction of classifications served from cache
    pub fn cache_hit_rate(&self) -> f64 {
        if self.classifications == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.classifications as f64
        }
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = [
            "Pipeline Metrics Summary".to_string(),
            "========================".to_string(),
            format!("Classifications: {}", self.classifications),
            format!("Cache hits: {} ({:.1}%)", self.cache_hits, self.cache_hit_rate() * 100.0),
            format!("Fast path: {}", self.fast_path),
            format!("Pipeline runs: {}", self.pipeline_runs),
            format!("Degraded results: {}", self.degraded),
            format!("Failures: {}", self.failures),
        ];
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_record_counters() {
        let metrics = PipelineMetrics::new();
        metrics.record_classification();
        metrics.record_classification();
        metrics.record_classification();
        metrics.record_classification();
        metrics.record_cache_hit();
        metrics.record_pipeline_run();
        metrics.record_degraded();
        metrics.record_failure();
        metrics.record_fast_path();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.classifications, 4);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.pipeline_runs, 1);
        assert_eq!(snapshot.degraded, 1);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.fast_path, 1);
        assert_eq!(snapshot.cache_hit_rate(), 0.25);
    }

    #[test]
    fn test_reset() {
        let metrics = PipelineMetrics::new();
        metrics.record_classification();
        metrics.record_failure();
        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_summary() {
        let snapshot = MetricsSnapshot {
            classifications: 10,
            cache_hits: 5,
            fast_path: 1,
            pipeline_runs: 4,
            degraded: 2,
            failures: 0,
        };

        let summary = snapshot.summary();
        assert!(summary.contains("Classifications: 10"));
        assert!(summary.contains("Cache hits: 5 (50.0%)"));
        assert!(summary.contains("Degraded results: 2"));
    }
}
