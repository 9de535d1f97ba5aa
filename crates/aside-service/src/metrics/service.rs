//! Cache-aside metrics recording.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Describes the service metrics to the installed recorder.
/// Call once at startup, after installing a recorder.
pub fn register_service_metrics() {
    metrics::describe_counter!("aside_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!(
        "aside_cache_misses_total",
        "Total number of cache misses, including reads downgraded to a miss"
    );
    metrics::describe_counter!(
        "aside_cache_errors_total",
        "Cache failures recovered by the service, by kind"
    );
    metrics::describe_counter!(
        "aside_cache_populations_total",
        "Records written to the cache after a store read"
    );
    metrics::describe_counter!("aside_store_reads_total", "Persistent store lookups");
    metrics::describe_counter!(
        "aside_store_failures_total",
        "Persistent store lookups that failed"
    );
    metrics::describe_counter!(
        "aside_not_found_total",
        "Lookups where neither cache nor store held the key"
    );
    metrics::describe_histogram!(
        "aside_get_duration_seconds",
        "Time spent answering a get, by outcome"
    );
}

/// Recorder of cache-aside metrics.
///
/// Every event is forwarded to the `metrics` facade and also counted in
/// process, so counts can be read back without a recorder installed.
/// Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct CacheAsideMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    cache_errors: Arc<AtomicU64>,
    populations: Arc<AtomicU64>,
    store_reads: Arc<AtomicU64>,
    store_failures: Arc<AtomicU64>,
    not_found: Arc<AtomicU64>,
}

impl CacheAsideMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("aside_cache_hits_total").increment(1);
    }

    /// Records a cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("aside_cache_misses_total").increment(1);
    }

    /// Records a recovered cache failure
    pub fn record_cache_error(&self, kind: &'static str) {
        self.cache_errors.fetch_add(1, Ordering::Relaxed);
        counter!("aside_cache_errors_total", "kind" => kind).increment(1);
    }

    /// Records a successful cache write
    pub fn record_population(&self) {
        self.populations.fetch_add(1, Ordering::Relaxed);
        counter!("aside_cache_populations_total").increment(1);
    }

    /// Records a persistent store lookup
    pub fn record_store_read(&self) {
        self.store_reads.fetch_add(1, Ordering::Relaxed);
        counter!("aside_store_reads_total").increment(1);
    }

    /// Records a failed persistent store lookup
    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
        counter!("aside_store_failures_total").increment(1);
    }

    /// Records a lookup that found nothing
    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
        counter!("aside_not_found_total").increment(1);
    }

    /// Records how long a get took
    pub fn record_get_duration(&self, outcome: &'static str, duration: Duration) {
        histogram!("aside_get_duration_seconds", "outcome" => outcome).record(duration.as_secs_f64());
    }

    /// Hit rate over all lookups (for logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn cache_errors(&self) -> u64 {
        self.cache_errors.load(Ordering::Relaxed)
    }

    pub fn populations(&self) -> u64 {
        self.populations.load(Ordering::Relaxed)
    }

    pub fn store_reads(&self) -> u64 {
        self.store_reads.load(Ordering::Relaxed)
    }

    pub fn store_failures(&self) -> u64 {
        self.store_failures.load(Ordering::Relaxed)
    }

    pub fn not_found(&self) -> u64 {
        self.not_found.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let metrics = CacheAsideMetrics::new();
        assert_eq!(metrics.hit_rate(), 0.0);

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();

        assert!((metrics.hit_rate() - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = CacheAsideMetrics::new();
        let clone = metrics.clone();

        clone.record_store_read();
        clone.record_cache_error("read");
        clone.record_not_found();

        assert_eq!(metrics.store_reads(), 1);
        assert_eq!(metrics.cache_errors(), 1);
        assert_eq!(metrics.not_found(), 1);
        assert_eq!(metrics.store_failures(), 0);
    }
}
