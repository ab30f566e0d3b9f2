//! The Prometheus registry and per-transfer metric families.
//!
//! Three metrics, matching the exposition contract:
//!
//! - `rsync_tasks_seconds{source,dataset}` — duration per finalized
//!   transfer
//! - `rsync_tasks_size{source,dataset}` — byte size per finalized
//!   transfer
//! - `rsync_requests` — one increment per finalized transfer, both
//!   completed and rejected-module outcomes (exposed with the `_total`
//!   suffix the text format appends to counters)

use std::sync::Arc;

use parking_lot::RwLock;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

use rsyncwatch_events::TransferSink;

/// Label set for per-transfer metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TransferLabels {
    /// Client address the transfer came from.
    pub source: String,
    /// Module/path that was synced.
    pub dataset: String,
}

/// Per-transfer metric families.
///
/// Cloning is cheap and clones share state, so one instance can serve as
/// the correlator's sink while another backs the scrape endpoint.
#[derive(Clone)]
pub struct TransferMetrics {
    /// Transfer durations in seconds by source and dataset.
    tasks_seconds: Family<TransferLabels, Histogram, fn() -> Histogram>,
    /// Transfer sizes in bytes by source and dataset.
    tasks_size: Family<TransferLabels, Histogram, fn() -> Histogram>,
    /// Finished requests, regardless of outcome.
    requests: Counter,
}

impl std::fmt::Debug for TransferMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferMetrics")
            .field("requests", &self.requests.get())
            .finish_non_exhaustive()
    }
}

fn duration_histogram() -> Histogram {
    // 1s to ~9h doubling; rsync jobs against a daemon span that range.
    Histogram::new(exponential_buckets(1.0, 2.0, 16))
}

fn size_histogram() -> Histogram {
    // 1 KiB to 16 TiB, one bucket per factor of four.
    Histogram::new(exponential_buckets(1024.0, 4.0, 12))
}

impl TransferMetrics {
    /// Creates the transfer metrics and registers them with `registry`.
    fn new(registry: &mut Registry) -> Self {
        let tasks_seconds =
            Family::<TransferLabels, Histogram, fn() -> Histogram>::new_with_constructor(
                duration_histogram,
            );
        registry.register(
            "rsync_tasks_seconds",
            "Duration of rsync tasks",
            tasks_seconds.clone(),
        );

        let tasks_size =
            Family::<TransferLabels, Histogram, fn() -> Histogram>::new_with_constructor(
                size_histogram,
            );
        registry.register("rsync_tasks_size", "Size of rsync tasks", tasks_size.clone());

        let requests = Counter::default();
        registry.register("rsync_requests", "Number of requests received", requests.clone());

        Self {
            tasks_seconds,
            tasks_size,
            requests,
        }
    }

    /// Current finished-request count.
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.requests.get()
    }
}

impl TransferSink for TransferMetrics {
    fn observe_duration(&self, source: &str, dataset: &str, seconds: f64) {
        let labels = TransferLabels {
            source: source.to_string(),
            dataset: dataset.to_string(),
        };
        self.tasks_seconds.get_or_create(&labels).observe(seconds);
    }

    fn observe_size(&self, source: &str, dataset: &str, bytes: u64) {
        let labels = TransferLabels {
            source: source.to_string(),
            dataset: dataset.to_string(),
        };
        self.tasks_size.get_or_create(&labels).observe(bytes as f64);
    }

    fn inc_requests(&self) {
        self.requests.inc();
    }
}

/// Central Prometheus registry for the watcher.
///
/// Holds the transfer metrics and encodes them in the text exposition
/// format for the scrape endpoint.
#[derive(Clone)]
pub struct MetricsRegistry {
    /// The underlying prometheus-client registry.
    registry: Arc<RwLock<Registry>>,
    /// Per-transfer metric families.
    transfers: TransferMetrics,
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("transfers", &self.transfers)
            .finish_non_exhaustive()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    /// Creates a registry with all watcher metrics registered.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let transfers = TransferMetrics::new(&mut registry);

        Self {
            registry: Arc::new(RwLock::new(registry)),
            transfers,
        }
    }

    /// Returns the per-transfer metrics; clone to obtain a sink handle.
    #[must_use]
    pub fn transfers(&self) -> &TransferMetrics {
        &self.transfers
    }

    /// Encodes all metrics in the Prometheus text format.
    ///
    /// Serves directly as the `/metrics` response body. An encode failure
    /// is logged and yields an empty body; the scrape fails soft rather
    /// than taking the watcher down.
    #[must_use]
    pub fn encode(&self) -> String {
        let registry = self.registry.read();
        let mut buffer = String::new();
        if encode(&mut buffer, &registry).is_err() {
            tracing::error!("failed to encode prometheus metrics");
            return String::new();
        }
        buffer
    }

    /// Returns the Content-Type header value for the text format.
    #[must_use]
    pub const fn content_type() -> &'static str {
        "text/plain; version=0.0.4; charset=utf-8"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_includes_all_registered_metrics() {
        let registry = MetricsRegistry::new();
        let sink = registry.transfers().clone();

        sink.observe_duration("10.0.0.1", "backups", 5.0);
        sink.observe_size("10.0.0.1", "backups", 4096);
        sink.inc_requests();

        let output = registry.encode();
        assert!(output.contains("rsync_tasks_seconds"));
        assert!(output.contains("rsync_tasks_size"));
        assert!(output.contains("rsync_requests_total 1"));
        assert!(output.contains("source=\"10.0.0.1\""));
        assert!(output.contains("dataset=\"backups\""));
    }

    #[test]
    fn cloned_sinks_share_state() {
        let registry = MetricsRegistry::new();
        let sink1 = registry.transfers().clone();
        let sink2 = registry.transfers().clone();

        sink1.inc_requests();
        sink2.inc_requests();

        assert_eq!(registry.transfers().requests(), 2);
    }

    #[test]
    fn labels_separate_series() {
        let registry = MetricsRegistry::new();
        let sink = registry.transfers().clone();

        sink.observe_duration("a", "x", 1.0);
        sink.observe_duration("b", "y", 2.0);

        let output = registry.encode();
        assert!(output.contains("source=\"a\""));
        assert!(output.contains("source=\"b\""));
        assert!(output.contains("dataset=\"x\""));
        assert!(output.contains("dataset=\"y\""));
    }

    #[test]
    fn rejected_modules_observe_zero_size() {
        let registry = MetricsRegistry::new();
        let sink = registry.transfers().clone();

        sink.observe_size("10.0.0.2", "secrets", 0);
        sink.inc_requests();

        let output = registry.encode();
        assert!(output.contains("rsync_tasks_size_sum{source=\"10.0.0.2\",dataset=\"secrets\"} 0"));
    }

    #[test]
    fn content_type_is_the_text_exposition_format() {
        let ct = MetricsRegistry::content_type();
        assert!(ct.contains("text/plain"));
        assert!(ct.contains("0.0.4"));
    }
}
