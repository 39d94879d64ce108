//! A metrics recorder that periodically logs all captured metrics.

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use metrics_util::registry::{AtomicStorage, Registry};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, Instrument};

/// A metrics recorder that periodically logs counters and gauges via `tracing`.
pub struct LoggingRecorder {
    registry: Arc<Registry<Key, AtomicStorage>>,
}

impl LoggingRecorder {
    /// Creates a new `LoggingRecorder` and starts a background task to log metrics.
    ///
    /// The task logs one snapshot every `aggregation_interval`, and a final
    /// snapshot once `shutdown_rx` changes or its sender is dropped.
    pub fn new(
        aggregation_interval: Duration,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> (Self, JoinHandle<()>) {
        let registry = Arc::new(Registry::new(AtomicStorage));
        let recorder = Self {
            registry: registry.clone(),
        };

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(aggregation_interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!("--- Metrics Snapshot ---");
                        log_snapshot(&registry);
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Metrics logging task received shutdown signal.");
                        log_snapshot(&registry);
                        break;
                    }
                }
            }
        }
        .in_current_span());

        (recorder, handle)
    }

    /// Renders the current value of every counter and gauge, sorted by key.
    pub fn snapshot(&self) -> Vec<String> {
        render(&self.registry)
    }
}

fn format_key(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|label| format!("{}={}", label.key(), label.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

fn render(registry: &Registry<Key, AtomicStorage>) -> Vec<String> {
    let mut lines: Vec<String> = registry
        .get_counter_handles()
        .into_iter()
        .map(|(key, counter)| format!("[Counter] {}: {}", format_key(&key), counter.load(Ordering::Relaxed)))
        .chain(registry.get_gauge_handles().into_iter().map(|(key, gauge)| {
            let value = f64::from_bits(gauge.load(Ordering::Relaxed));
            format!("[Gauge] {}: {}", format_key(&key), value)
        }))
        .collect();
    lines.sort();
    lines
}

fn log_snapshot(registry: &Registry<Key, AtomicStorage>) {
    for line in render(registry) {
        info!("{}", line);
    }
}

impl Recorder for LoggingRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {
        // Descriptions are not logged
    }

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {
        // Descriptions are not logged
    }

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {
        // Descriptions are not logged
    }

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        self.registry.get_or_create_counter(key, |c| c.clone()).into()
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        self.registry.get_or_create_gauge(key, |g| g.clone()).into()
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        self.registry.get_or_create_histogram(key, |h| h.clone()).into()
    }
}
