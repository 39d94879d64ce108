//! # Internal Metrics Module
//!
//! The registry reports through the `metrics` facade macros. When metrics
//! logging is enabled, the binary installs a [`LoggingRecorder`] as the
//! global recorder, which periodically logs every counter and gauge.
//!
//! ## Metrics:
//!
//! - `notifications_delivered_total{channel}`: successful deliveries.
//! - `notifications_failed_total{channel}`: failed deliveries.
//! - `broadcast_duration_seconds`: wall time of one broadcast.
//! - `channels_registered`: current number of registered channels.

pub mod logging_recorder;

pub use logging_recorder::LoggingRecorder;

use crate::config::MetricsConfig;
use anyhow::{anyhow, Result};
use metrics::Unit;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Registers descriptions for all metrics emitted by the crate.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "notifications_delivered_total",
        Unit::Count,
        "Total number of messages successfully delivered, labeled by channel."
    );
    metrics::describe_counter!(
        "notifications_failed_total",
        Unit::Count,
        "Total number of failed deliveries, labeled by channel."
    );
    metrics::describe_histogram!(
        "broadcast_duration_seconds",
        Unit::Seconds,
        "The time taken to deliver one message to every registered channel."
    );
    metrics::describe_gauge!(
        "channels_registered",
        Unit::Count,
        "The current number of channels in the registry."
    );
}

/// Installs the logging recorder as the global recorder if enabled.
///
/// Returns the handle of the logging task, which finishes after
/// `shutdown_rx` fires.
pub fn install(
    config: &MetricsConfig,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<Option<JoinHandle<()>>> {
    if !config.log_metrics {
        return Ok(None);
    }

    info!(
        "Logging recorder enabled. Metrics will be printed every {} seconds.",
        config.log_aggregation_seconds
    );
    let interval = Duration::from_secs(config.log_aggregation_seconds.max(1));
    let (recorder, handle) = LoggingRecorder::new(interval, shutdown_rx);
    metrics::set_global_recorder(recorder)
        .map_err(|_| anyhow!("a global metrics recorder is already installed"))?;
    describe_metrics();
    Ok(Some(handle))
}
