//! A cancellable batch transform that doubles every number it is given.
//!
//! Cancellation is observed at item boundaries: the token is checked before
//! each item, and whatever was computed up to that point is handed back
//! together with the reason processing stopped.

use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Why a batch stopped before the last item.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BatchError {
    /// The cancellation token fired after `processed` items.
    #[error("processing cancelled after {processed} items")]
    Cancelled { processed: usize },
    /// Doubling the item at `index` would overflow.
    #[error("doubling {value} at index {index} overflows")]
    Overflow { index: usize, value: i64 },
}

/// The results of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Doubled values for every item processed before stopping.
    pub results: Vec<i64>,
    /// Set when processing stopped early.
    pub error: Option<BatchError>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Doubles each of `items`, checking `cancel` before every item.
///
/// `item_delay` is spent on each item before its result is recorded; pass
/// [`Duration::ZERO`] for no delay.
pub async fn process(
    cancel: &CancellationToken,
    items: &[i64],
    item_delay: Duration,
) -> BatchOutcome {
    let mut results = Vec::with_capacity(items.len());

    for (index, &value) in items.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(processed = results.len(), total = items.len(), "Batch cancelled");
            return BatchOutcome {
                results,
                error: Some(BatchError::Cancelled { processed: index }),
            };
        }

        if !item_delay.is_zero() {
            tokio::time::sleep(item_delay).await;
        }

        match value.checked_mul(2) {
            Some(doubled) => results.push(doubled),
            None => {
                return BatchOutcome {
                    results,
                    error: Some(BatchError::Overflow { index, value }),
                };
            }
        }
    }

    debug!(processed = results.len(), "Batch finished");
    BatchOutcome {
        results,
        error: None,
    }
}
