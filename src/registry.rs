//! The channel registry and its broadcast operation.
//!
//! The registry owns a mapping from channel name to channel. Mutations are
//! serialized by a lock; a broadcast copies the current channel set under
//! the lock and releases it before any delivery starts, so slow channels
//! never block `add` or `remove`.

use crate::core::{Channel, DeliveryError};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// How a single broadcast runs its deliveries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// All deliveries of one broadcast run concurrently.
    #[default]
    Concurrent,
    /// Deliveries run one after another.
    Sequential,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Concurrent => write!(f, "concurrent"),
            DispatchMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// A concurrency-safe set of named delivery channels.
pub struct ChannelRegistry {
    channels: RwLock<HashMap<String, Arc<dyn Channel>>>,
    dispatch: DispatchMode,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.names())
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

impl ChannelRegistry {
    /// Creates an empty registry with concurrent dispatch.
    pub fn new() -> Self {
        Self::with_dispatch(DispatchMode::default())
    }

    /// Creates an empty registry with the given dispatch mode.
    pub fn with_dispatch(dispatch: DispatchMode) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            dispatch,
        }
    }

    pub fn dispatch(&self) -> DispatchMode {
        self.dispatch
    }

    // Every critical section is a single map operation, so a poisoned lock
    // still guards a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Channel>>> {
        self.channels.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Channel>>> {
        self.channels.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a channel under its own name.
    ///
    /// A channel already registered under the same name is replaced.
    pub fn add(&self, channel: Arc<dyn Channel>) {
        let name = channel.name().to_string();
        {
            let mut channels = self.write();
            if channels.insert(name.clone(), channel).is_some() {
                debug!(channel = %name, "Replaced existing channel");
            }
            // Set under the lock so the gauge matches the last mutation.
            metrics::gauge!("channels_registered").set(channels.len() as f64);
        }
        info!(channel = %name, "Registered channel");
    }

    /// Unregisters the channel with the given name. Unknown names are ignored.
    pub fn remove(&self, name: &str) {
        let removed = {
            let mut channels = self.write();
            let removed = channels.remove(name).is_some();
            if removed {
                metrics::gauge!("channels_registered").set(channels.len() as f64);
            }
            removed
        };
        if removed {
            info!(channel = %name, "Unregistered channel");
        } else {
            debug!(channel = %name, "Ignoring removal of unknown channel");
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Returns the registered channel names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Copies the current channel set so the lock can be released.
    fn snapshot(&self) -> Vec<Arc<dyn Channel>> {
        self.read().values().cloned().collect()
    }

    /// Delivers `message` to every registered channel.
    ///
    /// Returns the errors of all channels whose delivery failed, in no
    /// particular order. An empty result means every channel succeeded, or
    /// that no channel was registered.
    #[instrument(skip(self, message), fields(dispatch = %self.dispatch))]
    pub async fn broadcast(&self, message: &str) -> Vec<DeliveryError> {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            debug!("Broadcast with no registered channels");
            return Vec::new();
        }

        let start = Instant::now();
        let results = match self.dispatch {
            DispatchMode::Concurrent => {
                join_all(snapshot.iter().map(|channel| channel.send(message))).await
            }
            DispatchMode::Sequential => {
                let mut results = Vec::with_capacity(snapshot.len());
                for channel in &snapshot {
                    results.push(channel.send(message).await);
                }
                results
            }
        };

        let mut errors = Vec::new();
        for (channel, result) in snapshot.iter().zip(results) {
            let name = channel.name().to_string();
            match result {
                Ok(()) => {
                    metrics::counter!("notifications_delivered_total", "channel" => name)
                        .increment(1);
                }
                Err(e) => {
                    warn!(channel = %name, error = %e, "Delivery failed");
                    metrics::counter!("notifications_failed_total", "channel" => name)
                        .increment(1);
                    errors.push(e);
                }
            }
        }

        metrics::histogram!("broadcast_duration_seconds").record(start.elapsed().as_secs_f64());
        debug!(
            channels = snapshot.len(),
            failures = errors.len(),
            "Broadcast finished"
        );
        errors
    }
}
