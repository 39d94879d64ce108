#![allow(dead_code)]
use async_trait::async_trait;
use notifyhub::core::{Channel, DeliveryError};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::Notify;

/// A mock Channel that counts the number of messages it has received.
#[derive(Clone, Debug)]
pub struct CountingChannel {
    name: String,
    pub count: Arc<AtomicUsize>,
    pub notifier: Arc<Notify>,
}

impl CountingChannel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: Arc::new(AtomicUsize::new(0)),
            notifier: Arc::new(Notify::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub async fn wait_for_count(&self, target_count: usize, timeout_duration: std::time::Duration) {
        let wait_future = async {
            while self.count.load(Ordering::SeqCst) < target_count {
                self.notifier.notified().await;
            }
        };

        tokio::time::timeout(timeout_duration, wait_future)
            .await
            .expect("Timed out waiting for messages");
    }
}

#[async_trait]
impl Channel for CountingChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, _message: &str) -> Result<(), DeliveryError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.notifier.notify_one();
        Ok(())
    }
}

/// A mock Channel that always fails with a transport error.
#[derive(Clone, Debug)]
pub struct BrokenChannel {
    name: String,
}

impl BrokenChannel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl Channel for BrokenChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, _message: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::Transport {
            channel: self.name.clone(),
            reason: "connection reset".to_string(),
        })
    }
}
