use crate::core::{Channel, DeliveryError};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

/// Fake channel for testing
///
/// Records every message it is asked to deliver and can be switched into a
/// failing mode at any time.
#[derive(Clone, Debug)]
pub struct FakeChannel {
    name: String,
    fail: Arc<AtomicBool>,
    delay: Option<Duration>,
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl FakeChannel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: Arc::new(AtomicBool::new(false)),
            delay: None,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A fake that fails every delivery with a transport error.
    pub fn failing(name: &str) -> Self {
        let channel = Self::new(name);
        channel.set_fail_on_send(true);
        channel
    }

    /// Sleeps for `delay` before each delivery.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_fail_on_send(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent_messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for FakeChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Transport {
                channel: self.name.clone(),
                reason: "fake failure".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }
}
