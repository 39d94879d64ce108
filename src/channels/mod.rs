//! Delivery channels that can be registered with a [`ChannelRegistry`].
//!
//! The reference channels (email, SMS, push) share no state and differ only
//! in their name and the wording of their log and error messages. The
//! webhook channel performs real HTTP I/O.
//!
//! [`ChannelRegistry`]: crate::registry::ChannelRegistry

pub mod webhook;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use webhook::WebhookChannel;

use crate::core::{Channel, DeliveryError};
use async_trait::async_trait;
use tracing::info;

/// Rejects empty messages on behalf of a reference channel.
fn ensure_not_empty(name: &str, label: &str, message: &str) -> Result<(), DeliveryError> {
    if message.is_empty() {
        return Err(DeliveryError::empty_message(name, label));
    }
    Ok(())
}

/// Sends messages by electronic mail.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailChannel;

impl EmailChannel {
    pub const NAME: &'static str = "email";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Channel for EmailChannel {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        ensure_not_empty(Self::NAME, "Email", message)?;
        info!(channel = Self::NAME, message, "Email sent");
        Ok(())
    }
}

/// Sends messages as short text messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmsChannel;

impl SmsChannel {
    pub const NAME: &'static str = "sms";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Channel for SmsChannel {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        ensure_not_empty(Self::NAME, "SMS", message)?;
        info!(channel = Self::NAME, message, "SMS sent");
        Ok(())
    }
}

/// Sends messages as push notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushChannel;

impl PushChannel {
    pub const NAME: &'static str = "push";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Channel for PushChannel {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        ensure_not_empty(Self::NAME, "Push", message)?;
        info!(channel = Self::NAME, message, "Push sent");
        Ok(())
    }
}
