//! Core domain types and service traits for NotifyHub
//!
//! This module defines the delivery capability every channel implements and
//! the error a single delivery attempt can produce.

use async_trait::async_trait;
use thiserror::Error;

/// A failure reported by a single channel's delivery attempt.
///
/// Every variant carries the name of the channel that produced it so that
/// aggregated broadcast results stay attributable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The message was empty. Nothing was delivered.
    #[error("empty message for {label}")]
    EmptyMessage {
        /// Registry key of the channel.
        channel: String,
        /// Human-readable channel label used in the error text.
        label: String,
    },

    /// The channel could not reach its destination (network error, timeout).
    #[error("{channel}: delivery failed: {reason}")]
    Transport { channel: String, reason: String },

    /// The destination answered, but refused the message.
    #[error("{channel}: delivery rejected with status {status}: {body}")]
    Rejected {
        channel: String,
        status: u16,
        body: String,
    },
}

impl DeliveryError {
    /// Builds an [`DeliveryError::EmptyMessage`] for the given channel.
    pub fn empty_message(channel: impl Into<String>, label: impl Into<String>) -> Self {
        Self::EmptyMessage {
            channel: channel.into(),
            label: label.into(),
        }
    }

    /// Returns the name of the channel this error is attributed to.
    pub fn channel(&self) -> &str {
        match self {
            Self::EmptyMessage { channel, .. }
            | Self::Transport { channel, .. }
            | Self::Rejected { channel, .. } => channel,
        }
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// Delivers text messages to one destination.
#[async_trait]
pub trait Channel: Send + Sync {
    /// A unique, stable name for the channel (e.g., "email", "sms").
    /// Used as the registry key, and for logging and metrics.
    fn name(&self) -> &str;

    /// Delivers a message through this channel.
    ///
    /// # Arguments
    /// * `message` - The text to deliver
    ///
    /// # Returns
    /// * `Ok(())` if the message was delivered
    /// * `Err(DeliveryError)` if the message is empty or delivery failed
    async fn send(&self, message: &str) -> Result<(), DeliveryError>;
}
