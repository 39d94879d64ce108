//! A channel that posts messages to an HTTP webhook.

use crate::core::{Channel, DeliveryError};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, instrument};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts each message as a JSON document to a fixed URL.
///
/// The request body is `{"channel": <name>, "text": <message>}`. Any 2xx
/// response counts as delivered.
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    name: String,
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl WebhookChannel {
    /// Creates a new `WebhookChannel` with the default 10 second timeout.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, err: reqwest::Error) -> DeliveryError {
        let reason = if err.is_timeout() {
            format!("request timed out after {}ms", self.timeout.as_millis())
        } else {
            err.to_string()
        };
        DeliveryError::Transport {
            channel: self.name.clone(),
            reason,
        }
    }
}

#[async_trait]
impl Channel for WebhookChannel {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, message), fields(channel = %self.name))]
    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        if message.is_empty() {
            return Err(DeliveryError::empty_message(&self.name, &self.name));
        }

        let payload = json!({ "channel": self.name, "text": message });
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request to webhook failed");
                self.transport_error(e)
            })?;

        let status = response.status();
        if status.is_success() {
            info!("Successfully delivered message to webhook.");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "Webhook rejected message");
        Err(DeliveryError::Rejected {
            channel: self.name.clone(),
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_webhook_send_success() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json(json!({ "channel": "ops", "text": "deploy finished" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let channel = WebhookChannel::new("ops", format!("{}/hook", server.uri()));

        // Act
        let result = channel.send("deploy finished").await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_webhook_handles_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let channel = WebhookChannel::new("ops", format!("{}/hook", server.uri()));
        let err = channel.send("hello").await.unwrap_err();

        assert_eq!(
            err,
            DeliveryError::Rejected {
                channel: "ops".to_string(),
                status: 500,
                body: "boom".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_webhook_handles_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let channel = WebhookChannel::new("slow", format!("{}/hook", server.uri()))
            .with_timeout(Duration::from_millis(200));
        let err = channel.send("hello").await.unwrap_err();

        match err {
            DeliveryError::Transport { channel, reason } => {
                assert_eq!(channel, "slow");
                assert!(reason.contains("timed out"), "unexpected reason: {}", reason);
            }
            other => panic!("expected a transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_webhook_rejects_empty_message_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let channel = WebhookChannel::new("ops", server.uri());
        let err = channel.send("").await.unwrap_err();

        assert!(matches!(err, DeliveryError::EmptyMessage { .. }));
    }
}
