//! Application wiring, decoupled from the entry point.

use crate::{
    channels::{EmailChannel, PushChannel, SmsChannel, WebhookChannel},
    config::{ChannelKind, RegistryConfig},
    core::Channel,
    registry::ChannelRegistry,
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Creates the built-in channel for `kind`.
pub fn builtin_channel(kind: ChannelKind) -> Arc<dyn Channel> {
    match kind {
        ChannelKind::Email => Arc::new(EmailChannel::new()),
        ChannelKind::Sms => Arc::new(SmsChannel::new()),
        ChannelKind::Push => Arc::new(PushChannel::new()),
    }
}

/// Builds a registry holding every channel enabled in `config`.
pub fn build_registry(config: &RegistryConfig) -> ChannelRegistry {
    let registry = ChannelRegistry::with_dispatch(config.dispatch);
    for kind in &config.channels {
        debug!(kind = %kind, "Initializing built-in channel");
        registry.add(builtin_channel(*kind));
    }
    for webhook in &config.webhooks {
        debug!(name = %webhook.name, url = %webhook.url, "Initializing webhook channel");
        let channel = WebhookChannel::new(webhook.name.clone(), webhook.url.clone())
            .with_timeout(Duration::from_millis(webhook.timeout_ms));
        registry.add(Arc::new(channel));
    }
    if registry.is_empty() {
        warn!("No channels configured; broadcasts will not deliver anywhere.");
    }
    registry
}

/// Totals of a relay session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Messages broadcast.
    pub messages: usize,
    /// Individual channel failures across all broadcasts.
    pub failures: usize,
}

/// Broadcasts every non-empty line of `input` until EOF or shutdown.
#[instrument(skip_all)]
pub async fn run_relay<R>(
    registry: &ChannelRegistry,
    input: R,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<RelayStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut stats = RelayStats::default();
    info!(channels = ?registry.names(), "Relay started.");

    loop {
        let line = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                info!("Relay received shutdown signal.");
                break;
            }
            line = lines.next_line() => line.context("failed to read message from input")?,
        };

        let Some(line) = line else {
            info!("Input closed.");
            break;
        };
        let message = line.trim_end();
        if message.is_empty() {
            debug!("Skipping blank line");
            continue;
        }

        let errors = registry.broadcast(message).await;
        stats.messages += 1;
        stats.failures += errors.len();
        for e in &errors {
            warn!(channel = e.channel(), error = %e, "Relay delivery failed");
        }
    }

    info!(
        messages = stats.messages,
        failures = stats.failures,
        "Relay finished."
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::test_utils::FakeChannel;
    use crate::config::WebhookConfig;
    use crate::registry::DispatchMode;
    use tokio::io::{AsyncWriteExt, BufReader};

    #[test]
    fn test_build_registry_from_config() {
        let config = RegistryConfig {
            channels: vec![ChannelKind::Email, ChannelKind::Push],
            dispatch: DispatchMode::Sequential,
            webhooks: vec![WebhookConfig {
                name: "ops".to_string(),
                url: "http://127.0.0.1:9/hook".to_string(),
                timeout_ms: 500,
            }],
        };

        let registry = build_registry(&config);

        assert_eq!(registry.names(), vec!["email", "ops", "push"]);
        assert_eq!(registry.dispatch(), DispatchMode::Sequential);
    }

    #[tokio::test]
    async fn test_relay_broadcasts_each_line() {
        let registry = ChannelRegistry::new();
        let fake = FakeChannel::new("fake");
        registry.add(Arc::new(fake.clone()));
        registry.add(Arc::new(FakeChannel::failing("broken")));
        let (_tx, rx) = watch::channel(false);

        let input = BufReader::new(&b"first\n\nsecond\r\n"[..]);
        let stats = run_relay(&registry, input, rx).await.unwrap();

        assert_eq!(stats, RelayStats { messages: 2, failures: 2 });
        assert_eq!(fake.sent_messages(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_relay_stops_on_shutdown() {
        let registry = ChannelRegistry::new();
        let (tx, rx) = watch::channel(false);
        // The writer half stays open, so only the shutdown signal can end the relay.
        let (reader, mut writer) = tokio::io::duplex(64);
        writer.write_all(b"hello\n").await.unwrap();

        let relay = tokio::spawn(async move {
            let registry = registry;
            run_relay(&registry, BufReader::new(reader), rx).await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        let stats = tokio::time::timeout(Duration::from_secs(5), relay)
            .await
            .expect("relay did not stop")
            .unwrap()
            .unwrap();
        assert_eq!(stats.messages, 1);
        drop(writer);
    }
}
