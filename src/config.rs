//! Configuration management for NotifyHub
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to layer built-in defaults, a `notifyhub.toml` file, environment
//! variables and command-line overrides.

use crate::cli::Cli;
use crate::registry::DispatchMode;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "notifyhub.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Which channels to register and how to broadcast to them.
    pub registry: RegistryConfig,
    /// Configuration for the batch transform.
    pub batch: BatchConfig,
    /// Configuration for metrics logging.
    pub metrics: MetricsConfig,
}

/// The built-in channel variants that can be enabled by name.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Email,
    Sms,
    Push,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Email => write!(f, "email"),
            ChannelKind::Sms => write!(f, "sms"),
            ChannelKind::Push => write!(f, "push"),
        }
    }
}

/// Configuration for the channel registry.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RegistryConfig {
    /// Built-in channels to register at startup.
    pub channels: Vec<ChannelKind>,
    /// How a broadcast runs its deliveries.
    pub dispatch: DispatchMode,
    /// Webhook channels to register at startup.
    #[serde(default)]
    pub webhooks: Vec<WebhookConfig>,
}

fn default_webhook_timeout_ms() -> u64 {
    10_000
}

/// Configuration for a single webhook channel.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WebhookConfig {
    /// The registry name of the channel.
    pub name: String,
    /// The URL messages are posted to.
    pub url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_webhook_timeout_ms")]
    pub timeout_ms: u64,
}

/// Configuration for the batch transform.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BatchConfig {
    /// Simulated work per item in milliseconds.
    pub item_delay_ms: u64,
}

/// Configuration for metrics logging.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Log metrics to the console periodically.
    pub log_metrics: bool,
    /// The interval in seconds between metric log lines.
    pub log_aggregation_seconds: u64,
}

impl Config {
    /// Loads the application configuration.
    ///
    /// Sources are merged in order, later ones winning: defaults, the TOML
    /// file, `NOTIFYHUB_*` environment variables, and finally the
    /// command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let path = match &cli.config {
            Some(path) => {
                if !path.exists() {
                    bail!("configuration file not found: {}", path.display());
                }
                path.clone()
            }
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            // Nested keys use a double underscore, e.g. NOTIFYHUB_REGISTRY__DISPATCH=sequential
            .merge(Env::prefixed("NOTIFYHUB_").split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            registry: RegistryConfig {
                channels: vec![ChannelKind::Email, ChannelKind::Sms, ChannelKind::Push],
                dispatch: DispatchMode::Concurrent,
                webhooks: vec![],
            },
            batch: BatchConfig { item_delay_ms: 0 },
            metrics: MetricsConfig {
                log_metrics: false,
                log_aggregation_seconds: 60,
            },
        }
    }
}
