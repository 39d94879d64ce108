//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. Global flags are also a `figment` provider so they override
//! the configuration file and environment variables.

use crate::registry::DispatchMode;
use clap::{Parser, Subcommand};
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Broadcast notifications to a set of delivery channels.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// How a broadcast runs its deliveries.
    #[arg(long, value_enum, global = true)]
    pub dispatch: Option<DispatchMode>,

    /// Periodically log delivery metrics.
    #[arg(long, global = true)]
    pub log_metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Send one message to every configured channel.
    Broadcast {
        /// The message to send. May be empty.
        message: String,
    },
    /// Broadcast each line read from stdin until EOF or Ctrl-C.
    Relay,
    /// Validate a CPF number.
    ValidateCpf {
        /// The CPF, with or without punctuation.
        cpf: String,
    },
    /// Double a list of numbers, optionally cancelling after a timeout.
    Double {
        /// Simulated work per item in milliseconds (overrides the config).
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,
        /// Cancel processing after this many milliseconds.
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,
        /// The numbers to double.
        #[arg(allow_negative_numbers = true)]
        numbers: Vec<i64>,
    },
    /// Recalculate, validate and pretty-print an order JSON file.
    Order {
        /// Path to the order JSON file.
        file: PathBuf,
    },
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(mode) = self.dispatch {
            let mut registry = Dict::new();
            registry.insert("dispatch".into(), Value::from(mode.to_string()));
            dict.insert("registry".into(), Value::Dict(Tag::Default, registry));
        }

        // A flag can only switch logging on; absence leaves the configured value.
        if self.log_metrics {
            let mut metrics = Dict::new();
            metrics.insert("log_metrics".into(), Value::from(true));
            dict.insert("metrics".into(), Value::Dict(Tag::Default, metrics));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
