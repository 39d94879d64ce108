//! NotifyHub - Fan-out Notification CLI
//!
//! Loads the layered configuration, builds the channel registry and runs a
//! single command against it.

use anyhow::{Context, Result};
use clap::Parser;
use notifyhub::{
    app::{build_registry, run_relay},
    batch,
    cli::{Cli, Command},
    config::Config,
    cpf,
    internal_metrics,
    order::Order,
};
use std::{process::ExitCode, time::Duration};
use tokio::io::BufReader;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {:#}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    // Initialize logging. RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?config, "Configuration loaded");

    match cli.command {
        Command::Broadcast { message } => broadcast(&config, &message).await,
        Command::Relay => relay(&config).await,
        Command::ValidateCpf { cpf } => Ok(validate_cpf(&cpf)),
        Command::Double {
            delay_ms,
            timeout_ms,
            numbers,
        } => {
            let delay = Duration::from_millis(delay_ms.unwrap_or(config.batch.item_delay_ms));
            Ok(double(&numbers, delay, timeout_ms.map(Duration::from_millis)).await)
        }
        Command::Order { file } => {
            let json = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read order file {}", file.display()))?;
            Ok(order(&json))
        }
    }
}

async fn broadcast(config: &Config, message: &str) -> Result<ExitCode> {
    let registry = build_registry(&config.registry);
    let errors = registry.broadcast(message).await;

    if errors.is_empty() {
        println!("delivered to {} channel(s)", registry.len());
        return Ok(ExitCode::SUCCESS);
    }

    for e in &errors {
        println!("{}: {}", e.channel(), e);
    }
    Ok(ExitCode::FAILURE)
}

async fn relay(config: &Config) -> Result<ExitCode> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let metrics_task = internal_metrics::install(&config.metrics, shutdown_rx.clone())?;
    let registry = build_registry(&config.registry);

    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received. Shutting down gracefully...");
            let _ = signal_tx.send(true);
        }
    });

    let stats = run_relay(&registry, BufReader::new(tokio::io::stdin()), shutdown_rx).await?;

    // Stop the metrics task so it logs its final snapshot.
    let _ = shutdown_tx.send(true);
    if let Some(handle) = metrics_task {
        if let Err(e) = handle.await {
            error!("Metrics task panicked: {:?}", e);
        }
    }

    println!(
        "relayed {} message(s), {} delivery failure(s)",
        stats.messages, stats.failures
    );
    Ok(ExitCode::SUCCESS)
}

fn validate_cpf(input: &str) -> ExitCode {
    match cpf::validate(input) {
        Ok(()) => {
            println!("valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("invalid: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn double(numbers: &[i64], delay: Duration, timeout: Option<Duration>) -> ExitCode {
    let cancel = CancellationToken::new();
    if let Some(timeout) = timeout {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            cancel.cancel();
        });
    }

    let outcome = batch::process(&cancel, numbers, delay).await;
    let rendered: Vec<String> = outcome.results.iter().map(i64::to_string).collect();
    println!("{}", rendered.join(" "));

    match outcome.error {
        None => ExitCode::SUCCESS,
        Some(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn order(json: &str) -> ExitCode {
    let mut order = match Order::from_json(json) {
        Ok(order) => order,
        Err(e) => {
            eprintln!("error: invalid order JSON: {}", e);
            return ExitCode::FAILURE;
        }
    };
    order.calculate_total();

    if let Err(e) = order.validate() {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match order.to_json_pretty() {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to encode order: {}", e);
            ExitCode::FAILURE
        }
    }
}
