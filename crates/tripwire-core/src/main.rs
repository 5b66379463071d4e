//! Tripwire CLI
//!
//! Command-line interface for the Tripwire check evaluator.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use tripwire::checker::{FileTargetChecker, ThresholdValueChecker};
use tripwire::models::{Alert, AlertType, Check};
use tripwire::notification::{
    LogNotificationService, NotificationDispatcher, WebhookNotificationService,
};
use tripwire::schedule::{CheckRunner, CheckScheduler};
use tripwire::store::{AlertsStore, ChecksStore, MemoryAlertsStore, MemoryChecksStore};
use tripwire::Config;

/// Tripwire - threshold checks over time-series targets
#[derive(Parser)]
#[command(name = "tripwire")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "TRIPWIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (for commands that support it)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate checks on the configured interval until interrupted
    Run {
        /// JSON file holding the checks to evaluate
        #[arg(long)]
        checks: PathBuf,

        /// JSON file the target values are read from on every run
        #[arg(long)]
        values: PathBuf,
    },

    /// Evaluate every check once and print the result
    Evaluate {
        /// JSON file holding the checks to evaluate
        #[arg(long)]
        checks: PathBuf,

        /// JSON file holding the current target values
        #[arg(long)]
        values: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    tripwire::telemetry::init(&config.logging, cli.verbose);

    // Execute command
    let result = match cli.command {
        Commands::Run { checks, values } => run_scheduler(config, &checks, values).await,
        Commands::Evaluate { checks, values } => {
            run_evaluate(config, &checks, values, cli.format).await
        }
        Commands::Config => print_config(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Everything a command needs to evaluate checks
struct Engine {
    checks: MemoryChecksStore,
    alerts: MemoryAlertsStore,
    scheduler: CheckScheduler,
}

fn build_engine(config: &Config, checks_path: &Path, values_path: PathBuf) -> anyhow::Result<Engine> {
    let raw = std::fs::read_to_string(checks_path)
        .with_context(|| format!("failed to read checks from {}", checks_path.display()))?;
    let loaded: Vec<Check> = serde_json::from_str(&raw)
        .with_context(|| format!("malformed checks file {}", checks_path.display()))?;

    info!(count = loaded.len(), "Loaded checks");

    let checks: MemoryChecksStore = loaded.into_iter().collect();
    let alerts = MemoryAlertsStore::new();

    let mut dispatcher = NotificationDispatcher::default();
    if config.notifications.log_channel_enabled {
        dispatcher.register(Arc::new(LogNotificationService::new()));
    }
    dispatcher.register(Arc::new(WebhookNotificationService::new(
        config.notifications.webhook_timeout,
    )?));

    let runner = CheckRunner::new(
        Arc::new(alerts.clone()),
        Arc::new(checks.clone()),
        Arc::new(FileTargetChecker::new(values_path)),
        Arc::new(ThresholdValueChecker::new()),
        dispatcher,
    );

    let scheduler = CheckScheduler::new(
        Arc::new(runner),
        Arc::new(checks.clone()),
        config.scheduler.clone(),
    );

    Ok(Engine {
        checks,
        alerts,
        scheduler,
    })
}

async fn run_scheduler(config: Config, checks: &Path, values: PathBuf) -> anyhow::Result<()> {
    let engine = build_engine(&config, checks, values)?;
    let shutdown = CancellationToken::new();

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl+C received, shutting down...");
            }
            shutdown.cancel();
        });
    }

    engine.scheduler.run(shutdown).await;
    Ok(())
}

#[derive(Serialize)]
struct CheckResult {
    name: String,
    enabled: bool,
    state: AlertType,
    last_values: tripwire::models::TargetValues,
    alerts: Vec<Alert>,
}

async fn run_evaluate(
    config: Config,
    checks: &Path,
    values: PathBuf,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let engine = build_engine(&config, checks, values)?;
    let summary = engine.scheduler.run_once().await?;

    let mut results = Vec::new();
    for check in engine.checks.get_checks(false).await? {
        let alerts = engine.alerts.alerts_for_check(check.id).await?;
        results.push(CheckResult {
            name: check.name,
            enabled: check.enabled,
            state: check.state,
            last_values: check.last_values,
            alerts,
        });
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => {
            for result in &results {
                let marker = if result.enabled { "" } else { " (disabled)" };
                println!("{:<8} {}{}", result.state.as_str(), result.name, marker);
                for alert in &result.alerts {
                    println!(
                        "         {} {:.2}: {} -> {}",
                        alert.target, alert.value, alert.from_type, alert.to_type
                    );
                }
            }
            println!();
            println!(
                "{} completed, {} aborted, {} timed out",
                summary.completed, summary.aborted, summary.timed_out
            );
        }
    }

    Ok(())
}

fn print_config(config: &Config) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
