//! Namespace drift CLI
//!
//! Snapshots one namespace on two clusters concurrently, compares them and
//! prints every difference. Exits 0 when identical, 1 on drift, 2 when either
//! snapshot could not be collected.

mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use drift_lib::collector::{collect_pair, CollectOptions, KubeCollector, ResourceCollector};
use drift_lib::{compare, DriftLogger};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status for a run that could not produce a report
const EXIT_FATAL: u8 = 2;

/// Namespace drift detector
#[derive(Parser)]
#[command(name = "nsdrift")]
#[command(
    author,
    version,
    about = "Detect configuration drift of a namespace between two clusters",
    long_about = None
)]
pub struct Cli {
    /// Kubeconfig for the first (reference) cluster
    #[arg(long)]
    pub kubeconfig1: PathBuf,

    /// Kubeconfig for the second cluster
    #[arg(long)]
    pub kubeconfig2: PathBuf,

    /// Context to use from the first kubeconfig (defaults to its current context)
    #[arg(long)]
    pub context1: Option<String>,

    /// Context to use from the second kubeconfig (defaults to its current context)
    #[arg(long)]
    pub context2: Option<String>,

    /// Namespace to compare
    #[arg(long, short)]
    pub namespace: String,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Name of the registry credential secret to check for
    #[arg(long)]
    pub credential_secret: Option<String>,

    /// Per-cluster collection deadline in seconds (0 disables it)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Configuration file (defaults to ~/.config/nsdrift/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            output::print_error(&format!("{e:#}"));
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Logs go to stderr; stdout carries only the report
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let settings = config::Settings::load(cli.config.as_deref())?;
    let format = cli.format.unwrap_or(settings.format);
    let timeout_secs = cli.timeout.unwrap_or(settings.timeout_secs);
    let options = CollectOptions {
        credential_secret: cli
            .credential_secret
            .unwrap_or(settings.credential_secret),
        timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
    };

    let first = connect(&cli.kubeconfig1, cli.context1.as_deref()).await?;
    let second = connect(&cli.kubeconfig2, cli.context2.as_deref()).await?;

    info!(
        namespace = %cli.namespace,
        first = %first.cluster(),
        second = %second.cluster(),
        "Comparing namespace"
    );

    let (a, b) = collect_pair(&first, &second, &cli.namespace, &options)
        .await
        .context("Failed to collect namespace snapshots")?;
    let report = compare(&a, &b);

    DriftLogger::new(&cli.namespace).comparison_finished(first.cluster(), second.cluster(), &report);

    let run = output::RunInfo {
        namespace: &cli.namespace,
        first_cluster: first.cluster(),
        second_cluster: second.cluster(),
    };
    output::print_report(&report, format, &run)?;

    Ok(report.exit_code())
}

async fn connect(kubeconfig: &Path, context: Option<&str>) -> Result<KubeCollector> {
    let label = match context {
        Some(ctx) => ctx.to_string(),
        None => kubeconfig.display().to_string(),
    };
    let collector = KubeCollector::from_kubeconfig(label, kubeconfig, context).await?;
    Ok(collector)
}
