//! docqueue - batch scheduler for document operations
//!
//! CLI entry point for running manifests against the scheduler.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use docqueue::cli::{Cli, Command, OutputFormat};
use docqueue::config::Config;
use docqueue::domain::{OperationId, OperationKind};
use docqueue::engine::{Engine, SimulatedEngine};
use docqueue::manifest::BatchManifest;
use docqueue::scheduler::{QueueStatus, Scheduler, SchedulerStats};

fn setup_logging(verbose: bool) {
    // Logs go to stderr so stdout stays parseable with --format json
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!("Logging initialized (verbose: {})", verbose);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Run {
            manifest,
            max_concurrent,
            retry_attempts,
            format,
        } => {
            if let Some(max) = max_concurrent {
                config.scheduler.max_concurrent = max;
            }
            if let Some(attempts) = retry_attempts {
                config.scheduler.retry_attempts = attempts;
            }
            config.validate()?;
            cmd_run(&config, &manifest, format).await
        }
        Command::Kinds => cmd_kinds(),
    }
}

/// Terminal outcome of one manifest entry, as reported by its hook
#[derive(Debug, Serialize)]
struct OperationReport {
    name: String,
    id: OperationId,
    kind: OperationKind,
    priority: i32,
    succeeded: bool,
    documents: usize,
    bytes: usize,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct RunReport {
    operations: Vec<OperationReport>,
    status: QueueStatus,
    progress: u8,
    stats: SchedulerStats,
}

/// Run a manifest to completion
async fn cmd_run(config: &Config, manifest_path: &Path, format: OutputFormat) -> Result<()> {
    let manifest = BatchManifest::load(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let entries = manifest.build(base_dir)?;
    info!(operations = entries.len(), manifest = %manifest_path.display(), "Loaded manifest");

    let engine: Arc<dyn Engine> = Arc::new(SimulatedEngine::new(config.engine.clone()));
    let scheduler = Scheduler::new(config.scheduler.clone(), engine);

    let (tx, mut rx) = mpsc::unbounded_channel::<OperationReport>();
    let mut order = HashMap::new();

    for (index, (name, op)) in entries.into_iter().enumerate() {
        let complete_tx = tx.clone();
        let complete_name = name.clone();
        let error_tx = tx.clone();
        let error_name = name.clone();

        let op = op
            .on_progress(|percent, op| {
                debug!(id = %op.id(), percent, "progress");
            })
            .on_complete(move |output, op| {
                let _ = complete_tx.send(OperationReport {
                    name: complete_name.clone(),
                    id: op.id(),
                    kind: op.kind(),
                    priority: op.priority(),
                    succeeded: true,
                    documents: output.documents.len(),
                    bytes: output.total_bytes(),
                    error: None,
                });
            })
            .on_error(move |err, op| {
                let _ = error_tx.send(OperationReport {
                    name: error_name.clone(),
                    id: op.id(),
                    kind: op.kind(),
                    priority: op.priority(),
                    succeeded: false,
                    documents: 0,
                    bytes: 0,
                    error: Some(err.to_string()),
                });
            });

        let id = scheduler.submit(op);
        order.insert(id, index);
    }
    drop(tx);

    scheduler.wait_idle().await;

    let mut operations = Vec::new();
    while let Ok(report) = rx.try_recv() {
        operations.push(report);
    }
    operations.sort_by_key(|r| order.get(&r.id).copied().unwrap_or(usize::MAX));

    let report = RunReport {
        operations,
        status: scheduler.status(),
        progress: scheduler.progress(),
        stats: scheduler.stats(),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_text_report(&report),
    }

    if report.status.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn print_text_report(report: &RunReport) {
    for op in &report.operations {
        if op.succeeded {
            println!(
                "{} {} [{}] ({}, priority {}): {} document(s), {} bytes",
                "✓".green(),
                op.name.bold(),
                op.id.short(),
                op.kind,
                op.priority,
                op.documents,
                op.bytes
            );
        } else {
            println!(
                "{} {} [{}] ({}, priority {}): {}",
                "✗".red(),
                op.name.bold(),
                op.id.short(),
                op.kind,
                op.priority,
                op.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let status = &report.status;
    println!();
    println!(
        "Completed {}/{} ({} failed, {} retries) - {}%",
        status.completed, status.total, status.failed, report.stats.total_retries, report.progress
    );
}

/// List operation kinds
fn cmd_kinds() -> Result<()> {
    println!("Available operation kinds:");
    println!();
    for kind in OperationKind::ALL {
        println!("  {} {} input", format!("{:<14}", kind.as_str()).bold(), kind.cardinality());
    }
    Ok(())
}
