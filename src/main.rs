//! `license-warden` — detect dependency licenses and evaluate them against policy.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and install tracing ([`logging`]).
//! 2. Load the policy table and license catalog ([`config`]).
//! 3. Discover packages from manifests ([`manifest`]) or a `--packages` list.
//! 4. Build the license detector chain ([`detector`]); `--online` adds registry lookups.
//! 5. Run every package through Analysis → Licensing → Evaluation ([`pipeline`]).
//! 6. Render the requested report ([`report`]).
//! 7. Exit `1` if any package is a violation (with `--fail-on-error`, also if any
//!    analysis failed), `130` if cancelled, `0` otherwise.

mod cli;
mod config;
mod detector;
mod error;
mod license;
mod logging;
mod manifest;
mod models;
mod pipeline;
mod policy;
mod registry;
mod report;
mod version;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tracing::{info, warn};

use cli::{Cli, LogFormat, ReportFormat};
use detector::declared::DeclaredDetector;
use detector::registry::RegistryDetector;
use detector::{ChainDetector, LicenseDetector};
use manifest::{detect_ecosystems, Ecosystem, ManifestEntry};
use pipeline::{RunContext, RunOptions};

/// Timeout for a single registry HTTP request.
const REGISTRY_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(
        cli.log_format == LogFormat::Json,
        logging::level_for(cli.verbose, cli.quiet),
    );

    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    // Configuration errors are fatal before any package is processed
    let policies = config::load_policy(&path, cli.policy.as_deref())?;
    let catalog = config::load_catalog(&path, cli.catalog.as_deref())?;

    let entries = collect_entries(&cli, &path)?;
    if entries.is_empty() {
        eprintln!("No packages found in {}", path.display());
        std::process::exit(1);
    }

    let detector = build_detector(&entries, cli.online)?;
    let packages: Vec<_> = entries.into_iter().map(|e| e.package).collect();
    info!(packages = packages.len(), online = cli.online, "starting analysis");

    // Ctrl-C stops dispatching new packages; finished ones are still reported
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; finishing in-flight packages");
            cancel_tx.send(true).ok();
        }
    });

    let json_to_stdout = cli.report == ReportFormat::Json && cli.output.is_none();
    let progress = if cli.quiet || json_to_stdout {
        None
    } else {
        let pb = ProgressBar::new(packages.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let ctx = RunContext {
        detector,
        catalog: Arc::new(catalog),
        policies: Arc::new(policies),
    };
    let options = RunOptions {
        concurrency: cli.concurrency,
        timeout: Duration::from_secs(cli.timeout_secs),
    };
    let outcome = pipeline::run(packages, ctx, options, cancel_rx, progress).await;

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&outcome, &path, cli.verbose, cli.quiet)?;
            if let Some(output) = &cli.output {
                report::json::render(&outcome.packages, Some(output.as_path()))?;
            }
        }
        ReportFormat::Json => {
            report::json::render(&outcome.packages, cli.output.as_deref())?;
        }
    }

    let code = outcome.exit_code(cli.fail_on_error);
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}

/// Packages from `--packages`, or from every detected ecosystem not excluded.
fn collect_entries(cli: &Cli, path: &std::path::Path) -> Result<Vec<ManifestEntry>> {
    if let Some(list) = &cli.packages {
        return Ok(manifest::dedup(manifest::package_list::read(list)?));
    }

    let excluded: Vec<Ecosystem> = cli.exclude_lang.iter().map(Into::into).collect();
    let ecosystems: Vec<Ecosystem> = detect_ecosystems(path)
        .into_iter()
        .filter(|e| !excluded.contains(e))
        .collect();

    if ecosystems.is_empty() {
        eprintln!(
            "No supported project manifests found in {}",
            path.display()
        );
        std::process::exit(1);
    }

    let entries = manifest::discover(path, &ecosystems)?;
    if !cli.quiet {
        for ecosystem in &ecosystems {
            let count = entries
                .iter()
                .filter(|e| e.ecosystem == Some(*ecosystem))
                .count();
            eprintln!("  {} {} {} packages", "→".cyan(), ecosystem, count);
        }
    }
    Ok(entries)
}

/// Declared licenses first; registries only with `--online`.
fn build_detector(entries: &[ManifestEntry], online: bool) -> Result<Arc<dyn LicenseDetector>> {
    let declared = DeclaredDetector::from_entries(entries);
    if declared.is_empty() && !online {
        warn!("no manifest declares a license; pass --online to query package registries");
    }
    info!(declared = declared.len(), "declared licenses collected");

    let mut chain: Vec<Box<dyn LicenseDetector>> = vec![Box::new(declared)];
    if online {
        chain.push(Box::new(RegistryDetector::new(
            entries,
            REGISTRY_REQUEST_TIMEOUT,
        )?));
    }
    Ok(Arc::new(ChainDetector::new(chain)))
}
