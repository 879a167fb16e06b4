//! Pairwise boundary conflict check.
//!
//! Compares every two regions that exist at the same time and reports
//! overlaps, multi-piece seams and point contacts. Findings go to stderr;
//! the summary line goes to stdout. Findings never change the exit status.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use seamcheck::loader::load_features;
use seamcheck::{BoundaryChecker, CheckConfig};

#[derive(Parser, Debug)]
#[command(name = "check-boundaries")]
#[command(about = "Check historical boundaries for overlaps, seams and point contacts")]
struct Args {
    /// Boundary document (GeoJSON, optionally wrapped as `name = {...};`)
    file: PathBuf,

    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log every pair decision
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => CheckConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CheckConfig::default(),
    };

    let features = load_features(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let report = BoundaryChecker::new(&features, &config)
        .run()
        .context("Boundary check aborted")?;

    if !report.invalid_geometries.is_empty() {
        warn!(
            "{} invalid geometries: {}",
            report.invalid_geometries.len(),
            report.invalid_geometries.join(", ")
        );
    }
    info!("{} conflicts reported", report.findings.len());

    println!("{}", report);
    Ok(())
}
