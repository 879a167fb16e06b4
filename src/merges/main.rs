//! Per-date merge check.
//!
//! Unions every region valid on a date and checks that the result is a
//! valid geometry. Writes the merged regions as a GeoJSON feature
//! collection on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use seamcheck::boundary::MergeOutcome;
use seamcheck::loader::{load_features, multipolygon_to_geojson};
use seamcheck::MergeChecker;

#[derive(Parser, Debug)]
#[command(name = "check-merges")]
#[command(about = "Merge all regions valid on a date and check the result")]
struct Args {
    /// Boundary document (GeoJSON, optionally wrapped as `name = {...};`)
    file: PathBuf,

    /// Only merge this date (yyyy, yyyy:mm or yyyy:mm:dd); default is every start date
    date: Option<String>,
}

fn merged_feature(outcome: &MergeOutcome) -> Value {
    json!({
        "type": "Feature",
        "id": format!("merged{}", outcome.date),
        "geometry": multipolygon_to_geojson(&outcome.merged),
        "properties": {
            "entity1type": "nation",
            "entity1name": "summalia",
            "entity2type": "merger",
            "entity2name": format!("for {}", outcome.date),
            "startdatestr": outcome.date,
            "enddatestr": outcome.date,
            "fidelity": 3,
        },
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let features = load_features(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let checker = MergeChecker::new(&features).context("Failed to resolve geometries")?;

    let outcomes = match &args.date {
        Some(date) => vec![checker.check_date(date)?],
        None => checker.check_all()?,
    };

    let invalid = outcomes.iter().filter(|o| !o.valid).count();
    info!("merged {} dates, {} invalid", outcomes.len(), invalid);

    let collection = json!({
        "type": "FeatureCollection",
        "features": outcomes.iter().map(merged_feature).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&collection)?);
    Ok(())
}
