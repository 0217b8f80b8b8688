//! Command-line driver for tract aggregation.
//!
//! Reads tract and boundary GeoJSON files, aggregates tract statistics into
//! the boundaries and writes the result as a GeoJSON FeatureCollection.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tractagg::geojson::{
    feature_collection, tracts_from_feature_collection, units_from_feature_collection,
};
use tractagg::{AggregationConfig, AggregationPipeline};

#[derive(Parser, Debug)]
#[command(name = "aggregate")]
#[command(about = "Aggregate census tract statistics into coarser boundaries")]
struct Args {
    /// GeoJSON FeatureCollection of tracts with statistics
    #[arg(short, long)]
    tracts: PathBuf,

    /// GeoJSON FeatureCollection of target boundaries
    #[arg(short, long)]
    units: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Property holding the target unit id
    #[arg(long, default_value = "id")]
    unit_id_property: String,

    /// Property holding the target unit name
    #[arg(long, default_value = "name")]
    unit_name_property: String,

    /// Grid cells per axis for overlap estimation
    #[arg(long)]
    grid_resolution: Option<usize>,

    /// Drop estimated overlaps at or below this ratio
    #[arg(long)]
    threshold: Option<f64>,

    /// Process units on the current thread only
    #[arg(long)]
    sequential: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn read_json(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => AggregationConfig::load_from_file(path)?,
        None => AggregationConfig::default(),
    };
    if let Some(resolution) = args.grid_resolution {
        config.grid_resolution = resolution;
    }
    if let Some(threshold) = args.threshold {
        config.significance_threshold = threshold;
    }
    if args.sequential {
        config.parallel = false;
    }

    info!("Tracts: {}", args.tracts.display());
    info!("Units: {}", args.units.display());

    let tracts = tracts_from_feature_collection(&read_json(&args.tracts)?)
        .context("Failed to load tracts")?;
    let units = units_from_feature_collection(
        &read_json(&args.units)?,
        &args.unit_id_property,
        &args.unit_name_property,
    )
    .context("Failed to load target units")?;

    let pipeline = AggregationPipeline::new(config).context("Invalid configuration")?;
    let aggregated = pipeline
        .run(&tracts, &units)
        .context("Aggregation aborted")?;

    let output = serde_json::to_string_pretty(&feature_collection(&aggregated, &units))?;
    match &args.output {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} units to {}", aggregated.len(), path.display());
        }
        None => println!("{output}"),
    }

    Ok(())
}
