//! Grid builder service.
//!
//! Generates the rHEALPix cells covering each zone of a GeoJSON file and
//! writes them as a grid table.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use grid_builder::{build, BuilderConfig};

#[derive(Parser, Debug)]
#[command(name = "grid-builder")]
#[command(about = "Generate rHEALPix grid cells over zone polygons")]
struct Args {
    /// Zones GeoJSON file
    #[arg(short, long)]
    zones: PathBuf,

    /// Output grid GeoJSON file
    #[arg(short, long)]
    output: PathBuf,

    /// Configuration file path (YAML)
    #[arg(short, long, env = "GRID_BUILDER_CONFIG")]
    config: Option<PathBuf>,

    /// Property holding the zone label
    #[arg(long)]
    zone_property: Option<String>,

    /// Subdivision level
    #[arg(short, long)]
    level: Option<i32>,

    /// Boundary samples per cell edge
    #[arg(long)]
    edge_samples: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args.log_level, args.json_logs)?;

    let mut config = BuilderConfig::load(args.config.as_deref())?;
    if let Some(property) = args.zone_property {
        config.zone_property = property;
    }
    if let Some(level) = args.level {
        config.grid.level = level;
    }
    if let Some(samples) = args.edge_samples {
        config.grid.edge_samples = samples;
    }
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    info!(
        zones = %args.zones.display(),
        level = config.grid.level,
        edge_samples = config.grid.edge_samples,
        "Starting grid builder"
    );

    build::run(&args.zones, &args.output, &config)?;
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
