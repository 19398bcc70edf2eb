//! ERA5 weighting service.
//!
//! Aggregates timestamped reanalysis source polygons onto a DGGS grid with
//! area weights, or writes the square tiles such sources are sampled on.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use grid_common::Crs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use era5_weighting::config::split_list;
use era5_weighting::{discover, load_batches, read_grid, tiles, weigh, write_outputs, WeightingConfig};

#[derive(Parser, Debug)]
#[command(name = "era5-weighting")]
#[command(about = "Area-weighted reanalysis values on DGGS grid cells")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file path (YAML)
    #[arg(short, long, global = true, env = "ERA5_WEIGHTING_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate source batches onto a grid
    Weigh {
        /// Grid GeoJSON file
        #[arg(short, long)]
        grid: PathBuf,

        /// Source GeoJSON file or directory
        #[arg(short, long)]
        sources: PathBuf,

        /// Directory for the per-timestamp outputs
        #[arg(short, long)]
        output_dir: PathBuf,

        /// CRS of the sources, overriding what the files declare
        #[arg(long)]
        source_crs: Option<String>,

        /// Comma separated attributes to aggregate
        #[arg(long)]
        attributes: Option<String>,

        /// Only weigh cells of this zone
        #[arg(long)]
        zone: Option<String>,

        /// Skip the derived wind, humidity and VPD fields
        #[arg(long)]
        no_derived: bool,
    },

    /// Write square source tiles covering each zone of a grid
    Tiles {
        /// Grid GeoJSON file
        #[arg(short, long)]
        grid: PathBuf,

        /// Directory for the per-zone tiles files
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Tile side in working CRS meters
        #[arg(long)]
        size: Option<f64>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs)?;

    let mut config = WeightingConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Weigh {
            grid,
            sources,
            output_dir,
            source_crs,
            attributes,
            zone,
            no_derived,
        } => {
            if let Some(crs) = source_crs {
                config.source_crs = Some(Crs::parse(&crs));
            }
            if let Some(list) = attributes {
                config.attributes = split_list(&list);
            }
            if no_derived {
                config.derived = false;
            }
            validate(&config)?;

            info!(
                grid = %grid.display(),
                sources = %sources.display(),
                attributes = ?config.attribute_names(),
                "Starting weighting"
            );

            let grid = read_grid(&grid)?;
            let files = discover(&sources)?;
            let batches = load_batches(&files, &config)?;
            info!(files = files.len(), batches = batches.len(), "Loaded sources");

            let outputs = weigh(&grid, batches, &config, zone.as_deref())?;
            write_outputs(&output_dir, &outputs)?;
        }
        Command::Tiles {
            grid,
            output_dir,
            size,
        } => {
            if let Some(size) = size {
                config.tile_size = size;
            }
            validate(&config)?;

            let grid = read_grid(&grid)?;
            let written = tiles::write_tiles(&output_dir, &grid, &config)?;
            info!(dir = %output_dir.display(), files = written.len(), "Wrote tiles");
        }
    }

    Ok(())
}

fn validate(config: &WeightingConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
