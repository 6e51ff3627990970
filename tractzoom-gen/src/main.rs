//! tractzoom-gen - High and low zoom tile layer generator
//!
//! Reads the tile score CSV and the census tract GeoJSON, buckets tracts by
//! score, and writes the high and low zoom GeoJSON layers consumed by the
//! tiling step.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tractzoom_common::config::TomlConfig;
use tractzoom_gen::ZoomLayerEtl;

/// Command-line overrides; everything else comes from the TOML config
#[derive(Debug, Parser)]
#[command(name = "tractzoom-gen", version, about = "Generate high and low zoom score layers")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Score table CSV (overrides `score_csv`)
    #[arg(long, env = "TRACTZOOM_SCORE_CSV")]
    score_csv: Option<PathBuf>,

    /// Census tract GeoJSON (overrides `census_geojson`)
    #[arg(long, env = "TRACTZOOM_CENSUS_GEOJSON")]
    census_geojson: Option<PathBuf>,

    /// Output directory (overrides `output_dir`)
    #[arg(short, long, env = "TRACTZOOM_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, config_source) =
        TomlConfig::resolve(args.config.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting tractzoom-gen v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_source {
        Some(path) => info!("Config: {}", path.display()),
        None => info!("No config file found, using compiled defaults"),
    }

    if let Some(path) = args.score_csv {
        config.score_csv = path;
    }
    if let Some(path) = args.census_geojson {
        config.census_geojson = path;
    }
    if let Some(path) = args.output_dir {
        config.output_dir = path;
    }

    info!("High zoom layer: {}", config.high_zoom_path().display());
    info!("Low zoom layer: {}", config.low_zoom_path().display());

    let etl = ZoomLayerEtl::new(config);
    match etl.run().await {
        Ok(summary) => {
            info!(
                "✓ Wrote {} high zoom and {} low zoom features",
                summary.tracts, summary.low_zoom_features
            );
            Ok(())
        }
        Err(e) => {
            error!("Layer generation failed: {}", e);
            Err(e.into())
        }
    }
}
