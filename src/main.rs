use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use image_degrade::RunConfig;

/// Synthetic degradation pipeline for super-resolution training data:
/// reads high-resolution images, applies two rounds of blur / resize /
/// noise / JPEG per configured profile, and writes the degraded copies.
#[derive(Parser, Debug)]
#[command(name = "degrade")]
#[command(about = "Produce degraded LR counterparts of HR images for SR training")]
#[command(
    long_about = "Produce degraded low-resolution counterparts of high-resolution images.
Each profile in the configuration yields one output directory; runs are
reproducible for a fixed seed, configuration, and input set."
)]
struct Args {
    /// Directory with source images
    #[arg(short, long, help = "Folder with high-resolution images to degrade")]
    src: PathBuf,

    /// Destination root for degraded images
    #[arg(short, long, help = "Folder to write per-profile output directories into")]
    dst: PathBuf,

    /// Configuration document
    #[arg(
        short,
        long,
        default_value = "configs/degrade.yaml",
        help = "Path to the YAML run configuration"
    )]
    cfg: PathBuf,

    /// Random seed
    #[arg(
        short = 'r',
        long,
        default_value_t = 42,
        help = "Seed for the run's random generator (fixed seed = reproducible outputs)"
    )]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = RunConfig::load(&args.cfg)
        .with_context(|| format!("loading configuration from {}", args.cfg.display()))?;

    image_degrade::run(&config, &args.src, &args.dst, args.seed)
        .context("degradation run failed")?;

    Ok(())
}
