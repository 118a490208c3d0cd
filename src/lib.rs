//! # Second-Order Image Degradation Pipeline
//!
//! Manufactures paired (low-resolution, high-resolution) training data for
//! image super-resolution models. Given a directory of high-resolution
//! images and a declarative YAML configuration, each named degradation
//! profile produces a parallel directory of degraded copies: blur with a
//! stochastically synthesized kernel, resample, inject sensor noise,
//! simulate JPEG compression — applied twice per the classical
//! second-order degradation recipe.
//!
//! ## Modules
//!
//! - `config`: run/profile/stage configuration structures and validation
//! - `pipeline`: the orchestrator driving profiles and images
//! - `processing`: per-image stages (convolve, resize, noise, compression)
//! - `error`: the pipeline's error taxonomy
//!
//! Kernel synthesis and resolution planning live in the `degrade-kernels`
//! sub-crate, which carries no image I/O at all.
//!
//! ## Determinism
//!
//! One seeded generator drives every stochastic draw in a fixed order, so
//! a given (seed, config, input set) always produces byte-identical
//! outputs. See [`run`].

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

pub mod config;
pub mod error;
pub mod pipeline;
pub mod processing;

pub use config::{ProfileConfig, ResizeMethod, RunConfig, StageConfig};
pub use error::{DegradeError, Result};

/// Run the full degradation pipeline: every profile in `config` over every
/// image in `source_dir`, writing per-profile directories under
/// `dest_dir`. All randomness derives from `seed`.
pub fn run(config: &RunConfig, source_dir: &Path, dest_dir: &Path, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    pipeline::run(config, source_dir, dest_dir, &mut rng)
}
