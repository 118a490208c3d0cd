//! # Degradation Pipeline Orchestrator
//!
//! Drives the whole run: for each profile, synthesize the two stage
//! kernels and the intermediate resolution once, then stream every source
//! image through two degradation rounds and write the result into the
//! profile's output directory.
//!
//! ## Per-profile flow
//!
//! 1. Kernel synthesis (stage 1, stage 2) — fixed for the whole image set.
//! 2. Intermediate resolution between the run's HR and the profile's LR.
//! 3. Per image: decode, stage 1 (blur, resize to intermediate, noise,
//!    JPEG), stage 2 (blur, resize to LR, noise, JPEG), save.
//!
//! ## Determinism
//!
//! All randomness flows through the single caller-provided generator in a
//! fixed order (kernels first, then per-image draws in stage order), and
//! source files are processed in sorted filename order. Same seed, config,
//! and inputs give byte-identical outputs.
//!
//! ## Failure semantics
//!
//! An undecodable source image is logged and skipped; the batch continues.
//! Configuration and write failures abort the run — the former means the
//! run was never viable, the latter means the destination is broken.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{info, warn};

use degrade_kernels::{intermediate_resolution, synthesize, Kernel, Resolution};

use crate::config::{ProfileConfig, RunConfig, StageConfig};
use crate::error::{DegradeError, Result};
use crate::processing::{compress, convolve, noise, resize, ImageBuf};

/// Run every profile in `config` over the images in `source_dir`, writing
/// one output directory per profile under `dest_dir`.
pub fn run<R: Rng + ?Sized>(
    config: &RunConfig,
    source_dir: &Path,
    dest_dir: &Path,
    rng: &mut R,
) -> Result<()> {
    config.validate()?;
    fs::create_dir_all(dest_dir)?;
    let sources = list_sources(source_dir)?;

    let total_profiles = config.profiles.len();
    for (profile_index, profile) in config.profiles.iter().enumerate() {
        let kernel1 = synthesize(
            &profile.stage1.kernel_params(profile.max_kernel_size),
            profile.max_kernel_size,
            rng,
        )?;
        let kernel2 = synthesize(
            &profile.stage2.kernel_params(profile.max_kernel_size),
            profile.max_kernel_size,
            rng,
        )?;
        let inter = intermediate_resolution(profile.resolution, config.resolution);

        let profile_dir = dest_dir.join(&profile.name);
        fs::create_dir_all(&profile_dir)?;

        let total_images = sources.len();
        for (image_index, (source, file_name)) in sources.iter().enumerate() {
            let img = match ImageBuf::load(source) {
                Ok(img) => img,
                Err(err @ DegradeError::Decode { .. }) => {
                    warn!("skipping unreadable source: {err}");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let img = degrade_stage(img, &kernel1, inter, profile, &profile.stage1, rng)?;
            let img = degrade_stage(img, &kernel2, profile.resolution, profile, &profile.stage2, rng)?;

            img.save(&profile_dir.join(file_name))?;

            info!(
                "{} / {} profile, {} / {} image",
                profile_index + 1,
                total_profiles,
                image_index + 1,
                total_images
            );
        }
    }
    Ok(())
}

/// One degradation round: blur with the profile kernel, resize to
/// `target`, inject noise, and simulate compression, all with this stage's
/// parameters. Stage 1 and stage 2 are the same function with different
/// arguments.
fn degrade_stage<R: Rng + ?Sized>(
    img: ImageBuf,
    kernel: &Kernel,
    target: Resolution,
    profile: &ProfileConfig,
    stage: &StageConfig,
    rng: &mut R,
) -> Result<ImageBuf> {
    let blurred = convolve::convolve(&img, kernel);
    let mut resized = resize::resize(&blurred, target, &profile.resize_list, rng)?;
    noise::add_noise(&mut resized, stage, rng);
    compress::simulate_compression(&resized, stage.jpeg_quality)
}

/// List the regular files in `dir`, sorted by filename so the processing
/// order (and with it the RNG draw order) is platform-independent.
fn list_sources(dir: &Path) -> Result<Vec<(PathBuf, OsString)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            files.push((path, entry.file_name()));
        }
    }
    files.sort();
    Ok(files)
}
