//! # Run Configuration
//!
//! Declarative description of a degradation run: one shared high-resolution
//! target plus an ordered list of named profiles, each carrying a
//! low-resolution target, kernel bounds, resize candidates, and two stage
//! configurations. Parsed from a YAML document.
//!
//! Parsing is strict: resize methods and kernel family tags are closed
//! serde enums, so a typo in the document fails at load time — before any
//! kernel is synthesized or any file is touched — rather than mid-batch.
//! `validate()` then checks the numeric constraints the type system cannot
//! express (odd kernel sizes, proper ranges, usable probability vectors).

use std::fs;
use std::path::Path;

use degrade_kernels::{KernelFamily, KernelParams, Resolution};
use serde::Deserialize;

use crate::error::{DegradeError, Result};

/// Top-level run configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct RunConfig {
    /// High-resolution size shared by every profile, `[h, w]`.
    pub resolution: Resolution,
    /// Profiles in declaration order; each produces one output directory.
    pub profiles: Vec<ProfileConfig>,
}

/// One named degradation profile.
#[derive(Clone, Debug, Deserialize)]
pub struct ProfileConfig {
    /// Display name; also the output subdirectory name.
    pub name: String,
    /// Low-resolution target, `[h, w]`.
    pub resolution: Resolution,
    /// Side length kernels are padded to (odd).
    pub max_kernel_size: usize,
    /// Resize method candidates, shared by both stages.
    pub resize_list: Vec<ResizeMethod>,
    pub stage1: StageConfig,
    pub stage2: StageConfig,
}

/// Parameters governing one degradation round.
#[derive(Clone, Debug, Deserialize)]
pub struct StageConfig {
    pub kernel_list: Vec<KernelFamily>,
    pub kernel_prob: Vec<f64>,
    pub blur_sigma: (f64, f64),
    pub betag_range: (f64, f64),
    pub betap_range: (f64, f64),
    pub sinc_prob: f64,
    pub gaussian_noise_prob: f64,
    pub gray_noise_prob: f64,
    pub gaussian_sigma_range: (f64, f64),
    pub poisson_scale_range: (f64, f64),
    pub jpeg_quality: u8,
}

/// The closed set of supported resize methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMethod {
    Bilinear,
    Area,
}

impl RunConfig {
    /// Load and validate a run configuration from a YAML file.
    pub fn load(path: &Path) -> Result<RunConfig> {
        let text = fs::read_to_string(path)?;
        let config: RunConfig =
            serde_yml::from_str(&text).map_err(|e| DegradeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate numeric constraints across the whole document.
    pub fn validate(&self) -> Result<()> {
        if self.resolution.h == 0 || self.resolution.w == 0 {
            return Err(config_err("HR resolution components must be > 0"));
        }
        if self.profiles.is_empty() {
            return Err(config_err("at least one profile is required"));
        }
        for profile in &self.profiles {
            profile.validate()?;
        }
        Ok(())
    }
}

impl ProfileConfig {
    fn validate(&self) -> Result<()> {
        let name = &self.name;
        if name.is_empty() {
            return Err(config_err("profile name must not be empty"));
        }
        if self.resolution.h == 0 || self.resolution.w == 0 {
            return Err(config_err(format!(
                "profile '{name}': LR resolution components must be > 0"
            )));
        }
        if self.max_kernel_size == 0 || self.max_kernel_size % 2 == 0 {
            return Err(config_err(format!(
                "profile '{name}': max_kernel_size must be odd, got {}",
                self.max_kernel_size
            )));
        }
        if self.resize_list.is_empty() {
            return Err(config_err(format!(
                "profile '{name}': resize_list must not be empty"
            )));
        }
        self.stage1.validate(name, "stage1")?;
        self.stage2.validate(name, "stage2")?;
        Ok(())
    }
}

impl StageConfig {
    /// Kernel synthesis parameters for this stage. `kernel_size` equals the
    /// profile's `max_kernel_size` in current configs, making the padding
    /// step a no-op; the seam is kept so a future config can vary it.
    pub fn kernel_params(&self, kernel_size: usize) -> KernelParams {
        KernelParams {
            kernel_list: self.kernel_list.clone(),
            kernel_prob: self.kernel_prob.clone(),
            kernel_size,
            blur_sigma: self.blur_sigma,
            betag_range: self.betag_range,
            betap_range: self.betap_range,
            sinc_prob: self.sinc_prob,
        }
    }

    fn validate(&self, profile: &str, stage: &str) -> Result<()> {
        let fail = |msg: String| Err(config_err(format!("profile '{profile}' {stage}: {msg}")));

        if self.kernel_list.is_empty() {
            return fail("kernel_list must not be empty".into());
        }
        if self.kernel_list.len() != self.kernel_prob.len() {
            return fail(format!(
                "kernel_prob has {} entries for {} kernel families",
                self.kernel_prob.len(),
                self.kernel_list.len()
            ));
        }
        if self.kernel_prob.iter().any(|&p| p < 0.0 || !p.is_finite()) {
            return fail(format!("kernel_prob entries must be >= 0: {:?}", self.kernel_prob));
        }
        if self.kernel_prob.iter().sum::<f64>() <= 0.0 {
            return fail("kernel_prob must have positive total weight".into());
        }
        for (key, prob) in [
            ("sinc_prob", self.sinc_prob),
            ("gaussian_noise_prob", self.gaussian_noise_prob),
            ("gray_noise_prob", self.gray_noise_prob),
        ] {
            if !(0.0..=1.0).contains(&prob) {
                return fail(format!("{key} must be in [0, 1], got {prob}"));
            }
        }
        for (key, (lo, hi)) in [
            ("blur_sigma", self.blur_sigma),
            ("gaussian_sigma_range", self.gaussian_sigma_range),
            ("poisson_scale_range", self.poisson_scale_range),
        ] {
            if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo < hi) {
                return fail(format!("{key} must satisfy 0 < low < high, got [{lo}, {hi}]"));
            }
        }
        // The shape draw splits at 1, so both ranges must straddle it.
        for (key, (lo, hi)) in [("betag_range", self.betag_range), ("betap_range", self.betap_range)] {
            if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo < 1.0 && hi > 1.0) {
                return fail(format!("{key} must straddle 1 (low < 1 < high), got [{lo}, {hi}]"));
            }
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return fail(format!("jpeg_quality must be in 1..=100, got {}", self.jpeg_quality));
        }
        Ok(())
    }
}

fn config_err(msg: impl Into<String>) -> DegradeError {
    DegradeError::Config(msg.into())
}
