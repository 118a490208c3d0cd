//! Error types for the degradation pipeline.
//!
//! Three failure classes with different blast radii:
//!
//! - `Config`: bad or inconsistent configuration. Fatal; detected before
//!   any image is written wherever possible.
//! - `Decode`: one unreadable source image. Recoverable; the orchestrator
//!   logs it and moves on to the next file.
//! - `Write`/`Io`: the destination is unwritable or listing the source
//!   directory failed. Fatal, since that is an environment problem rather
//!   than a per-image anomaly.

use std::path::PathBuf;

use degrade_kernels::KernelError;

pub type Result<T> = std::result::Result<T, DegradeError>;

#[derive(Debug)]
pub enum DegradeError {
    /// Missing/invalid configuration key, inconsistent probability vector,
    /// or an otherwise unusable run configuration.
    Config(String),
    /// A source image could not be decoded. Skippable.
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    /// A degraded image could not be encoded or written.
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
    /// Filesystem error outside of image codecs (directory listing,
    /// directory creation, config reading).
    Io(std::io::Error),
    /// Resampler failure.
    Resize(fast_image_resize::ResizeError),
    /// Resampler view construction over a raster buffer failed.
    ImageView(fast_image_resize::ImageBufferError),
}

impl From<std::io::Error> for DegradeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<fast_image_resize::ResizeError> for DegradeError {
    fn from(e: fast_image_resize::ResizeError) -> Self {
        Self::Resize(e)
    }
}

impl From<fast_image_resize::ImageBufferError> for DegradeError {
    fn from(e: fast_image_resize::ImageBufferError) -> Self {
        Self::ImageView(e)
    }
}

impl From<KernelError> for DegradeError {
    fn from(e: KernelError) -> Self {
        // Every kernel-synthesis failure is a configuration problem: the
        // weights and sizes all come straight from the profile document.
        Self::Config(e.to_string())
    }
}

impl std::fmt::Display for DegradeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradeError::Config(msg) => write!(f, "configuration error: {msg}"),
            DegradeError::Decode { path, source } => {
                write!(f, "failed to decode {}: {source}", path.display())
            }
            DegradeError::Write { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
            DegradeError::Io(e) => write!(f, "I/O error: {e}"),
            DegradeError::Resize(e) => write!(f, "resize error: {e}"),
            DegradeError::ImageView(e) => write!(f, "image buffer error: {e}"),
        }
    }
}

impl std::error::Error for DegradeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DegradeError::Decode { source, .. } | DegradeError::Write { source, .. } => {
                Some(source)
            }
            DegradeError::Io(e) => Some(e),
            DegradeError::Resize(e) => Some(e),
            DegradeError::ImageView(e) => Some(e),
            DegradeError::Config(_) => None,
        }
    }
}
