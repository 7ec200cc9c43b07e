//! sleek Media
//!
//! Adaptive transcoding of loaded media elements: raster images are
//! re-encoded at a device-appropriate size and quality, vector images are
//! rasterized into a box that keeps their aspect ratio.

pub mod data_url;
pub mod decoder;
pub mod encoder;
pub mod origin;
pub mod sizing;
pub mod surface;
pub mod svg;
pub mod transcoder;

pub use data_url::DataUrl;
pub use decoder::ImageFormat;
pub use surface::Surface;
pub use transcoder::{Transcoder, VectorRaster, VectorSource};

use serde::Deserialize;
use sleek_dom::ObjectFit;

/// Media pipeline errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MediaError {
    #[error("Decode failed: {0}")]
    DecodeFailure(String),

    #[error("Drawing surface unavailable ({width}x{height})")]
    ContextUnavailable { width: u32, height: u32 },

    #[error("Cross-origin resource blocked: {0}")]
    CrossOriginBlocked(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Parse failure: {0}")]
    ParseFailure(String),
}

impl From<sleek_net::NetError> for MediaError {
    fn from(err: sleek_net::NetError) -> Self {
        MediaError::NetworkFailure(err.to_string())
    }
}

/// Result of a transcoding attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// New encoding written to the element
    Committed,
    /// Preconditions not met; nothing to do
    Skipped,
    /// Encoded output was larger than the guard allows
    Discarded,
    /// Resource not loaded yet; try again on load
    Deferred,
}

/// How vector content is fitted into its display box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    #[default]
    Contain,
    Cover,
}

impl FitMode {
    pub fn object_fit(&self) -> ObjectFit {
        match self {
            FitMode::Contain => ObjectFit::Contain,
            FitMode::Cover => ObjectFit::Cover,
        }
    }
}

/// Transcoder tunables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscodeOptions {
    /// Commit only if `encoded <= ratio * original`
    pub size_guard_ratio: f64,
    /// Raster images need both sides above this
    pub min_raster_side: u32,
    /// Vector display boxes at or below this on either side are skipped
    pub min_vector_display: f64,
    /// Display box used when the element has no layout size
    pub vector_fallback_box: f64,
    pub fit: FitMode,
}

impl TranscodeOptions {
    pub fn with_size_guard_ratio(mut self, ratio: f64) -> Self {
        self.size_guard_ratio = ratio;
        self
    }

    pub fn with_fit(mut self, fit: FitMode) -> Self {
        self.fit = fit;
        self
    }
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            size_guard_ratio: 1.5,
            min_raster_side: 64,
            min_vector_display: 32.0,
            vector_fallback_box: 512.0,
            fit: FitMode::Contain,
        }
    }
}
