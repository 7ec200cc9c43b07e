//! Pipeline configuration

use std::path::Path;

use serde::Deserialize;
use sleek_media::TranscodeOptions;
use sleek_net::CacheConfig;
use sleek_sched::SchedulerOptions;

use crate::Error;

/// Pipeline configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Raster and vector transcoding tunables
    pub transcode: TranscodeOptions,

    /// Visibility scheduling and lazy reveal
    pub scheduler: SchedulerOptions,

    /// API response cache
    pub cache: CacheConfig,
}

impl Config {
    /// Parse a JSON document; missing sections keep their defaults
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn with_transcode(mut self, transcode: TranscodeOptions) -> Self {
        self.transcode = transcode;
        self
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerOptions) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}
