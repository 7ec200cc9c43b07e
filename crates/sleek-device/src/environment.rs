//! Environment Signals
//!
//! Raw host signals the classifier reads.

use serde::Deserialize;

/// Host environment snapshot
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// `window.innerWidth` in CSS pixels
    pub viewport_width: u32,
    /// `navigator.userAgent`
    pub user_agent: String,
    /// `navigator.hardwareConcurrency`
    pub hardware_concurrency: Option<u32>,
    /// `navigator.deviceMemory` in GiB
    pub device_memory_gb: Option<f32>,
    /// Host can encode WebP
    pub supports_webp: bool,
}

impl Environment {
    /// A typical desktop browser
    pub fn desktop() -> Self {
        Self {
            viewport_width: 1920,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) sleek/0.1".into(),
            hardware_concurrency: Some(8),
            device_memory_gb: Some(8.0),
            supports_webp: true,
        }
    }

    /// A typical phone browser
    pub fn mobile() -> Self {
        Self {
            viewport_width: 390,
            user_agent: "Mozilla/5.0 (Linux; Android 14) Mobile sleek/0.1".into(),
            hardware_concurrency: Some(8),
            device_memory_gb: Some(4.0),
            supports_webp: true,
        }
    }

    pub fn with_viewport_width(mut self, width: u32) -> Self {
        self.viewport_width = width;
        self
    }

    pub fn with_user_agent(mut self, ua: &str) -> Self {
        self.user_agent = ua.to_string();
        self
    }

    pub fn with_hardware_concurrency(mut self, cores: u32) -> Self {
        self.hardware_concurrency = Some(cores);
        self
    }

    pub fn with_device_memory(mut self, gb: f32) -> Self {
        self.device_memory_gb = Some(gb);
        self
    }

    pub fn with_webp(mut self, supported: bool) -> Self {
        self.supports_webp = supported;
        self
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::desktop()
    }
}
