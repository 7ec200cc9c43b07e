//! sleek Scheduler
//!
//! Defers off-screen work until an element approaches the viewport. One
//! shared [`IntersectionWatcher`] feeds one-shot triggers to the pipeline,
//! and [`lazy`] swaps true sources for placeholders until then.

pub mod lazy;
mod scheduler;
mod watcher;

pub use scheduler::VisibilityScheduler;
pub use watcher::{IntersectionEntry, IntersectionWatcher};

use serde::Deserialize;
use sleek_dom::NodeId;

/// What happens when an observed element becomes visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Restore the true source, then transcode
    Reveal,
    /// Warm the cache with a GET of the source
    Prefetch,
    /// Transcode in place
    Transcode,
}

/// Result of registering an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Already inside the eager zone; act now
    Immediate,
    /// Waiting for the watcher
    Deferred,
}

/// One-shot visibility event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub id: NodeId,
    pub strategy: Strategy,
}

/// Scheduler configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerOptions {
    /// Margin added around the viewport on every side, in px
    pub root_margin: f64,
    /// Eager zone height as a multiple of the viewport height
    pub eager_margin_factor: f64,
    /// Wait for the true source to load and decode before marking it ready
    pub decode_before_reveal: bool,
    /// Frame hosts whose embeds are deferred
    pub deferred_frame_hosts: Vec<String>,
}

impl SchedulerOptions {
    pub fn with_root_margin(mut self, margin: f64) -> Self {
        self.root_margin = margin;
        self
    }

    pub fn with_decode_before_reveal(mut self, enabled: bool) -> Self {
        self.decode_before_reveal = enabled;
        self
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            root_margin: 200.0,
            eager_margin_factor: 1.5,
            decode_before_reveal: false,
            deferred_frame_hosts: vec!["youtube.com".into(), "vimeo.com".into()],
        }
    }
}
