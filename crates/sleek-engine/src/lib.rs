//! sleek Engine
//!
//! Resource optimization pipeline for a single page.
//!
//! # Overview
//! - Raster images are re-encoded at the device's size and quality
//! - Vector images are rasterized to their display box
//! - Off-screen sources are held back until they near the viewport
//! - API reads are answered from a TTL/quota-bounded cache
//!
//! # Example
//! ```rust,ignore
//! use sleek_engine::{Config, Pipeline};
//!
//! let pipeline = Pipeline::for_location("https://shop.test/", &env, network, Config::default())?;
//! let id = pipeline.insert(MediaElement::image("/hero.png"));
//! pipeline.on_resource_loaded(id, bytes, Size::new(2000.0, 1000.0));
//! pipeline.run_until_stalled();
//! ```

mod config;
mod error;
pub mod logging;
mod pipeline;

pub use config::Config;
pub use error::Error;
pub use pipeline::{Listener, Pipeline};

pub use sleek_device::{
    CompressionProfile, DeviceProfile, DeviceTier, Environment, classify, compression_profile,
};
pub use sleek_dom::{Document, Encoding, MediaElement, NodeId, ProcessingState, Rect, Size, Stage};
pub use sleek_media::{FitMode, MediaError, Outcome, TranscodeOptions, Transcoder};
pub use sleek_net::{
    CacheConfig, CachePolicy, CacheStore, Fetcher, KeyValueStore, MemoryStorage, NetError, Request,
    Response,
};
pub use sleek_sched::{Registration, SchedulerOptions, Strategy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
