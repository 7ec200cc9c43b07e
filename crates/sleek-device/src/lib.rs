//! sleek Device Classifier
//!
//! Derives a capability tier from environment signals once at startup and
//! maps it to compression profiles.
//!
//! # Example
//! ```rust
//! use sleek_device::{DeviceProfile, DeviceTier, Environment, compression_profile};
//!
//! let device = DeviceProfile::detect(&Environment::desktop());
//! assert_eq!(device.tier, DeviceTier::Standard);
//!
//! let profile = compression_profile(device.tier, 2000);
//! assert_eq!(profile.max_dimension, 1024);
//! ```

mod environment;
mod profile;
mod tier;

pub use environment::Environment;
pub use profile::{CompressionProfile, compression_profile};
pub use tier::{DeviceProfile, DeviceTier, classify};
