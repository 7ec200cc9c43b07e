//! Compression Profiles
//!
//! Tier × size-bucket table. Within a tier, quality never increases as the
//! bucket grows.

use crate::DeviceTier;

/// Encoder settings for one raster image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionProfile {
    /// Lossy quality in `0.0..=1.0`
    pub quality: f32,
    /// Widest allowed output width
    pub max_dimension: u32,
}

/// Upper bound of a bucket and what it maps to
struct Bucket {
    upper: i64,
    quality: f32,
    /// `None` keeps the image's own longest side
    max_dimension: Option<u32>,
}

const fn bucket(upper: i64, quality: f32, max_dimension: Option<u32>) -> Bucket {
    Bucket { upper, quality, max_dimension }
}

const STANDARD: &[Bucket] = &[
    bucket(64, 0.9, None),
    bucket(256, 0.7, None),
    bucket(1024, 0.5, Some(1024)),
    bucket(i64::MAX, 0.35, Some(1024)),
];

const MOBILE: &[Bucket] = &[
    bucket(64, 0.8, None),
    bucket(256, 0.6, Some(256)),
    bucket(512, 0.4, Some(512)),
    bucket(i64::MAX, 0.3, Some(512)),
];

const LOW_END: &[Bucket] = &[
    bucket(64, 0.7, None),
    bucket(256, 0.5, Some(256)),
    bucket(512, 0.3, Some(384)),
    bucket(i64::MAX, 0.25, Some(384)),
];

fn table(tier: DeviceTier) -> &'static [Bucket] {
    match tier {
        DeviceTier::Standard => STANDARD,
        DeviceTier::Mobile => MOBILE,
        DeviceTier::LowEnd => LOW_END,
    }
}

/// Pick the profile for an image whose longest side is `max_side`.
///
/// Non-positive sizes fall into the smallest bucket.
pub fn compression_profile(tier: DeviceTier, max_side: i64) -> CompressionProfile {
    let buckets = table(tier);
    let chosen = buckets
        .iter()
        .find(|b| max_side <= b.upper)
        .unwrap_or(&buckets[buckets.len() - 1]);

    let native = max_side.clamp(1, u32::MAX as i64) as u32;
    CompressionProfile {
        quality: chosen.quality,
        max_dimension: chosen.max_dimension.unwrap_or(native),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIERS: [DeviceTier; 3] = [DeviceTier::Standard, DeviceTier::Mobile, DeviceTier::LowEnd];

    #[test]
    fn test_standard_large_image() {
        let profile = compression_profile(DeviceTier::Standard, 2000);
        assert_eq!(profile, CompressionProfile { quality: 0.35, max_dimension: 1024 });
    }

    #[test]
    fn test_small_bucket_keeps_native_side() {
        assert_eq!(compression_profile(DeviceTier::Standard, 40).max_dimension, 40);
        assert_eq!(compression_profile(DeviceTier::Standard, 200).max_dimension, 200);
        assert_eq!(compression_profile(DeviceTier::Mobile, 200).max_dimension, 256);
    }

    #[test]
    fn test_non_positive_side_is_valid() {
        for tier in TIERS {
            for side in [0, -5, i64::MIN] {
                let profile = compression_profile(tier, side);
                assert!(profile.max_dimension >= 1);
                assert!(profile.quality > 0.0 && profile.quality <= 1.0);
                assert_eq!(profile.quality, compression_profile(tier, 64).quality);
            }
        }
    }

    #[test]
    fn test_quality_non_increasing_per_tier() {
        let probes = [-1, 0, 1, 32, 64, 65, 200, 256, 257, 400, 512, 513, 800, 1024, 1025, 4096, i64::MAX];
        for tier in TIERS {
            let qualities: Vec<f32> = probes.iter().map(|&s| compression_profile(tier, s).quality).collect();
            for pair in qualities.windows(2) {
                assert!(pair[1] <= pair[0], "{tier}: {:?}", qualities);
            }
        }
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(compression_profile(DeviceTier::Standard, 1024).quality, 0.5);
        assert_eq!(compression_profile(DeviceTier::Standard, 1025).quality, 0.35);
        assert_eq!(compression_profile(DeviceTier::Mobile, 512).quality, 0.4);
        assert_eq!(compression_profile(DeviceTier::Mobile, 513).quality, 0.3);
        assert_eq!(compression_profile(DeviceTier::LowEnd, 600).max_dimension, 384);
    }
}
