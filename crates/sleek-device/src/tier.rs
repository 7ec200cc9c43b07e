//! Device Tier
//!
//! Capability classification. Evaluated once; never re-evaluated on resize.

use crate::Environment;

/// Viewport width at or below which a device counts as mobile
const MOBILE_VIEWPORT_MAX: u32 = 768;

/// Rendering capability tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceTier {
    #[default]
    Standard,
    Mobile,
    LowEnd,
}

impl DeviceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Mobile => "mobile",
            Self::LowEnd => "low-end",
        }
    }

    /// Parse the `as_str` form
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "mobile" => Some(Self::Mobile),
            "low-end" | "lowend" | "low_end" => Some(Self::LowEnd),
            _ => None,
        }
    }

    /// Longest side allowed for rasterized vector output
    pub fn vector_max_side(&self) -> u32 {
        match self {
            Self::Standard => 512,
            Self::Mobile => 256,
            Self::LowEnd => 192,
        }
    }

    /// Encoder quality for rasterized vector output
    pub fn vector_quality(&self) -> f32 {
        match self {
            Self::Standard => 0.6,
            Self::Mobile => 0.5,
            Self::LowEnd => 0.4,
        }
    }
}

impl std::fmt::Display for DeviceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the environment into a tier
pub fn classify(env: &Environment) -> DeviceTier {
    let few_cores = env.hardware_concurrency.is_some_and(|cores| cores <= 2);
    let little_memory = env.device_memory_gb.is_some_and(|gb| gb <= 1.0);
    if few_cores || little_memory {
        return DeviceTier::LowEnd;
    }

    if env.viewport_width <= MOBILE_VIEWPORT_MAX || is_mobile_agent(&env.user_agent) {
        return DeviceTier::Mobile;
    }

    DeviceTier::Standard
}

fn is_mobile_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    ua.contains("mobi") || ua.contains("android")
}

/// Immutable capability snapshot shared by every component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub tier: DeviceTier,
    pub supports_webp: bool,
}

impl DeviceProfile {
    /// Classify `env` once
    pub fn detect(env: &Environment) -> Self {
        let profile = Self {
            tier: classify(env),
            supports_webp: env.supports_webp,
        };
        tracing::info!(tier = %profile.tier, webp = profile.supports_webp, "device classified");
        profile
    }

    /// Profile for an explicit tier
    pub fn with_tier(tier: DeviceTier, supports_webp: bool) -> Self {
        Self { tier, supports_webp }
    }

    pub fn vector_max_side(&self) -> u32 {
        self.tier.vector_max_side()
    }

    pub fn vector_quality(&self) -> f32 {
        self.tier.vector_quality()
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::with_tier(DeviceTier::Standard, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_is_standard() {
        assert_eq!(classify(&Environment::desktop()), DeviceTier::Standard);
    }

    #[test]
    fn test_narrow_viewport_is_mobile() {
        let env = Environment::desktop().with_viewport_width(768);
        assert_eq!(classify(&env), DeviceTier::Mobile);

        let env = Environment::desktop().with_viewport_width(769);
        assert_eq!(classify(&env), DeviceTier::Standard);
    }

    #[test]
    fn test_user_agent_is_mobile() {
        let env = Environment::desktop().with_user_agent("Mozilla/5.0 (iPhone) Mobile/15E148");
        assert_eq!(classify(&env), DeviceTier::Mobile);

        let env = Environment::desktop().with_user_agent("Mozilla/5.0 (Linux; ANDROID 13)");
        assert_eq!(classify(&env), DeviceTier::Mobile);
    }

    #[test]
    fn test_low_end_wins_over_mobile() {
        let env = Environment::mobile().with_hardware_concurrency(2);
        assert_eq!(classify(&env), DeviceTier::LowEnd);

        let env = Environment::desktop().with_device_memory(0.5);
        assert_eq!(classify(&env), DeviceTier::LowEnd);
    }

    #[test]
    fn test_missing_hints_are_not_low_end() {
        let mut env = Environment::desktop();
        env.hardware_concurrency = None;
        env.device_memory_gb = None;
        assert_eq!(classify(&env), DeviceTier::Standard);
    }

    #[test]
    fn test_tier_parse_round_trip() {
        for tier in [DeviceTier::Standard, DeviceTier::Mobile, DeviceTier::LowEnd] {
            assert_eq!(DeviceTier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(DeviceTier::parse("tablet"), None);
    }

    #[test]
    fn test_detect_keeps_webp_flag() {
        let device = DeviceProfile::detect(&Environment::mobile().with_webp(false));
        assert_eq!(device.tier, DeviceTier::Mobile);
        assert!(!device.supports_webp);
        assert_eq!(device.vector_max_side(), 256);
    }
}
