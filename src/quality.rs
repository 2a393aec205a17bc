//! One-shot device quality detection.
//!
//! Runs once at startup and picks how many particles the field gets.  There
//! is no portable graphics-capability query before a renderer exists, so the
//! logical core count stands in for it.  Any failure to probe the device
//! degrades to [`QualityTier::Constrained`].

use crate::error::{SceneError, SceneResult};
use bevy::prelude::*;

/// Environment variable that forces a tier (`high` / `low`).
pub const QUALITY_ENV: &str = "BACKDROP_QUALITY";

/// Logical cores required for the high tier.
const HIGH_TIER_MIN_CORES: usize = 8;

/// Rendering cost tier.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityTier {
    High,
    /// Fewer particles and a slower buffer refresh.
    #[default]
    Constrained,
}

impl QualityTier {
    /// Map a probe result onto a tier; probe errors are logged and treated as constrained.
    pub fn from_probe(probe: SceneResult<usize>) -> Self {
        match probe {
            Ok(cores) if cores >= HIGH_TIER_MIN_CORES => QualityTier::High,
            Ok(_) => QualityTier::Constrained,
            Err(e) => {
                warn!("⚠ {e}; falling back to constrained quality");
                QualityTier::Constrained
            }
        }
    }

    /// Parse the [`QUALITY_ENV`] override.
    pub fn from_override(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(QualityTier::High),
            "low" | "constrained" => Some(QualityTier::Constrained),
            _ => None,
        }
    }

    /// Detect the tier for this machine, honouring the environment override.
    pub fn detect() -> Self {
        if let Some(tier) = std::env::var(QUALITY_ENV)
            .ok()
            .and_then(|v| Self::from_override(&v))
        {
            return tier;
        }
        Self::from_probe(probe_cores())
    }
}

fn probe_cores() -> SceneResult<usize> {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .map_err(|e| SceneError::DeviceProbe {
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_failure_is_constrained() {
        let tier = QualityTier::from_probe(Err(SceneError::DeviceProbe {
            reason: "no adapter".into(),
        }));
        assert_eq!(tier, QualityTier::Constrained);
    }

    #[test]
    fn core_count_picks_the_tier() {
        assert_eq!(QualityTier::from_probe(Ok(16)), QualityTier::High);
        assert_eq!(QualityTier::from_probe(Ok(2)), QualityTier::Constrained);
    }

    #[test]
    fn override_parsing() {
        assert_eq!(QualityTier::from_override(" HIGH "), Some(QualityTier::High));
        assert_eq!(QualityTier::from_override("low"), Some(QualityTier::Constrained));
        assert_eq!(QualityTier::from_override("ultra"), None);
    }
}
