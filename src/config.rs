//! Runtime scene configuration loaded from `assets/scene.toml`.
//!
//! [`SceneConfig`] is a Bevy [`Resource`] mirroring the tunables in
//! [`crate::constants`].  At startup, [`load_scene_config`] reads
//! `assets/scene.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the values you care about:
//!
//! ```toml
//! particle_count_high = 600
//!
//! [[archetypes]]
//! kind = "torus"
//! position = [0.0, 0.0, -2.0]
//! radius = 0.6
//! color = "#00D4FF"
//! ```
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `SceneConfig::default()`.

use crate::constants::*;
use crate::controls::parse_hex_color;
use crate::error::{validate_bounds, validate_damping, SceneError, SceneResult};
use crate::quality::QualityTier;
use crate::shapes::{default_archetypes, DriftProfile, ShapeArchetype, ShapeKind, ShapePhysics};
use bevy::prelude::*;
use serde::Deserialize;

/// Default location of the override file, relative to the working directory.
pub const SCENE_CONFIG_PATH: &str = "assets/scene.toml";

/// One `[[archetypes]]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchetypeConfig {
    pub kind: ShapeKind,
    pub position: [f32; 3],
    pub radius: f32,
    #[serde(default)]
    pub drift: DriftProfile,
    #[serde(default = "default_tempo")]
    pub tempo: f32,
    #[serde(default = "default_shape_color")]
    pub color: String,
}

fn default_tempo() -> f32 {
    1.0
}

fn default_shape_color() -> String {
    DEFAULT_PARTICLE_COLOR.to_string()
}

impl ArchetypeConfig {
    /// Convert to a simulation archetype, rejecting anything the pool cannot use.
    pub fn to_archetype(&self, index: usize) -> SceneResult<ShapeArchetype> {
        let invalid = |reason| SceneError::InvalidArchetype { index, reason };
        let position = Vec3::from_array(self.position);
        if !position.is_finite() {
            return Err(invalid("position must be finite"));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(invalid("radius must be positive"));
        }
        if !(self.tempo.is_finite() && self.tempo >= 0.0) {
            return Err(invalid("tempo must be non-negative"));
        }
        let drift = self.drift;
        if !(drift.frequency.is_finite() && drift.amplitude.is_finite() && drift.phase.is_finite())
        {
            return Err(invalid("drift profile must be finite"));
        }
        Ok(ShapeArchetype {
            kind: self.kind,
            position,
            radius: self.radius,
            drift,
            tempo: self.tempo,
            color: parse_hex_color(&self.color)?,
        })
    }
}

/// Runtime-tunable scene configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset in `assets/scene.toml`.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    // ── Particle Field ───────────────────────────────────────────────────────
    pub particle_count_high: usize,
    pub particle_count_constrained: usize,
    pub field_update_interval_high: u32,
    pub field_update_interval_constrained: u32,

    // ── Shapes ───────────────────────────────────────────────────────────────
    pub bounds_half_extent: f32,
    pub shape_damping: f32,
    pub break_cooldown_secs: f32,
    /// `None` means "use the built-in three shapes".
    pub archetypes: Option<Vec<ArchetypeConfig>>,

    // ── Look ─────────────────────────────────────────────────────────────────
    pub particle_color: String,
    pub speed_multiplier: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count_high: PARTICLE_COUNT_HIGH,
            particle_count_constrained: PARTICLE_COUNT_CONSTRAINED,
            field_update_interval_high: FIELD_UPDATE_INTERVAL_HIGH,
            field_update_interval_constrained: FIELD_UPDATE_INTERVAL_CONSTRAINED,
            bounds_half_extent: BOUNDS_HALF_EXTENT,
            shape_damping: SHAPE_DAMPING,
            break_cooldown_secs: BREAK_COOLDOWN_SECS,
            archetypes: None,
            particle_color: DEFAULT_PARTICLE_COLOR.to_string(),
            speed_multiplier: 1.0,
        }
    }
}

impl SceneConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(contents: &str, path: &str) -> SceneResult<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| SceneError::ConfigParse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the shape physics blow up or the
    /// particle buffers exhaust memory.
    pub fn validate(&self) -> SceneResult<()> {
        validate_particle_count("PARTICLE_COUNT_HIGH", self.particle_count_high)?;
        validate_particle_count("PARTICLE_COUNT_CONSTRAINED", self.particle_count_constrained)?;
        validate_bounds(self.bounds_half_extent)?;
        validate_damping(self.shape_damping)?;
        if !(self.break_cooldown_secs.is_finite() && self.break_cooldown_secs >= 0.0) {
            return Err(SceneError::UnsafeConstant {
                name: "BREAK_COOLDOWN_SECS",
                value: self.break_cooldown_secs,
                safe_range: "[0.0, ∞)",
            });
        }
        Ok(())
    }

    /// The configured archetypes, or the built-in set when none are configured.
    ///
    /// A single bad entry rejects the whole list.
    pub fn shape_archetypes(&self) -> SceneResult<Vec<ShapeArchetype>> {
        match &self.archetypes {
            None => Ok(default_archetypes()),
            Some(list) => list
                .iter()
                .enumerate()
                .map(|(i, a)| a.to_archetype(i))
                .collect(),
        }
    }

    pub fn shape_physics(&self) -> ShapePhysics {
        ShapePhysics {
            bounds_half_extent: self.bounds_half_extent,
            damping: self.shape_damping,
            break_cooldown: self.break_cooldown_secs,
        }
    }

    pub fn particle_count(&self, tier: QualityTier) -> usize {
        match tier {
            QualityTier::High => self.particle_count_high,
            QualityTier::Constrained => self.particle_count_constrained,
        }
    }

    pub fn field_update_interval(&self, tier: QualityTier) -> u32 {
        match tier {
            QualityTier::High => self.field_update_interval_high,
            QualityTier::Constrained => self.field_update_interval_constrained,
        }
    }
}

fn validate_particle_count(name: &'static str, count: usize) -> SceneResult<()> {
    if count > MAX_PARTICLE_COUNT {
        return Err(SceneError::UnsafeConstant {
            name,
            value: count as f32,
            safe_range: "[0, 20000]",
        });
    }
    Ok(())
}

/// Startup system: attempt to load `assets/scene.toml` and overwrite the
/// `SceneConfig` resource with its values.
///
/// A missing file is not an error (defaults are already in place).  Parse or
/// validation errors are logged and the defaults are kept.
pub fn load_scene_config(mut config: ResMut<SceneConfig>) {
    let path = SCENE_CONFIG_PATH;
    match std::fs::read_to_string(path) {
        Ok(contents) => match SceneConfig::from_toml_str(&contents, path) {
            Ok(loaded) => {
                *config = loaded;
                info!("✓ Loaded scene config from {path}");
            }
            Err(e) => warn!("⚠ {e}; using defaults"),
        },
        Err(_) => info!("ℹ No {path} found; using compiled defaults"),
    }
}
