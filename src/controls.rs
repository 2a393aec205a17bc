//! Scene toggles, colour presets and speed stepping.
//!
//! [`SceneToggles`] is the host-owned switchboard handed to the coordinator
//! every tick.  The preset / palette tables reproduce the settings panel of
//! the portfolio page: three named looks and six swatches.

use crate::constants::{DEFAULT_PARTICLE_COLOR, SPEED_MAX, SPEED_MIN, SPEED_STEP};
use crate::error::{SceneError, SceneResult};
use bevy::prelude::*;

/// Which sub-systems run and how fast.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SceneToggles {
    pub particles_enabled: bool,
    pub shapes_enabled: bool,
    pub pilot_enabled: bool,
    /// Global time scale, kept within `[SPEED_MIN, SPEED_MAX]` by the setters.
    pub speed_multiplier: f32,
    pub particle_color: Color,
}

impl Default for SceneToggles {
    fn default() -> Self {
        Self {
            particles_enabled: true,
            shapes_enabled: true,
            pilot_enabled: true,
            speed_multiplier: 1.0,
            particle_color: parse_hex_color(DEFAULT_PARTICLE_COLOR).unwrap_or(Color::WHITE),
        }
    }
}

impl SceneToggles {
    /// Set the speed, snapped onto the slider grid.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed_multiplier = snap_speed(speed);
    }

    /// Move the speed `steps` notches up (positive) or down (negative).
    pub fn step_speed(&mut self, steps: i32) {
        self.speed_multiplier = snap_speed(self.speed_multiplier + steps as f32 * SPEED_STEP);
    }

    /// Apply a preset's particle colour.
    pub fn apply_preset(&mut self, preset: &ScenePreset) -> SceneResult<()> {
        self.particle_color = preset.color()?;
        Ok(())
    }
}

/// Clamp `speed` to the slider range and round it to the nearest step.
///
/// Non-finite input falls back to 1×.
pub fn snap_speed(speed: f32) -> f32 {
    if !speed.is_finite() {
        return 1.0;
    }
    let clamped = speed.clamp(SPEED_MIN, SPEED_MAX);
    ((clamped / SPEED_STEP).round() * SPEED_STEP).clamp(SPEED_MIN, SPEED_MAX)
}

/// Parse a `#RRGGBB` / `#RRGGBBAA` hex string (the leading `#` is optional).
pub fn parse_hex_color(value: &str) -> SceneResult<Color> {
    Srgba::hex(value)
        .map(Color::Srgba)
        .map_err(|_| SceneError::InvalidColor {
            value: value.to_string(),
        })
}

// ── Presets ───────────────────────────────────────────────────────────────────

/// A named look for the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenePreset {
    pub name: &'static str,
    pub particle_color: &'static str,
    pub description: &'static str,
}

impl ScenePreset {
    pub fn color(&self) -> SceneResult<Color> {
        parse_hex_color(self.particle_color)
    }
}

pub const PRESETS: [ScenePreset; 3] = [
    ScenePreset {
        name: "Nebula",
        particle_color: "#FF00FF",
        description: "Cosmic purple & cyan",
    },
    ScenePreset {
        name: "Matrix",
        particle_color: "#00FF00",
        description: "Digital green vibes",
    },
    ScenePreset {
        name: "Synthwave",
        particle_color: "#FF1493",
        description: "Retro pink & purple",
    },
];

/// Swatches offered by the colour picker, as `(name, hex)`.
pub const PALETTE: [(&str, &str); 6] = [
    ("Orange", "#FF6B35"),
    ("Purple", "#764ba2"),
    ("Blue", "#667eea"),
    ("Cyan", "#00D4FF"),
    ("Pink", "#FF0080"),
    ("Green", "#00FF88"),
];

/// Look up a preset by name, ignoring case.
pub fn preset_by_name(name: &str) -> Option<&'static ScenePreset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Cursor over [`PRESETS`] and [`PALETTE`] used by the keyboard bindings.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ControlCursor {
    pub preset: usize,
    pub swatch: usize,
}

impl ControlCursor {
    /// Advance to the next preset and return it.
    pub fn next_preset(&mut self) -> &'static ScenePreset {
        self.preset = (self.preset + 1) % PRESETS.len();
        &PRESETS[self.preset]
    }

    /// Advance to the next swatch and return its hex code.
    pub fn next_swatch(&mut self) -> &'static str {
        self.swatch = (self.swatch + 1) % PALETTE.len();
        PALETTE[self.swatch].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_and_swatch_parses() {
        for preset in &PRESETS {
            assert!(preset.color().is_ok(), "{} failed to parse", preset.name);
        }
        for (name, hex) in &PALETTE {
            assert!(parse_hex_color(hex).is_ok(), "{name} failed to parse");
        }
    }

    #[test]
    fn bad_hex_is_reported() {
        let err = parse_hex_color("#GG0000").unwrap_err();
        assert_eq!(
            err,
            SceneError::InvalidColor {
                value: "#GG0000".into()
            }
        );
    }

    #[test]
    fn speed_snaps_to_half_steps_within_range() {
        assert_eq!(snap_speed(1.2), 1.0);
        assert_eq!(snap_speed(1.3), 1.5);
        assert_eq!(snap_speed(0.1), 0.5);
        assert_eq!(snap_speed(10.0), 3.0);
        assert_eq!(snap_speed(f32::NAN), 1.0);
    }

    #[test]
    fn stepping_speed_saturates_at_the_ends() {
        let mut toggles = SceneToggles::default();
        toggles.step_speed(10);
        assert_eq!(toggles.speed_multiplier, SPEED_MAX);
        toggles.step_speed(-1);
        assert_eq!(toggles.speed_multiplier, 2.5);
        toggles.step_speed(-10);
        assert_eq!(toggles.speed_multiplier, SPEED_MIN);
    }

    #[test]
    fn presets_cycle_and_apply() {
        let mut cursor = ControlCursor::default();
        let mut toggles = SceneToggles::default();
        let preset = cursor.next_preset();
        assert_eq!(preset.name, "Matrix");
        toggles.apply_preset(preset).unwrap();
        assert_eq!(toggles.particle_color, Color::srgb(0.0, 1.0, 0.0));

        cursor.next_preset();
        assert_eq!(cursor.next_preset().name, "Nebula");
        assert_eq!(preset_by_name("synthwave").map(|p| p.particle_color), Some("#FF1493"));
    }
}
