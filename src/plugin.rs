//! Bevy integration: resources, input coalescing, and the per-frame tick.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`pointer_input_system`]: samples the cursor once and records fire edges in [`PointerState`].
//! 2. [`scene_controls_system`]: keyboard shortcuts for [`SceneToggles`].
//! 3. [`scene_tick_system`]: hands one [`FrameInput`] to the coordinator.
//!
//! [`PointerState`] is the input abstraction layer: tests write it directly
//! to drive the pilot without a window or a mouse.
//!
//! | Key       | Action                 |
//! |-----------|------------------------|
//! | `1`       | toggle particles       |
//! | `2`       | toggle shapes          |
//! | `3`       | toggle the rocket      |
//! | `=` / `-` | speed up / slow down   |
//! | `P`       | next preset            |
//! | `C`       | next palette colour    |
//! | `Space` / left click | fire        |

use crate::config::{self, SceneConfig};
use crate::controls::{parse_hex_color, ControlCursor, SceneToggles};
use crate::quality::QualityTier;
use crate::scene::{FrameInput, SceneCoordinator};
use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

// ── Resources ─────────────────────────────────────────────────────────────────

/// The running scene.  Inserted by [`setup_scene`] at startup.
#[derive(Resource, Debug, Clone)]
pub struct SceneState(pub SceneCoordinator);

/// Fixed RNG seed for reproducible runs; entropy is used when absent.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SceneSeed(pub u64);

/// Latest pointer sample, coalesced to one per frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// Cursor in NDC; `None` while the cursor is outside the window.
    pub ndc: Option<Vec2>,
    /// A fire edge arrived since the last tick.  Consumed by the tick.
    pub fire_pending: bool,
}

/// Running counters, mostly useful for tests and logs.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SceneStats {
    pub ticks: u64,
    pub shapes_broken: u64,
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneConfig>()
            .init_resource::<SceneToggles>()
            .init_resource::<PointerState>()
            .init_resource::<ControlCursor>()
            .init_resource::<SceneStats>()
            .add_systems(
                Startup,
                (
                    config::load_scene_config,
                    setup_scene.after(config::load_scene_config),
                ),
            )
            .add_systems(
                Update,
                (pointer_input_system, scene_controls_system, scene_tick_system).chain(),
            );
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Detect the quality tier (unless one was inserted) and build the coordinator.
pub fn setup_scene(
    mut commands: Commands,
    config: Res<SceneConfig>,
    tier: Option<Res<QualityTier>>,
    seed: Option<Res<SceneSeed>>,
    mut toggles: ResMut<SceneToggles>,
) {
    let tier = tier.map(|t| *t).unwrap_or_else(QualityTier::detect);
    let coordinator = match seed {
        Some(seed) => SceneCoordinator::with_seed(&config, tier, seed.0),
        None => SceneCoordinator::new(&config, tier),
    };
    *toggles = coordinator.toggles();

    info!(
        "✓ Scene ready: {:?} tier, {} particles, {} shapes",
        tier,
        coordinator.field().len(),
        coordinator.pool().len()
    );
    commands.insert_resource(tier);
    commands.insert_resource(SceneState(coordinator));
}

// ── Update systems ────────────────────────────────────────────────────────────

/// Map a window-space cursor (origin top-left, +Y down) to NDC.
pub fn cursor_to_ndc(cursor: Vec2, window_size: Vec2) -> Option<Vec2> {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        cursor.x / window_size.x * 2.0 - 1.0,
        1.0 - cursor.y / window_size.y * 2.0,
    ))
}

/// Sample the cursor once per frame and latch fire edges.
///
/// Without a primary window (headless runs) the pointer is left untouched so
/// callers can drive [`PointerState`] themselves.
pub fn pointer_input_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut pointer: ResMut<PointerState>,
) {
    if let Ok(window) = windows.single() {
        pointer.ndc = window
            .cursor_position()
            .and_then(|c| cursor_to_ndc(c, window.size()));
    }

    let clicked = mouse.is_some_and(|m| m.just_pressed(MouseButton::Left));
    let pressed = keys.is_some_and(|k| k.just_pressed(KeyCode::Space));
    if clicked || pressed {
        pointer.fire_pending = true;
    }
}

/// Keyboard shortcuts for the settings panel.
pub fn scene_controls_system(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut toggles: ResMut<SceneToggles>,
    mut cursor: ResMut<ControlCursor>,
) {
    let Some(keys) = keys else {
        return;
    };

    if keys.just_pressed(KeyCode::Digit1) {
        toggles.particles_enabled = !toggles.particles_enabled;
    }
    if keys.just_pressed(KeyCode::Digit2) {
        toggles.shapes_enabled = !toggles.shapes_enabled;
    }
    if keys.just_pressed(KeyCode::Digit3) {
        toggles.pilot_enabled = !toggles.pilot_enabled;
    }
    if keys.just_pressed(KeyCode::Equal) {
        toggles.step_speed(1);
    }
    if keys.just_pressed(KeyCode::Minus) {
        toggles.step_speed(-1);
    }
    if keys.just_pressed(KeyCode::KeyP) {
        let preset = cursor.next_preset();
        match toggles.apply_preset(preset) {
            Ok(()) => info!("[controls] preset {}: {}", preset.name, preset.description),
            Err(e) => warn!("[controls] {e}"),
        }
    }
    if keys.just_pressed(KeyCode::KeyC) {
        let hex = cursor.next_swatch();
        match parse_hex_color(hex) {
            Ok(color) => toggles.particle_color = color,
            Err(e) => warn!("[controls] {e}"),
        }
    }
}

/// Advance the scene by one frame.
pub fn scene_tick_system(
    time: Res<Time>,
    toggles: Res<SceneToggles>,
    mut pointer: ResMut<PointerState>,
    scene: Option<ResMut<SceneState>>,
    mut stats: ResMut<SceneStats>,
) {
    let Some(mut scene) = scene else {
        return;
    };
    let input = FrameInput {
        elapsed: time.elapsed_secs(),
        delta: time.delta_secs(),
        pointer: pointer.ndc,
        fire: std::mem::take(&mut pointer.fire_pending),
    };

    let frame = scene.0.tick(input, *toggles);
    stats.ticks += 1;
    for index in &frame.broken {
        stats.shapes_broken += 1;
        info!("[scene] shape {index} broken");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_corners_map_to_ndc_corners() {
        let size = Vec2::new(1200.0, 680.0);
        assert_eq!(cursor_to_ndc(Vec2::ZERO, size), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(cursor_to_ndc(size, size), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(cursor_to_ndc(size / 2.0, size), Some(Vec2::ZERO));
    }

    #[test]
    fn zero_sized_window_has_no_pointer() {
        assert_eq!(cursor_to_ndc(Vec2::ONE, Vec2::ZERO), None);
    }

    #[test]
    fn controls_toggle_and_step() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<SceneToggles>();
        app.init_resource::<ControlCursor>();
        app.init_resource::<ButtonInput<KeyCode>>();
        app.add_systems(Update, scene_controls_system);

        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.press(KeyCode::Digit3);
            keys.press(KeyCode::Equal);
            keys.press(KeyCode::KeyP);
        }
        app.update();

        let toggles = *app.world().resource::<SceneToggles>();
        assert!(!toggles.pilot_enabled);
        assert!(toggles.particles_enabled);
        assert_eq!(toggles.speed_multiplier, 1.5);
        assert_eq!(toggles.particle_color, Color::srgb(0.0, 1.0, 0.0));
    }
}
