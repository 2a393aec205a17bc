//! Pilot state: the rocket's kinematics, mode, and timers.
//!
//! Behaviour lives in [`super::control`]; this module only holds data.

use crate::constants::PILOT_DEPTH;
use bevy::prelude::*;

/// Behaviour the rocket is in for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PilotMode {
    /// Chase the smoothed pointer.
    #[default]
    Follow,
    /// Circle the target while the pointer rests.
    Orbit,
    /// Short dash toward the target that breaks shapes on contact.
    Fire,
}

/// Everything the pilot needs from the host for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PilotInput {
    /// Scene time in seconds.
    pub elapsed: f32,
    /// Seconds since the previous tick.
    pub delta: f32,
    /// Pointer in NDC, `None` when no pointer hovers the scene.
    pub pointer: Option<Vec2>,
    /// Edge-triggered fire request (click / key press this frame).
    pub fire: bool,
    pub speed: f32,
}

/// Request to take a shape out of the scene, by pool index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakRequest {
    pub index: usize,
}

/// The steerable rocket.
#[derive(Debug, Clone, PartialEq)]
pub struct Pilot {
    pub position: Vec2,
    /// Displacement per 60 Hz reference frame.
    pub velocity: Vec2,
    /// Smoothed pointer position in the pilot plane.
    pub target: Vec2,
    pub mode: PilotMode,
    pub orbit_angle: f32,
    /// Heading in radians, wrapped to `[-π, π)`.
    pub facing: f32,
    /// Seconds the pointer has stayed within `IDLE_DISTANCE` of `idle_anchor`.
    pub idle_secs: f32,
    pub idle_anchor: Option<Vec2>,
    /// Scene time the current dash started.  `None` outside Fire.
    pub fire_started_at: Option<f32>,
    /// Scene time of the last dash hit scan.
    pub last_hit_scan: Option<f32>,
}

impl Default for Pilot {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl Pilot {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            target: position,
            mode: PilotMode::Follow,
            orbit_angle: 0.0,
            facing: std::f32::consts::FRAC_PI_2,
            idle_secs: 0.0,
            idle_anchor: None,
            fire_started_at: None,
            last_hit_scan: None,
        }
    }

    /// Position in scene space (the pilot flies at a fixed depth).
    pub fn world_position(&self) -> Vec3 {
        self.position.extend(PILOT_DEPTH)
    }

    /// Whether a dash started at `fire_started_at` still covers `elapsed`.
    #[inline]
    pub fn fire_active(&self, elapsed: f32) -> bool {
        self.fire_started_at
            .is_some_and(|start| elapsed - start < crate::constants::FIRE_DURATION_SECS)
    }
}
