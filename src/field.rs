//! Mouse-reactive ambient particle field.
//!
//! The field keeps two flat `[x, y, z, x, y, z, …]` buffers: immutable rest
//! origins and the current positions the renderer reads.  Every update
//! recomputes the current buffer from the origins, so no error accumulates
//! and throttling the rewrite only changes how often the picture refreshes.
//!
//! The pointer push uses a Manhattan distance rather than a Euclidean one;
//! it is cheaper per particle and visually indistinguishable at this scale.

use crate::constants::*;
use bevy::prelude::*;
use rand::Rng;

/// Fixed-size particle cloud.
#[derive(Debug, Clone)]
pub struct ParticleField {
    origins: Vec<f32>,
    positions: Vec<f32>,
    rotation: Vec2,
    color: Color,
    update_interval: u32,
    ticks: u64,
}

impl ParticleField {
    /// Scatter `count` origins uniformly inside the 12×12×8 field box.
    ///
    /// `count` is capped at [`MAX_PARTICLE_COUNT`].
    pub fn new(count: usize, color: Color, rng: &mut impl Rng) -> Self {
        let count = count.min(MAX_PARTICLE_COUNT);
        let mut origins = Vec::with_capacity(count * 3);
        for _ in 0..count {
            origins.push((rng.gen::<f32>() - 0.5) * FIELD_SPREAD_X);
            origins.push((rng.gen::<f32>() - 0.5) * FIELD_SPREAD_Y);
            origins.push((rng.gen::<f32>() - 0.5) * FIELD_SPREAD_Z);
        }
        let positions = origins.clone();
        Self {
            origins,
            positions,
            rotation: Vec2::ZERO,
            color,
            update_interval: FIELD_UPDATE_INTERVAL_HIGH,
            ticks: 0,
        }
    }

    /// Rewrite the buffer only every `interval` ticks (`0` is treated as `1`).
    pub fn with_update_interval(mut self, interval: u32) -> Self {
        self.update_interval = interval.max(1);
        self
    }

    /// Advance one tick.
    ///
    /// `pointer_ndc` is `None` when there is no hovering pointer (touch
    /// devices, cursor outside the window); the field then only drifts.
    /// Non-finite inputs skip the tick so the buffer stays finite.
    pub fn advance(&mut self, elapsed: f32, pointer_ndc: Option<Vec2>, speed: f32) {
        if !elapsed.is_finite() || !speed.is_finite() {
            return;
        }
        let pointer = pointer_ndc.filter(|p| p.is_finite());

        let t = elapsed * speed;
        self.rotation = Vec2::new(t * FIELD_ROTATION_RATE_X, t * FIELD_ROTATION_RATE_Y);

        self.ticks += 1;
        if self.ticks % u64::from(self.update_interval) != 0 {
            return;
        }

        let influence = pointer.map(|p| p * FIELD_POINTER_SCALE);
        for (origin, current) in self
            .origins
            .chunks_exact(3)
            .zip(self.positions.chunks_exact_mut(3))
        {
            let (ox, oy, oz) = (origin[0], origin[1], origin[2]);
            let mut push = Vec2::ZERO;
            if let Some(p) = influence {
                let manhattan = (ox - p.x).abs() + (oy - p.y).abs();
                let force = (FIELD_REPULSION_REACH - manhattan).max(0.0) * FIELD_REPULSION_STRENGTH;
                push = (Vec2::new(ox, oy) - p) * force;
            }
            current[0] = ox + (t + ox).sin() * FIELD_DRIFT_AMPLITUDE + push.x;
            current[1] = oy + (t + oy).sin() * FIELD_DRIFT_AMPLITUDE + push.y;
            current[2] = oz + (t + oz).sin() * FIELD_DRIFT_AMPLITUDE;
        }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn origins(&self) -> &[f32] {
        &self.origins
    }

    /// Number of particles (not floats).
    pub fn len(&self) -> usize {
        self.origins.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Whole-field rotation about X and Y, in radians.
    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}
