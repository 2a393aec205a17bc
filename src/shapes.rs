//! Floating wireframe shapes: archetypes, the body pool, and the shared registry.
//!
//! ## Per-tick pipeline ([`ShapePool::advance`])
//!
//! | Step | What                                                         |
//! |------|--------------------------------------------------------------|
//! | 1    | Reinstate shapes whose break cooldown has expired            |
//! | 2    | Pointer attraction (inside a radius of 3 around `pointer·5`) |
//! | 3    | Pairwise circle collisions, every 2nd tick                   |
//! | 4    | Integrate + bounce off the ±5 box (restitution 0.8)          |
//! | 5    | Idle float offset, damping ×0.98, cosmetic spin              |
//! | 6    | Publish positions into the [`ShapeRegistry`]                 |
//!
//! Velocities are in units per tick, not per second.

use crate::constants::*;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

// ── Archetypes ────────────────────────────────────────────────────────────────

/// Which wireframe a shape is drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Icosahedron,
    Torus,
    Octahedron,
}

/// Idle vertical bob of one archetype.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DriftProfile {
    /// Angular frequency (rad per second of scaled time).
    pub frequency: f32,
    /// Peak vertical offset.
    pub amplitude: f32,
    /// Phase offset so shapes do not bob in lockstep.
    pub phase: f32,
}

impl Default for DriftProfile {
    fn default() -> Self {
        Self {
            frequency: FLOAT_FREQUENCY,
            amplitude: FLOAT_AMPLITUDE,
            phase: 0.0,
        }
    }
}

/// Template a shape is spawned (and respawned) from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeArchetype {
    pub kind: ShapeKind,
    pub position: Vec3,
    pub radius: f32,
    pub drift: DriftProfile,
    /// Multiplier on the scene speed for this shape's bob and spin.
    pub tempo: f32,
    pub color: Color,
}

/// The built-in icosahedron, torus and octahedron.
pub fn default_archetypes() -> Vec<ShapeArchetype> {
    vec![
        ShapeArchetype {
            kind: ShapeKind::Icosahedron,
            position: Vec3::new(-2.5, 0.0, -2.0),
            radius: 0.5,
            drift: DriftProfile::default(),
            tempo: 1.0,
            color: Color::srgb_u8(0xFF, 0x6B, 0x35),
        },
        ShapeArchetype {
            kind: ShapeKind::Torus,
            position: Vec3::new(2.5, -0.5, -3.0),
            radius: 0.4,
            drift: DriftProfile {
                phase: 2.1,
                ..DriftProfile::default()
            },
            tempo: 0.8,
            color: Color::srgb_u8(0x76, 0x4b, 0xa2),
        },
        ShapeArchetype {
            kind: ShapeKind::Octahedron,
            position: Vec3::new(0.0, 1.5, -2.5),
            radius: 0.45,
            drift: DriftProfile {
                phase: 4.2,
                ..DriftProfile::default()
            },
            tempo: 0.9,
            color: Color::srgb_u8(0x66, 0x7e, 0xea),
        },
    ]
}

// ── Bodies ────────────────────────────────────────────────────────────────────

/// Physics state of one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeBody {
    /// Simulated position; `z` never changes.
    pub position: Vec3,
    /// Planar velocity in units per tick.
    pub velocity: Vec2,
    pub radius: f32,
    pub alive: bool,
    /// Scene time at which a broken shape comes back.  `None` while alive.
    pub broken_until: Option<f32>,
    /// Cosmetic orientation about X and Y.
    pub rotation: Vec2,
    /// Render-only vertical bob added on top of `position.y`.
    pub float_offset: f32,
}

impl ShapeBody {
    fn spawn(archetype: &ShapeArchetype, rng: &mut impl Rng) -> Self {
        Self {
            position: archetype.position,
            velocity: spawn_velocity(rng),
            radius: archetype.radius,
            alive: true,
            broken_until: None,
            rotation: Vec2::ZERO,
            float_offset: 0.0,
        }
    }

    /// Where the shape is drawn: simulated position plus the idle bob.
    pub fn render_position(&self) -> Vec3 {
        self.position + Vec3::Y * self.float_offset
    }
}

fn spawn_velocity(rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.gen_range(-SPAWN_VELOCITY_RANGE..SPAWN_VELOCITY_RANGE),
        rng.gen_range(-SPAWN_VELOCITY_RANGE..SPAWN_VELOCITY_RANGE),
    )
}

/// Tunables of the pool, normally taken from [`crate::config::SceneConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePhysics {
    pub bounds_half_extent: f32,
    pub damping: f32,
    pub break_cooldown: f32,
}

impl Default for ShapePhysics {
    fn default() -> Self {
        Self {
            bounds_half_extent: BOUNDS_HALF_EXTENT,
            damping: SHAPE_DAMPING,
            break_cooldown: BREAK_COOLDOWN_SECS,
        }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// What the pilot is allowed to know about a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistryEntry {
    pub position: Vec2,
    pub radius: f32,
    pub alive: bool,
}

/// Index-aligned snapshot of the pool, refreshed by the pool every tick.
///
/// Owned by the coordinator; the pool writes it, everyone else reads it.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    entries: Vec<RegistryEntry>,
}

impl ShapeRegistry {
    /// Overwrite the snapshot from the pool's bodies.
    pub fn publish(&mut self, bodies: &[ShapeBody]) {
        self.entries.clear();
        self.entries.extend(bodies.iter().map(|b| RegistryEntry {
            position: b.position.truncate(),
            radius: b.radius,
            alive: b.alive,
        }));
    }

    pub fn get(&self, index: usize) -> Option<&RegistryEntry> {
        self.entries.get(index)
    }

    /// Alive entries with their pool index.
    pub fn iter_alive(&self) -> impl Iterator<Item = (usize, &RegistryEntry)> {
        self.entries.iter().enumerate().filter(|(_, e)| e.alive)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn mark_broken(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.alive = false;
        }
    }
}

// ── Pool ──────────────────────────────────────────────────────────────────────

/// Owns every shape body.
#[derive(Debug, Clone)]
pub struct ShapePool {
    archetypes: Vec<ShapeArchetype>,
    bodies: Vec<ShapeBody>,
    physics: ShapePhysics,
    ticks: u64,
    rng: StdRng,
}

impl ShapePool {
    /// Spawn one body per archetype with a random drift velocity.
    pub fn new(archetypes: Vec<ShapeArchetype>, physics: ShapePhysics, rng: &mut impl Rng) -> Self {
        let mut rng = StdRng::seed_from_u64(rng.gen());
        let bodies = archetypes
            .iter()
            .map(|a| ShapeBody::spawn(a, &mut rng))
            .collect();
        Self {
            archetypes,
            bodies,
            physics,
            ticks: 0,
            rng,
        }
    }

    /// Advance one tick and publish the result into `registry`.
    ///
    /// Integration is per tick, so `delta` only gates the tick: a non-finite
    /// value (or time, or speed) skips the step and republishes as-is.
    pub fn advance(
        &mut self,
        elapsed: f32,
        delta: f32,
        pointer_ndc: Option<Vec2>,
        speed: f32,
        registry: &mut ShapeRegistry,
    ) {
        if !(elapsed.is_finite() && delta.is_finite() && speed.is_finite()) {
            registry.publish(&self.bodies);
            return;
        }
        self.ticks += 1;
        self.respawn_expired(elapsed);

        if let Some(target) = pointer_ndc.filter(|p| p.is_finite()) {
            let target = target * SHAPE_POINTER_SCALE;
            for body in self.bodies.iter_mut().filter(|b| b.alive) {
                attract(body, target);
            }
        }

        if self.ticks % COLLISION_TICK_INTERVAL == 0 {
            self.resolve_collisions();
        }

        let half = self.physics.bounds_half_extent;
        let damping = self.physics.damping;
        for (body, archetype) in self.bodies.iter_mut().zip(&self.archetypes) {
            if !body.alive {
                continue;
            }
            body.position.x += body.velocity.x * speed;
            body.position.y += body.velocity.y * speed;
            reflect_axis(&mut body.position.x, &mut body.velocity.x, half);
            reflect_axis(&mut body.position.y, &mut body.velocity.y, half);

            let local_t = elapsed * speed * archetype.tempo;
            let drift = archetype.drift;
            body.float_offset = (local_t * drift.frequency + drift.phase).sin() * drift.amplitude;

            body.velocity *= damping;

            body.rotation = Vec2::new(local_t * SHAPE_SPIN_RATE_X, local_t * SHAPE_SPIN_RATE_Y);
        }

        registry.publish(&self.bodies);
    }

    /// Take a shape out of the scene for the break cooldown.
    ///
    /// Returns `false` if the index is unknown or the shape is already broken.
    pub fn break_shape(&mut self, index: usize, now: f32) -> bool {
        let cooldown = self.physics.break_cooldown;
        match self.bodies.get_mut(index) {
            Some(body) if body.alive => {
                body.alive = false;
                body.broken_until = Some(now + cooldown);
                true
            }
            _ => false,
        }
    }

    pub fn is_alive(&self, index: usize) -> bool {
        self.bodies.get(index).is_some_and(|b| b.alive)
    }

    pub fn bodies(&self) -> &[ShapeBody] {
        &self.bodies
    }

    pub fn archetypes(&self) -> &[ShapeArchetype] {
        &self.archetypes
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn respawn_expired(&mut self, elapsed: f32) {
        for (body, archetype) in self.bodies.iter_mut().zip(&self.archetypes) {
            if body.broken_until.is_some_and(|until| elapsed >= until) {
                *body = ShapeBody::spawn(archetype, &mut self.rng);
            }
        }
    }

    fn resolve_collisions(&mut self) {
        let n = self.bodies.len();
        for i in 0..n {
            let (head, tail) = self.bodies.split_at_mut(i + 1);
            let a = &mut head[i];
            if !a.alive {
                continue;
            }
            for b in tail.iter_mut().filter(|b| b.alive) {
                if let Some(impulse) = collision_impulse(
                    a.position.truncate(),
                    a.radius,
                    b.position.truncate(),
                    b.radius,
                ) {
                    a.velocity -= impulse;
                    b.velocity += impulse;
                }
            }
        }
    }
}

/// Nudge `body` toward `target` when it is within the attraction reach.
fn attract(body: &mut ShapeBody, target: Vec2) {
    let offset = target - body.position.truncate();
    let dist_sq = offset.length_squared();
    if dist_sq >= SHAPE_ATTRACT_RADIUS_SQ || dist_sq == 0.0 {
        return;
    }
    let dist = dist_sq.sqrt();
    let dir = offset / dist.max(MIN_SEPARATION);
    body.velocity += dir * (SHAPE_ATTRACT_REACH - dist) * SHAPE_ATTRACT_STRENGTH;
}

/// Impulse to add to `b` (and subtract from `a`) when two circles overlap.
///
/// Returns `None` when they do not touch or sit exactly on top of each other.
pub fn collision_impulse(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<Vec2> {
    let delta = pb - pa;
    let dist_sq = delta.length_squared();
    let reach = ra + rb;
    if dist_sq >= reach * reach || dist_sq == 0.0 {
        return None;
    }
    let dist = dist_sq.sqrt().max(MIN_SEPARATION);
    let normal = delta / dist;
    let overlap = reach - dist;
    Some(normal * (overlap * COLLISION_OVERLAP_FACTOR + COLLISION_BOUNCE))
}

/// Keep one axis inside `±half`, bouncing the velocity back inward.
fn reflect_axis(pos: &mut f32, vel: &mut f32, half: f32) {
    if pos.abs() > half {
        let side = pos.signum();
        *pos = side * half;
        *vel = -side * vel.abs() * WALL_RESTITUTION;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archetype_at(x: f32, y: f32, radius: f32) -> ShapeArchetype {
        ShapeArchetype {
            kind: ShapeKind::Icosahedron,
            position: Vec3::new(x, y, -2.0),
            radius,
            drift: DriftProfile::default(),
            tempo: 1.0,
            color: Color::WHITE,
        }
    }

    fn pool(archetypes: Vec<ShapeArchetype>) -> ShapePool {
        let mut rng = StdRng::seed_from_u64(11);
        ShapePool::new(archetypes, ShapePhysics::default(), &mut rng)
    }

    #[test]
    fn shapes_never_leave_the_box() {
        let mut pool = pool(default_archetypes());
        for body in pool.bodies.iter_mut() {
            body.velocity = Vec2::new(0.7, -0.9);
        }
        let mut registry = ShapeRegistry::default();
        for i in 0..2_000 {
            let t = i as f32 / 60.0;
            let pointer = Vec2::new((t * 0.7).sin(), (t * 1.3).cos());
            pool.advance(t, 1.0 / 60.0, Some(pointer), 3.0, &mut registry);
            for body in pool.bodies() {
                assert!(body.position.x.abs() <= BOUNDS_HALF_EXTENT + 1e-4);
                assert!(body.position.y.abs() <= BOUNDS_HALF_EXTENT + 1e-4);
                assert!(body.velocity.is_finite());
            }
        }
    }

    #[test]
    fn wall_bounce_reflects_with_restitution() {
        let mut x = 5.2;
        let mut vx = 0.5;
        reflect_axis(&mut x, &mut vx, 5.0);
        assert_eq!(x, 5.0);
        assert!((vx + 0.4).abs() < 1e-6);

        let mut x = -5.1;
        let mut vx = -0.1;
        reflect_axis(&mut x, &mut vx, 5.0);
        assert_eq!(x, -5.0);
        assert!(vx > 0.0);
    }

    #[test]
    fn damping_shrinks_velocity_every_tick() {
        let mut pool = pool(vec![archetype_at(0.0, 0.0, 0.5)]);
        pool.bodies[0].velocity = Vec2::new(0.01, -0.008);
        let mut registry = ShapeRegistry::default();
        let mut last = pool.bodies()[0].velocity.length();
        for i in 0..400 {
            pool.advance(i as f32 / 60.0, 1.0 / 60.0, None, 1.0, &mut registry);
            let speed = pool.bodies()[0].velocity.length();
            assert!(speed < last, "tick {i}: {speed} !< {last}");
            assert!((speed - last * SHAPE_DAMPING).abs() < 1e-6);
            last = speed;
        }
        assert!(last < 1e-5);
    }

    #[test]
    fn collision_impulses_are_equal_and_opposite() {
        let mut pool = pool(vec![archetype_at(-0.2, 0.1, 0.5), archetype_at(0.3, -0.1, 0.5)]);
        for body in pool.bodies.iter_mut() {
            body.velocity = Vec2::ZERO;
        }
        let before: Vec<Vec2> = pool.bodies().iter().map(|b| b.velocity).collect();
        pool.resolve_collisions();
        let da = pool.bodies()[0].velocity - before[0];
        let db = pool.bodies()[1].velocity - before[1];
        assert!(da.length() > 0.0);
        assert!((da + db).length() < 1e-6, "impulses must cancel: {da:?} {db:?}");
        assert!((da.length() - db.length()).abs() < 1e-6);
        // A is pushed left, B right.
        assert!(da.x < 0.0 && db.x > 0.0);
    }

    #[test]
    fn impulse_includes_the_flat_bounce() {
        let impulse = collision_impulse(Vec2::ZERO, 0.5, Vec2::new(0.8, 0.0), 0.5).unwrap();
        let expected = 0.2 * COLLISION_OVERLAP_FACTOR + COLLISION_BOUNCE;
        assert!((impulse.x - expected).abs() < 1e-6);
        assert_eq!(impulse.y, 0.0);
    }

    #[test]
    fn coincident_or_separate_shapes_get_no_impulse() {
        assert!(collision_impulse(Vec2::ONE, 0.5, Vec2::ONE, 0.5).is_none());
        assert!(collision_impulse(Vec2::ZERO, 0.5, Vec2::new(1.0, 0.0), 0.5).is_none());
    }

    #[test]
    fn collisions_only_every_second_tick() {
        let mut pool = pool(vec![archetype_at(-0.2, 0.0, 0.5), archetype_at(0.2, 0.0, 0.5)]);
        for body in pool.bodies.iter_mut() {
            body.velocity = Vec2::ZERO;
        }
        let mut registry = ShapeRegistry::default();
        pool.advance(0.0, 1.0 / 60.0, None, 1.0, &mut registry);
        assert_eq!(pool.bodies()[0].velocity, Vec2::ZERO);
        pool.advance(1.0 / 60.0, 1.0 / 60.0, None, 1.0, &mut registry);
        assert!(pool.bodies()[0].velocity.x < 0.0);
    }

    #[test]
    fn pointer_pulls_nearby_shapes_in() {
        let mut pool = pool(vec![archetype_at(1.0, 0.0, 0.5)]);
        pool.bodies[0].velocity = Vec2::ZERO;
        let mut registry = ShapeRegistry::default();
        // Pointer at NDC 0 → shape plane origin, 1 unit away.
        pool.advance(0.0, 1.0 / 60.0, Some(Vec2::ZERO), 1.0, &mut registry);
        let v = pool.bodies()[0].velocity;
        assert!(v.x < 0.0, "expected pull toward origin, got {v:?}");
        assert!((v.x + 2.0 * SHAPE_ATTRACT_STRENGTH * SHAPE_DAMPING).abs() < 1e-6);
    }

    #[test]
    fn broken_shape_sits_out_the_cooldown_then_respawns() {
        let mut pool = pool(vec![archetype_at(0.0, 0.0, 0.5)]);
        let mut registry = ShapeRegistry::default();
        let dt = 1.0 / 60.0;
        let mut t = 1.0;
        pool.advance(t, 1.0 / 60.0, None, 1.0, &mut registry);
        let before = pool.bodies()[0].velocity;

        assert!(pool.break_shape(0, t));
        assert!(!pool.break_shape(0, t), "double break is a no-op");

        while t + dt < 1.0 + BREAK_COOLDOWN_SECS {
            t += dt;
            pool.advance(t, 1.0 / 60.0, Some(Vec2::ZERO), 1.0, &mut registry);
            assert!(!pool.is_alive(0), "alive too early at t={t}");
            assert_eq!(pool.bodies()[0].velocity, before, "pointer pulled a broken shape");
            assert!(registry.iter_alive().next().is_none());
        }

        pool.advance(1.0 + BREAK_COOLDOWN_SECS + 0.01, 1.0 / 60.0, None, 1.0, &mut registry);
        let body = pool.bodies()[0];
        assert!(body.alive);
        assert_eq!(body.broken_until, None);
        // Back at the archetype origin, moved by exactly one tick of fresh velocity.
        assert!((body.position.truncate() - body.velocity / SHAPE_DAMPING).length() < 1e-6);
        assert_ne!(body.velocity, before);
        assert!(registry.get(0).is_some_and(|e| e.alive));
    }

    #[test]
    fn non_finite_delta_skips_the_tick() {
        let mut pool = pool(default_archetypes());
        let mut registry = ShapeRegistry::default();
        pool.advance(0.5, 1.0 / 60.0, None, 1.0, &mut registry);
        let before = pool.bodies().to_vec();

        pool.advance(0.6, f32::NAN, Some(Vec2::ZERO), 1.0, &mut registry);
        assert_eq!(pool.bodies(), before.as_slice());
        assert_eq!(registry.len(), before.len());
    }

    #[test]
    fn broken_shapes_are_not_obstacles() {
        let mut pool = pool(vec![archetype_at(-0.2, 0.0, 0.5), archetype_at(0.2, 0.0, 0.5)]);
        for body in pool.bodies.iter_mut() {
            body.velocity = Vec2::ZERO;
        }
        pool.break_shape(1, 0.0);
        pool.resolve_collisions();
        assert_eq!(pool.bodies()[0].velocity, Vec2::ZERO);
    }

    #[test]
    fn unknown_index_cannot_be_broken() {
        let mut pool = pool(default_archetypes());
        assert!(!pool.break_shape(17, 0.0));
        assert_eq!(pool.len(), 3);
    }
}
