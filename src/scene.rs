//! Scene coordinator: owns the three sub-systems and the shape registry, and
//! turns one host frame into one [`RenderableFrame`].
//!
//! Update order is field → shapes → pilot.  The pilot scans the registry the
//! shapes just published, and any break requests it returns are applied to
//! the pool before the frame is built, so a shape hit this tick is already
//! gone from this tick's frame.

use crate::config::SceneConfig;
use crate::controls::{parse_hex_color, snap_speed, SceneToggles};
use crate::field::ParticleField;
use crate::pilot::{BreakRequest, Pilot, PilotInput, PilotMode};
use crate::quality::QualityTier;
use crate::shapes::{ShapeKind, ShapePool, ShapeRegistry};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Host input for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Scene time in seconds.
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Pointer in NDC (`[-1, 1]²`), `None` when nothing hovers the scene.
    pub pointer: Option<Vec2>,
    /// A click / key press happened since the last frame.
    pub fire: bool,
}

/// Particle buffer as the renderer should draw it.
#[derive(Debug, Clone, Copy)]
pub struct ParticleView<'a> {
    /// Flat `[x, y, z, …]` positions in field space.
    pub positions: &'a [f32],
    /// Whole-field rotation about X and Y.
    pub rotation: Vec2,
    pub color: Color,
}

/// One shape as the renderer should draw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeView {
    pub index: usize,
    pub kind: ShapeKind,
    /// Simulated position plus the idle bob.
    pub position: Vec3,
    pub rotation: Vec2,
    pub radius: f32,
    pub alive: bool,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PilotView {
    pub position: Vec3,
    pub facing: f32,
    pub mode: PilotMode,
}

/// Everything active this frame.  Disabled sub-systems are `None` / empty.
#[derive(Debug, Clone)]
pub struct RenderableFrame<'a> {
    pub particles: Option<ParticleView<'a>>,
    pub shapes: Vec<ShapeView>,
    pub pilot: Option<PilotView>,
    /// Pool indices broken during this tick.
    pub broken: Vec<usize>,
}

impl RenderableFrame<'_> {
    /// Shapes that should be drawn (broken ones are skipped).
    pub fn visible_shapes(&self) -> impl Iterator<Item = &ShapeView> {
        self.shapes.iter().filter(|s| s.alive)
    }
}

/// Owns the particle field, the shape pool, the pilot and the shape registry.
#[derive(Debug, Clone)]
pub struct SceneCoordinator {
    field: ParticleField,
    pool: ShapePool,
    pilot: Pilot,
    registry: ShapeRegistry,
    toggles: SceneToggles,
}

impl SceneCoordinator {
    /// Build a scene with an entropy-seeded RNG.
    pub fn new(config: &SceneConfig, tier: QualityTier) -> Self {
        Self::build(config, tier, &mut StdRng::from_entropy())
    }

    /// Build a reproducible scene.
    pub fn with_seed(config: &SceneConfig, tier: QualityTier, seed: u64) -> Self {
        Self::build(config, tier, &mut StdRng::seed_from_u64(seed))
    }

    /// An invalid `config` is logged and replaced by the defaults.
    fn build(config: &SceneConfig, tier: QualityTier, rng: &mut StdRng) -> Self {
        let fallback;
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("⚠ {e}; using the default scene config");
                fallback = SceneConfig::default();
                &fallback
            }
        };

        let archetypes = config.shape_archetypes().unwrap_or_else(|e| {
            warn!("⚠ {e}; starting without shapes");
            Vec::new()
        });

        let mut toggles = SceneToggles::default();
        match parse_hex_color(&config.particle_color) {
            Ok(color) => toggles.particle_color = color,
            Err(e) => warn!("⚠ {e}; keeping the default particle colour"),
        }
        toggles.speed_multiplier = snap_speed(config.speed_multiplier);

        let field = ParticleField::new(config.particle_count(tier), toggles.particle_color, rng)
            .with_update_interval(config.field_update_interval(tier));
        let pool = ShapePool::new(archetypes, config.shape_physics(), rng);
        let mut registry = ShapeRegistry::default();
        registry.publish(pool.bodies());

        Self {
            field,
            pool,
            pilot: Pilot::default(),
            registry,
            toggles,
        }
    }

    /// Advance every enabled sub-system by one frame.
    ///
    /// `toggles` replaces the stored configuration before anything runs.
    pub fn tick(&mut self, input: FrameInput, toggles: SceneToggles) -> RenderableFrame<'_> {
        self.toggles = toggles;
        let speed = toggles.speed_multiplier;

        if toggles.particles_enabled {
            self.field.set_color(toggles.particle_color);
            self.field.advance(input.elapsed, input.pointer, speed);
        }

        if toggles.shapes_enabled {
            self.pool.advance(
                input.elapsed,
                input.delta,
                input.pointer,
                speed,
                &mut self.registry,
            );
        }

        let mut broken = Vec::new();
        if toggles.pilot_enabled {
            let hidden = ShapeRegistry::default();
            let registry = if toggles.shapes_enabled {
                &self.registry
            } else {
                &hidden
            };
            let hits = self.pilot.update(
                PilotInput {
                    elapsed: input.elapsed,
                    delta: input.delta,
                    pointer: input.pointer,
                    fire: input.fire,
                    speed,
                },
                registry,
            );
            for BreakRequest { index } in hits {
                if self.pool.break_shape(index, input.elapsed) {
                    self.registry.mark_broken(index);
                    broken.push(index);
                }
            }
        }

        self.frame(broken)
    }

    /// Same as [`Self::tick`] with the stored toggles.
    pub fn advance(&mut self, input: FrameInput) -> RenderableFrame<'_> {
        self.tick(input, self.toggles)
    }

    /// The current frame without advancing anything.
    pub fn snapshot(&self) -> RenderableFrame<'_> {
        self.frame(Vec::new())
    }

    fn frame(&self, broken: Vec<usize>) -> RenderableFrame<'_> {
        let particles = self.toggles.particles_enabled.then(|| ParticleView {
            positions: self.field.positions(),
            rotation: self.field.rotation(),
            color: self.field.color(),
        });

        let shapes = if self.toggles.shapes_enabled {
            self.pool
                .bodies()
                .iter()
                .zip(self.pool.archetypes())
                .enumerate()
                .map(|(index, (body, archetype))| ShapeView {
                    index,
                    kind: archetype.kind,
                    position: body.render_position(),
                    rotation: body.rotation,
                    radius: body.radius,
                    alive: body.alive,
                    color: archetype.color,
                })
                .collect()
        } else {
            Vec::new()
        };

        let pilot = self.toggles.pilot_enabled.then(|| PilotView {
            position: self.pilot.world_position(),
            facing: self.pilot.facing,
            mode: self.pilot.mode,
        });

        RenderableFrame {
            particles,
            shapes,
            pilot,
            broken,
        }
    }

    // ── Toggles ──────────────────────────────────────────────────────────────

    pub fn toggles(&self) -> SceneToggles {
        self.toggles
    }

    pub fn set_particles_enabled(&mut self, enabled: bool) {
        self.toggles.particles_enabled = enabled;
    }

    pub fn set_shapes_enabled(&mut self, enabled: bool) {
        self.toggles.shapes_enabled = enabled;
    }

    pub fn set_pilot_enabled(&mut self, enabled: bool) {
        self.toggles.pilot_enabled = enabled;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.toggles.set_speed(speed);
    }

    pub fn set_particle_color(&mut self, color: Color) {
        self.toggles.particle_color = color;
    }

    // ── Read access ──────────────────────────────────────────────────────────

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn pool(&self) -> &ShapePool {
        &self.pool
    }

    pub fn pilot(&self) -> &Pilot {
        &self.pilot
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }
}
