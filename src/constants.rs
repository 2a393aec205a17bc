//! Centralised scene constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place.  [`crate::config::SceneConfig`] mirrors the ones
//! that are worth overriding at runtime through `assets/scene.toml`.

// ── Particle Field ────────────────────────────────────────────────────────────

/// Particle count on devices detected as capable.
pub const PARTICLE_COUNT_HIGH: usize = 400;

/// Particle count on constrained devices (or when detection fails).
pub const PARTICLE_COUNT_CONSTRAINED: usize = 150;

/// Full width / height / depth of the box particle origins are scattered in.
pub const FIELD_SPREAD_X: f32 = 12.0;
pub const FIELD_SPREAD_Y: f32 = 12.0;
pub const FIELD_SPREAD_Z: f32 = 8.0;

/// Pointer NDC → field space scale used for the repulsion term.
pub const FIELD_POINTER_SCALE: f32 = 2.0;

/// Amplitude of the per-axis ambient drift sinusoid.
pub const FIELD_DRIFT_AMPLITUDE: f32 = 0.1;

/// Repulsion is active while the Manhattan distance to the pointer is below this.
pub const FIELD_REPULSION_REACH: f32 = 3.0;

/// Repulsion strength per unit of remaining reach.
pub const FIELD_REPULSION_STRENGTH: f32 = 0.15;

/// Field rotation rates (rad per second of scaled time) about X and Y.
pub const FIELD_ROTATION_RATE_X: f32 = 0.03;
pub const FIELD_ROTATION_RATE_Y: f32 = 0.05;

/// Largest particle count a configuration may ask for.
pub const MAX_PARTICLE_COUNT: usize = 20_000;

/// Rewrite the particle buffer once every N ticks.
pub const FIELD_UPDATE_INTERVAL_HIGH: u32 = 2;
pub const FIELD_UPDATE_INTERVAL_CONSTRAINED: u32 = 3;

// ── Shape Pool ────────────────────────────────────────────────────────────────

/// Pointer NDC → shape plane scale.
pub const SHAPE_POINTER_SCALE: f32 = 5.0;

/// Squared radius inside which a shape feels the pointer.
pub const SHAPE_ATTRACT_RADIUS_SQ: f32 = 9.0;

/// Attraction reach (sqrt of [`SHAPE_ATTRACT_RADIUS_SQ`]).
pub const SHAPE_ATTRACT_REACH: f32 = 3.0;

/// Velocity nudge per unit of remaining reach.
pub const SHAPE_ATTRACT_STRENGTH: f32 = 0.01;

/// Pairwise collisions are resolved once every N ticks.
pub const COLLISION_TICK_INTERVAL: u64 = 2;

/// Share of the overlap converted into separating velocity.
pub const COLLISION_OVERLAP_FACTOR: f32 = 0.5;

/// Flat bounce added to every collision impulse.
pub const COLLISION_BOUNCE: f32 = 0.02;

/// Floor applied to separation distances before dividing by them.
pub const MIN_SEPARATION: f32 = 1e-4;

/// Half-extent of the square box shapes bounce inside.
pub const BOUNDS_HALF_EXTENT: f32 = 5.0;

/// Velocity kept (and reflected) on a wall bounce.
pub const WALL_RESTITUTION: f32 = 0.8;

/// Per-tick velocity damping.
pub const SHAPE_DAMPING: f32 = 0.98;

/// Cosmetic spin rates about X and Y.
pub const SHAPE_SPIN_RATE_X: f32 = 0.15;
pub const SHAPE_SPIN_RATE_Y: f32 = 0.2;

/// Spawn velocity range, per axis, in units per tick.
pub const SPAWN_VELOCITY_RANGE: f32 = 0.02;

/// Seconds a broken shape stays out of the scene.
pub const BREAK_COOLDOWN_SECS: f32 = 2.0;

/// Default vertical float amplitude and frequency.
pub const FLOAT_AMPLITUDE: f32 = 0.3;
pub const FLOAT_FREQUENCY: f32 = 0.5;

// ── Pilot ─────────────────────────────────────────────────────────────────────

/// Depth the pilot flies at (between the shapes' planes).
pub const PILOT_DEPTH: f32 = -2.5;

/// Pointer NDC → pilot plane scale (same plane as the shapes).
pub const PILOT_POINTER_SCALE: f32 = 5.0;

/// Exponential smoothing applied to the pointer target every tick.
pub const TARGET_SMOOTHING: f32 = 0.2;

/// Fraction of the remaining distance covered per 60 Hz frame in Follow.
pub const FOLLOW_GAIN: f32 = 0.08;

/// Facing blend weight per tick.
pub const FACING_BLEND: f32 = 0.15;

/// Pointer movement below this keeps the idle timer running.
pub const IDLE_DISTANCE: f32 = 0.05;

/// Idle time before the pilot starts orbiting.
pub const IDLE_ORBIT_SECS: f32 = 0.5;

/// Orbit radius around the target and angular rate (rad/s).
pub const ORBIT_RADIUS: f32 = 1.5;
pub const ORBIT_RATE: f32 = 1.2;

/// How quickly the pilot eases onto the orbit circle per 60 Hz frame.
pub const ORBIT_EASE: f32 = 0.1;

/// Length of a fire dash.
pub const FIRE_DURATION_SECS: f32 = 0.5;

/// Dash speed in units per 60 Hz frame.
pub const FIRE_SPEED: f32 = 0.25;

/// Extra reach added to each shape radius for dash hits.
pub const PILOT_HIT_RADIUS: f32 = 0.3;

/// Minimum scene time between two dash hit scans.
pub const HIT_SCAN_INTERVAL_SECS: f32 = 0.05;

/// Reference frame rate used to normalise per-frame gains.
pub const REFERENCE_FPS: f32 = 60.0;

// ── Controls ──────────────────────────────────────────────────────────────────

/// Speed multiplier slider bounds and step.
pub const SPEED_MIN: f32 = 0.5;
pub const SPEED_MAX: f32 = 3.0;
pub const SPEED_STEP: f32 = 0.5;

/// Default particle colour (orange).
pub const DEFAULT_PARTICLE_COLOR: &str = "#FF6B35";
