//! Pilot behaviour: target smoothing, the Follow / Orbit / Fire state machine,
//! steering, and dash hit scans.
//!
//! ## Transitions (evaluated once per tick, in this order)
//!
//! | From   | To     | Guard                                                   |
//! |--------|--------|---------------------------------------------------------|
//! | any    | Fire   | fire trigger and no dash in progress                    |
//! | Fire   | Follow | 0.5 s since the dash started                            |
//! | Follow | Orbit  | pointer within 0.05 of its idle anchor for ≥ 0.5 s      |
//! | Orbit  | Follow | pointer moved ≥ 0.05 away from the idle anchor          |
//!
//! The idle timer is frozen at zero during a dash so a dash always hands
//! back to Follow, never straight to Orbit.

use super::state::{BreakRequest, Pilot, PilotInput, PilotMode};
use crate::constants::*;
use crate::shapes::ShapeRegistry;
use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

impl Pilot {
    /// Advance one tick and return the shapes hit by a dash this tick.
    ///
    /// Non-finite timing input skips the tick entirely.
    pub fn update(&mut self, input: PilotInput, registry: &ShapeRegistry) -> Vec<BreakRequest> {
        let PilotInput {
            elapsed,
            delta,
            pointer,
            fire,
            speed,
        } = input;
        if !(elapsed.is_finite() && delta.is_finite() && speed.is_finite()) {
            return Vec::new();
        }
        let delta = delta.max(0.0);
        let frame_scale = delta * REFERENCE_FPS;

        let pointer_target = pointer
            .filter(|p| p.is_finite())
            .map(|p| p * PILOT_POINTER_SCALE);
        if let Some(raw) = pointer_target {
            self.target += (raw - self.target) * TARGET_SMOOTHING;
        }

        if fire && !self.fire_active(elapsed) {
            self.start_fire(elapsed);
        }

        let previous = self.mode;
        if self.fire_active(elapsed) {
            self.mode = PilotMode::Fire;
            self.idle_secs = 0.0;
            if pointer_target.is_some() {
                self.idle_anchor = pointer_target;
            }
        } else {
            self.fire_started_at = None;
            self.track_idle(pointer_target, delta);
            self.mode = if self.idle_secs >= IDLE_ORBIT_SECS {
                PilotMode::Orbit
            } else {
                PilotMode::Follow
            };
        }

        match self.mode {
            PilotMode::Follow => self.follow(frame_scale, speed),
            PilotMode::Orbit => {
                if previous != PilotMode::Orbit {
                    self.enter_orbit();
                }
                self.orbit(delta, frame_scale, speed);
            }
            PilotMode::Fire => {
                self.position += self.velocity * frame_scale * speed;
            }
        }

        self.turn_toward_heading();

        if self.mode == PilotMode::Fire {
            self.scan_hits(elapsed, registry)
        } else {
            Vec::new()
        }
    }

    /// Start a dash toward the target (or straight ahead when on top of it).
    fn start_fire(&mut self, elapsed: f32) {
        let dir = (self.target - self.position)
            .try_normalize()
            .unwrap_or_else(|| Vec2::from_angle(self.facing));
        self.velocity = dir * FIRE_SPEED;
        self.fire_started_at = Some(elapsed);
        self.last_hit_scan = None;
    }

    /// Reset the idle timer when the pointer leaves the anchor, else accumulate.
    ///
    /// An absent pointer counts as resting.
    fn track_idle(&mut self, pointer_target: Option<Vec2>, delta: f32) {
        match pointer_target {
            Some(p)
                if self
                    .idle_anchor
                    .map_or(true, |anchor| anchor.distance(p) >= IDLE_DISTANCE) =>
            {
                self.idle_anchor = Some(p);
                self.idle_secs = 0.0;
            }
            _ => self.idle_secs += delta,
        }
    }

    fn follow(&mut self, frame_scale: f32, speed: f32) {
        let offset = self.target - self.position;
        self.velocity = offset * FOLLOW_GAIN * speed;
        let k = (FOLLOW_GAIN * speed * frame_scale).clamp(0.0, 1.0);
        self.position += offset * k;
    }

    /// Pick up the circle at the angle the pilot already sits at.
    fn enter_orbit(&mut self) {
        let offset = self.position - self.target;
        self.orbit_angle = if offset.length_squared() > 1e-6 {
            offset.y.atan2(offset.x)
        } else {
            self.facing
        };
    }

    fn orbit(&mut self, delta: f32, frame_scale: f32, speed: f32) {
        self.orbit_angle = (self.orbit_angle + ORBIT_RATE * delta * speed).rem_euclid(TAU);
        let desired = self.target + Vec2::from_angle(self.orbit_angle) * ORBIT_RADIUS;
        let offset = desired - self.position;
        self.velocity = offset * ORBIT_EASE;
        let k = (ORBIT_EASE * frame_scale).clamp(0.0, 1.0);
        self.position += offset * k;
    }

    fn turn_toward_heading(&mut self) {
        if self.velocity.length_squared() <= 1e-8 {
            return;
        }
        let heading = self.velocity.y.atan2(self.velocity.x);
        self.facing = wrap_angle(self.facing + shortest_angle(self.facing, heading) * FACING_BLEND);
    }

    /// Alive shapes within `radius + PILOT_HIT_RADIUS`, at most once per
    /// `HIT_SCAN_INTERVAL_SECS`.
    fn scan_hits(&mut self, elapsed: f32, registry: &ShapeRegistry) -> Vec<BreakRequest> {
        if self
            .last_hit_scan
            .is_some_and(|last| elapsed - last < HIT_SCAN_INTERVAL_SECS)
        {
            return Vec::new();
        }
        self.last_hit_scan = Some(elapsed);

        registry
            .iter_alive()
            .filter(|(_, entry)| {
                let reach = entry.radius + PILOT_HIT_RADIUS;
                entry.position.distance_squared(self.position) < reach * reach
            })
            .map(|(index, _)| BreakRequest { index })
            .collect()
    }
}

/// Signed smallest rotation taking `from` to `to`, in `[-π, π)`.
pub fn shortest_angle(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Wrap an angle into `[-π, π)`.
pub fn wrap_angle(angle: f32) -> f32 {
    // rem_euclid can round a tiny negative up to exactly TAU.
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped >= PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeBody;

    const DT: f32 = 1.0 / 60.0;

    struct Driver {
        pilot: Pilot,
        registry: ShapeRegistry,
        t: f32,
    }

    impl Driver {
        fn new() -> Self {
            Self {
                pilot: Pilot::default(),
                registry: ShapeRegistry::default(),
                t: 0.0,
            }
        }

        fn step(&mut self, pointer: Option<Vec2>, fire: bool) -> Vec<BreakRequest> {
            self.t += DT;
            self.pilot.update(
                PilotInput {
                    elapsed: self.t,
                    delta: DT,
                    pointer,
                    fire,
                    speed: 1.0,
                },
                &self.registry,
            )
        }
    }

    fn shape_at(x: f32, y: f32, radius: f32) -> ShapeBody {
        ShapeBody {
            position: Vec3::new(x, y, -2.0),
            velocity: Vec2::ZERO,
            radius,
            alive: true,
            broken_until: None,
            rotation: Vec2::ZERO,
            float_offset: 0.0,
        }
    }

    #[test]
    fn resting_pointer_leads_to_orbit_and_movement_breaks_it() {
        let mut d = Driver::new();
        let pointer = Some(Vec2::new(0.2, 0.1));
        for _ in 0..20 {
            d.step(pointer, false);
            assert_eq!(d.pilot.mode, PilotMode::Follow);
        }
        for _ in 0..20 {
            d.step(pointer, false);
        }
        assert_eq!(d.pilot.mode, PilotMode::Orbit);

        d.step(Some(Vec2::new(0.3, 0.1)), false);
        assert_eq!(d.pilot.mode, PilotMode::Follow);
    }

    #[test]
    fn orbit_starts_after_half_a_second() {
        let mut d = Driver::new();
        let pointer = Some(Vec2::new(-0.4, 0.4));
        let mut ticks = 0;
        while d.pilot.mode != PilotMode::Orbit {
            d.step(pointer, false);
            ticks += 1;
            assert!(ticks < 100, "never started orbiting");
        }
        // First tick anchors the pointer; 30 more reach 0.5 s.
        assert!((30..=32).contains(&ticks), "orbit after {ticks} ticks");
    }

    #[test]
    fn orbit_settles_on_the_radius() {
        let mut d = Driver::new();
        let pointer = Some(Vec2::new(0.1, -0.2));
        for _ in 0..600 {
            d.step(pointer, false);
        }
        assert_eq!(d.pilot.mode, PilotMode::Orbit);
        let r = d.pilot.position.distance(d.pilot.target);
        assert!((r - ORBIT_RADIUS).abs() < 0.1, "orbit radius {r}");
    }

    #[test]
    fn missing_pointer_counts_as_idle() {
        let mut d = Driver::new();
        for _ in 0..40 {
            d.step(None, false);
        }
        assert_eq!(d.pilot.mode, PilotMode::Orbit);
    }

    #[test]
    fn follow_closes_in_on_the_pointer() {
        let mut d = Driver::new();
        let pointer = Some(Vec2::new(0.6, -0.6));
        let start = Vec2::new(3.0, -3.0).distance(d.pilot.position);
        for _ in 0..25 {
            d.step(pointer, false);
        }
        assert_eq!(d.pilot.mode, PilotMode::Follow);
        assert!(Vec2::new(3.0, -3.0).distance(d.pilot.position) < start * 0.5);
        // Heading turns toward lower right.
        assert!(d.pilot.facing < 0.0);
    }

    #[test]
    fn fire_lasts_half_a_second_despite_repeats() {
        let mut d = Driver::new();
        let pointer = Some(Vec2::new(0.5, 0.0));
        d.step(pointer, false);

        let mut fire_ticks = 0;
        for i in 0..50 {
            // Keep hammering the trigger for most of the window.
            d.step(pointer, i < 25);
            if d.pilot.mode == PilotMode::Fire {
                fire_ticks += 1;
            }
        }
        assert!((29..=31).contains(&fire_ticks), "fire for {fire_ticks} ticks");
        assert_eq!(d.pilot.mode, PilotMode::Follow);
    }

    #[test]
    fn dash_hands_back_to_follow_even_when_idle() {
        let mut d = Driver::new();
        for _ in 0..40 {
            d.step(None, false);
        }
        assert_eq!(d.pilot.mode, PilotMode::Orbit);
        d.step(None, true);
        assert_eq!(d.pilot.mode, PilotMode::Fire);
        for _ in 0..31 {
            d.step(None, false);
        }
        assert_eq!(d.pilot.mode, PilotMode::Follow);
    }

    #[test]
    fn dash_breaks_shapes_in_reach() {
        let mut d = Driver::new();
        d.registry
            .publish(&[shape_at(0.5, 0.0, 0.4), shape_at(4.0, 4.0, 0.4)]);
        let hits = d.step(Some(Vec2::new(1.0, 0.0)), true);
        assert_eq!(hits, vec![BreakRequest { index: 0 }]);
    }

    #[test]
    fn hit_scans_are_throttled() {
        let mut d = Driver::new();
        d.registry.publish(&[shape_at(0.2, 0.0, 0.5)]);
        let first = d.step(Some(Vec2::new(1.0, 0.0)), true);
        assert_eq!(first.len(), 1);
        // One frame later the shape is still in reach, but the scan is not due.
        let second = d.step(Some(Vec2::new(1.0, 0.0)), false);
        assert!(second.is_empty());
    }

    #[test]
    fn no_hits_outside_fire() {
        let mut d = Driver::new();
        d.registry.publish(&[shape_at(0.0, 0.0, 0.5)]);
        for _ in 0..10 {
            assert!(d.step(Some(Vec2::ZERO), false).is_empty());
        }
    }

    #[test]
    fn non_finite_time_is_ignored() {
        let mut pilot = Pilot::default();
        let before = pilot.clone();
        let hits = pilot.update(
            PilotInput {
                elapsed: f32::NAN,
                delta: DT,
                pointer: Some(Vec2::ONE),
                fire: true,
                speed: 1.0,
            },
            &ShapeRegistry::default(),
        );
        assert!(hits.is_empty());
        assert_eq!(pilot, before);
    }

    #[test]
    fn shortest_angle_wraps_through_pi() {
        assert!((shortest_angle(3.0, -3.0) - (TAU - 6.0)).abs() < 1e-5);
        assert!((shortest_angle(-3.0, 3.0) + (TAU - 6.0)).abs() < 1e-5);
        assert!((shortest_angle(0.0, 1.0) - 1.0).abs() < 1e-6);
        assert!((wrap_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert_eq!(wrap_angle(-PI), -PI);
        assert!(wrap_angle(PI) < 0.0, "π wraps to -π");
        assert!(wrap_angle(-PI - 1e-8) < PI);
    }

    #[test]
    fn facing_stays_in_the_half_open_range() {
        let mut d = Driver::new();
        let pointers = [Vec2::new(-1.0, 0.01), Vec2::new(-1.0, -0.01), Vec2::new(1.0, 0.0)];
        for pointer in pointers.iter().cycle().take(300) {
            d.step(Some(*pointer), false);
            assert!((-PI..PI).contains(&d.pilot.facing), "facing {}", d.pilot.facing);
        }
    }
}
