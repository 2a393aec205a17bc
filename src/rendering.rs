//! Immediate-mode drawing of the scene with Bevy gizmos.
//!
//! Nothing here mutates simulation state: every frame reads
//! [`SceneCoordinator::snapshot`](crate::scene::SceneCoordinator::snapshot)
//! and redraws from scratch.

use crate::pilot::PilotMode;
use crate::plugin::{scene_tick_system, SceneState};
use crate::scene::{ParticleView, PilotView, ShapeView};
use crate::shapes::ShapeKind;
use bevy::math::Isometry3d;
use bevy::prelude::*;

/// Half-length of a particle's cross marker.
const PARTICLE_MARK: f32 = 0.02;
const PARTICLE_ALPHA: f32 = 0.6;
/// Length of the pilot's arrow from tail to nose.
const PILOT_LENGTH: f32 = 0.4;

pub struct SceneRenderPlugin;

impl Plugin for SceneRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera)
            .add_systems(Update, scene_gizmo_system.after(scene_tick_system));
    }
}

/// Perspective camera five units back, looking at the origin.
fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 75.0_f32.to_radians(),
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

pub fn scene_gizmo_system(mut gizmos: Gizmos, scene: Option<Res<SceneState>>) {
    let Some(scene) = scene else {
        return;
    };
    let frame = scene.0.snapshot();

    if let Some(particles) = &frame.particles {
        draw_particles(&mut gizmos, particles);
    }
    for shape in frame.visible_shapes() {
        draw_shape(&mut gizmos, shape);
    }
    if let Some(pilot) = &frame.pilot {
        draw_pilot(&mut gizmos, pilot);
    }
}

/// Orientation of the whole particle cloud.
pub fn field_rotation(rotation: Vec2) -> Quat {
    Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, 0.0)
}

fn draw_particles(gizmos: &mut Gizmos, particles: &ParticleView) {
    let rotation = field_rotation(particles.rotation);
    let color = particles.color.with_alpha(PARTICLE_ALPHA);
    for p in particles.positions.chunks_exact(3) {
        let center = rotation * Vec3::new(p[0], p[1], p[2]);
        gizmos.line(
            center - Vec3::X * PARTICLE_MARK,
            center + Vec3::X * PARTICLE_MARK,
            color,
        );
        gizmos.line(
            center - Vec3::Y * PARTICLE_MARK,
            center + Vec3::Y * PARTICLE_MARK,
            color,
        );
    }
}

fn draw_shape(gizmos: &mut Gizmos, shape: &ShapeView) {
    let rotation = Quat::from_euler(EulerRot::XYZ, shape.rotation.x, shape.rotation.y, 0.0);
    let isometry = Isometry3d::new(shape.position, rotation);
    match shape.kind {
        ShapeKind::Icosahedron => {
            gizmos
                .sphere(isometry, shape.radius, shape.color)
                .resolution(6);
        }
        ShapeKind::Torus => {
            gizmos.circle(isometry, shape.radius, shape.color);
            gizmos.circle(isometry, shape.radius * 0.6, shape.color);
        }
        ShapeKind::Octahedron => {
            for (a, b) in octahedron_edges(shape.radius) {
                gizmos.line(
                    shape.position + rotation * a,
                    shape.position + rotation * b,
                    shape.color,
                );
            }
        }
    }
}

/// The twelve edges of an octahedron with its vertices on the axes.
fn octahedron_edges(radius: f32) -> [(Vec3, Vec3); 12] {
    let ring = [Vec3::X, Vec3::Y, Vec3::NEG_X, Vec3::NEG_Y].map(|v| v * radius);
    let top = Vec3::Z * radius;
    let bottom = Vec3::NEG_Z * radius;
    let mut edges = [(Vec3::ZERO, Vec3::ZERO); 12];
    for i in 0..4 {
        let next = ring[(i + 1) % 4];
        edges[i] = (ring[i], next);
        edges[4 + i] = (ring[i], top);
        edges[8 + i] = (ring[i], bottom);
    }
    edges
}

fn draw_pilot(gizmos: &mut Gizmos, pilot: &PilotView) {
    let heading = Vec2::from_angle(pilot.facing).extend(0.0);
    let tail = pilot.position - heading * (PILOT_LENGTH * 0.4);
    let nose = pilot.position + heading * (PILOT_LENGTH * 0.6);
    let color = match pilot.mode {
        PilotMode::Follow => Color::WHITE,
        PilotMode::Orbit => Color::srgb(0.0, 0.83, 1.0),
        PilotMode::Fire => Color::srgb(1.0, 0.42, 0.21),
    };
    gizmos.arrow(tail, nose, color);
}
