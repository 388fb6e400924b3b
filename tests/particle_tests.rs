//! Particle System Tests
//!
//! Tests for:
//! - Spawn-rate integration with fractional carry
//! - Lifetime expiry and the max-particle cap
//! - Velocity/gravity integration
//! - Gradient evaluation (constant, linear, ramp) into instance data

use glam::{Vec3, Vec4};

use lumen::particles::{EmitterShape, Gradient, ParticleEmitter, ParticleSystem};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn quiet_emitter(rate: f32) -> ParticleEmitter {
    let mut emitter = ParticleEmitter::with_seed(Vec3::ZERO, 7);
    emitter.emission_rate = rate;
    emitter.gravity = Vec3::ZERO;
    emitter.velocity_randomness = 0.0;
    emitter
}

// ============================================================================
// Spawning
// ============================================================================

#[test]
fn spawn_count_is_rate_times_dt() {
    let mut emitter = quiet_emitter(100.0);
    emitter.update(0.1);
    assert_eq!(emitter.live_count(), 10);
}

#[test]
fn fractional_spawn_budget_carries_between_frames() {
    let mut emitter = quiet_emitter(10.0);
    // 10/s at 0.05s = 0.5 per frame: one spawn every second frame.
    emitter.update(0.05);
    assert_eq!(emitter.live_count(), 0);
    emitter.update(0.05);
    assert_eq!(emitter.live_count(), 1);
    emitter.update(0.05);
    assert_eq!(emitter.live_count(), 1);
    emitter.update(0.05);
    assert_eq!(emitter.live_count(), 2);
}

#[test]
fn max_particles_caps_the_pool() {
    let mut emitter = quiet_emitter(10_000.0);
    emitter.max_particles = 25;
    emitter.update(1.0);
    assert_eq!(emitter.live_count(), 25);
}

#[test]
fn particles_expire_after_their_lifetime() {
    let mut emitter = quiet_emitter(10.0);
    emitter.particle_lifetime = 0.5;
    emitter.update(1.0); // spawns 10
    assert_eq!(emitter.live_count(), 10);

    emitter.emission_rate = 0.0;
    emitter.update(0.6); // everyone ages past 0.5
    assert_eq!(emitter.live_count(), 0);
}

// ============================================================================
// Integration
// ============================================================================

#[test]
fn velocity_moves_particles_each_frame() {
    let mut emitter = quiet_emitter(1.0);
    emitter.emit_velocity = Vec3::new(2.0, 0.0, 0.0);
    emitter.update(1.0); // one particle at the origin

    emitter.emission_rate = 0.0;
    emitter.update(0.5);

    let instances = emitter.instances();
    assert_eq!(instances.len(), 1);
    assert!(approx(instances[0].position[0], 1.0), "x = v * dt");
}

#[test]
fn gravity_accelerates_velocity() {
    let mut emitter = quiet_emitter(1.0);
    emitter.gravity = Vec3::new(0.0, -10.0, 0.0);
    emitter.emit_velocity = Vec3::ZERO;
    emitter.particle_lifetime = 10.0;
    emitter.update(1.0); // spawn at rest

    emitter.emission_rate = 0.0;
    emitter.update(1.0); // v = -10 after this frame, moved 0
    emitter.update(1.0); // moved -10

    let instances = emitter.instances();
    assert!(approx(instances[0].position[1], -10.0));
}

#[test]
fn box_shape_offsets_spawn_positions_within_extents() {
    let mut emitter = quiet_emitter(1000.0);
    emitter.shape = EmitterShape::Box {
        extents: Vec3::new(2.0, 0.5, 1.0),
    };
    emitter.emit_velocity = Vec3::ZERO;
    emitter.update(0.1);

    assert!(emitter.live_count() > 0);
    for instance in emitter.instances() {
        assert!(instance.position[0].abs() <= 2.0 + EPSILON);
        assert!(instance.position[1].abs() <= 0.5 + EPSILON);
        assert!(instance.position[2].abs() <= 1.0 + EPSILON);
    }
}

// ============================================================================
// Gradients
// ============================================================================

#[test]
fn constant_gradient_always_returns_its_value() {
    let gradient = Gradient::Constant(3.5f32);
    assert!(approx(gradient.sample(0.0), 3.5));
    assert!(approx(gradient.sample(0.7), 3.5));
    assert!(approx(gradient.sample(1.0), 3.5));
}

#[test]
fn linear_gradient_interpolates_and_clamps() {
    let gradient = Gradient::Linear {
        from: 2.0f32,
        to: 4.0,
    };
    assert!(approx(gradient.sample(0.0), 2.0));
    assert!(approx(gradient.sample(0.5), 3.0));
    assert!(approx(gradient.sample(1.0), 4.0));
    assert!(approx(gradient.sample(5.0), 4.0), "clamps above 1");
}

#[test]
fn ramp_gradient_interpolates_between_keys() {
    let gradient = Gradient::Ramp(vec![(0.0, 0.0f32), (0.25, 1.0), (1.0, 0.0)]);
    assert!(approx(gradient.sample(0.125), 0.5));
    assert!(approx(gradient.sample(0.25), 1.0));
    assert!(approx(gradient.sample(0.625), 0.5));
}

#[test]
fn color_gradient_lands_in_instance_data() {
    let mut emitter = quiet_emitter(1.0);
    emitter.particle_lifetime = 1.0;
    emitter.color_over_lifetime = Some(Gradient::Linear {
        from: Vec4::new(1.0, 0.0, 0.0, 1.0),
        to: Vec4::new(0.0, 0.0, 1.0, 0.0),
    });
    emitter.update(1.0); // one particle at age 0

    emitter.emission_rate = 0.0;
    emitter.update(0.5); // t = 0.5

    let instances = emitter.instances();
    assert!(approx(instances[0].color[0], 0.5));
    assert!(approx(instances[0].color[2], 0.5));
    assert!(approx(instances[0].color[3], 0.5));
}

#[test]
fn size_gradient_shrinks_particles() {
    let mut emitter = quiet_emitter(1.0);
    emitter.particle_lifetime = 1.0;
    emitter.particle_size = 1.0;
    emitter.size_over_lifetime = Some(Gradient::Linear { from: 1.0, to: 0.0 });
    emitter.update(1.0);

    emitter.emission_rate = 0.0;
    emitter.update(0.25);

    let instances = emitter.instances();
    assert!(approx(instances[0].size, 0.75));
}

// ============================================================================
// System
// ============================================================================

#[test]
fn system_updates_every_emitter() {
    let mut system = ParticleSystem::new();
    system.add_emitter(quiet_emitter(10.0));
    system.add_emitter(quiet_emitter(20.0));

    system.update(1.0);
    assert_eq!(system.live_particles(), 30);
    assert_eq!(system.emitters().len(), 2);
}
