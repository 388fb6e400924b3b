use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::particles::gradient::Gradient;
use crate::particles::ParticleInstance;

/// Shape of the random emission direction (and, for boxes, spawn offset).
#[derive(Debug, Clone, Copy)]
pub enum EmitterShape {
    /// All particles start at the emitter position.
    Point,
    /// Directions within a cone of the given half-angle (radians) around
    /// the emit velocity.
    Cone { angle: f32 },
    /// Uniform directions on the unit sphere.
    Sphere,
    /// Spawn positions jittered inside a box of the given half-extents.
    Box { extents: Vec3 },
}

#[derive(Debug, Clone)]
struct Particle {
    position: Vec3,
    velocity: Vec3,
    age: f32,
    lifetime: f32,
    rotation: f32,
    color: Vec4,
    size: f32,
}

/// A single particle emitter.
///
/// [`update`](Self::update) integrates live particles and spawns new ones
/// at `emission_rate` per second, carrying the fractional remainder between
/// frames so low rates still emit.
pub struct ParticleEmitter {
    pub position: Vec3,
    /// Particles spawned per second
    pub emission_rate: f32,
    pub max_particles: usize,
    pub particle_lifetime: f32,
    pub particle_size: f32,
    pub emit_velocity: Vec3,
    /// Blend factor in `[0, 1]` between the emit velocity and a random
    /// shape direction
    pub velocity_randomness: f32,
    pub color: Vec4,
    pub gravity: Vec3,
    pub shape: EmitterShape,

    pub color_over_lifetime: Option<Gradient<Vec4>>,
    pub size_over_lifetime: Option<Gradient<f32>>,

    particles: Vec<Particle>,
    spawn_carry: f32,
    rng: StdRng,
}

impl ParticleEmitter {
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            emission_rate: 10.0,
            max_particles: 1000,
            particle_lifetime: 2.0,
            particle_size: 0.1,
            emit_velocity: Vec3::Y,
            velocity_randomness: 0.2,
            color: Vec4::ONE,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            shape: EmitterShape::Point,
            color_over_lifetime: None,
            size_over_lifetime: None,
            particles: Vec::new(),
            spawn_carry: 0.0,
            rng: rand::make_rng(),
        }
    }

    /// Deterministic emitter for tests.
    #[must_use]
    pub fn with_seed(position: Vec3, seed: u64) -> Self {
        let mut emitter = Self::new(position);
        emitter.rng = StdRng::seed_from_u64(seed);
        emitter
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    /// Integrates live particles, drops the dead, spawns new ones and
    /// re-evaluates lifetime gradients.
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        for p in &mut self.particles {
            p.position += p.velocity * dt;
            p.velocity += self.gravity * dt;
            p.age += dt;
        }
        self.particles.retain(|p| p.age < p.lifetime);

        self.spawn(dt);

        // Gradient evaluation happens once per particle per frame; the GPU
        // receives final color and size.
        for p in &mut self.particles {
            let t = p.age / p.lifetime;
            p.color = self
                .color_over_lifetime
                .as_ref()
                .map_or(self.color, |g| g.sample(t));
            p.size = self
                .size_over_lifetime
                .as_ref()
                .map_or(self.particle_size, |g| g.sample(t));
        }
    }

    fn spawn(&mut self, dt: f32) {
        let budget = self.emission_rate * dt + self.spawn_carry;
        let mut count = budget.floor() as usize;
        self.spawn_carry = budget.fract();

        count = count.min(self.max_particles.saturating_sub(self.particles.len()));

        for _ in 0..count {
            let (offset, random_dir) = self.sample_shape();
            let speed = self.emit_velocity.length().max(1.0);
            let randomness = self.velocity_randomness.clamp(0.0, 1.0);
            let velocity =
                self.emit_velocity * (1.0 - randomness) + random_dir * speed * randomness;

            self.particles.push(Particle {
                position: self.position + offset,
                velocity,
                age: 0.0,
                lifetime: self.particle_lifetime,
                rotation: self.rng.random_range(0.0..std::f32::consts::TAU),
                color: self.color,
                size: self.particle_size,
            });
        }
    }

    /// Returns `(spawn offset, random direction)` for the emitter shape.
    fn sample_shape(&mut self) -> (Vec3, Vec3) {
        match self.shape {
            EmitterShape::Point => (Vec3::ZERO, self.random_unit_vector()),
            EmitterShape::Sphere => {
                let dir = self.random_unit_vector();
                (Vec3::ZERO, dir)
            }
            EmitterShape::Cone { angle } => {
                let axis = self.emit_velocity.normalize_or(Vec3::Y);
                (Vec3::ZERO, self.random_cone_direction(axis, angle))
            }
            EmitterShape::Box { extents } => {
                let offset = Vec3::new(
                    self.rng.random_range(-1.0..1.0) * extents.x,
                    self.rng.random_range(-1.0..1.0) * extents.y,
                    self.rng.random_range(-1.0..1.0) * extents.z,
                );
                (offset, self.random_unit_vector())
            }
        }
    }

    fn random_unit_vector(&mut self) -> Vec3 {
        // Rejection sampling stays uniform over the sphere.
        loop {
            let v = Vec3::new(
                self.rng.random_range(-1.0..1.0),
                self.rng.random_range(-1.0..1.0),
                self.rng.random_range(-1.0..1.0),
            );
            let len_sq = v.length_squared();
            if len_sq > 1e-4 && len_sq <= 1.0 {
                return v / len_sq.sqrt();
            }
        }
    }

    fn random_cone_direction(&mut self, axis: Vec3, half_angle: f32) -> Vec3 {
        let cos_limit = half_angle.clamp(0.0, std::f32::consts::PI).cos();
        let cos_theta = self.rng.random_range(cos_limit..=1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = self.rng.random_range(0.0..std::f32::consts::TAU);

        // Orthonormal basis around the axis
        let tangent = axis.any_orthonormal_vector();
        let bitangent = axis.cross(tangent);

        (axis * cos_theta + tangent * (sin_theta * phi.cos()) + bitangent * (sin_theta * phi.sin()))
            .normalize_or(axis)
    }

    /// Builds the per-instance attribute list for the billboard draw.
    #[must_use]
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.particles
            .iter()
            .map(|p| ParticleInstance {
                position: p.position.to_array(),
                size: p.size,
                color: p.color.to_array(),
                rotation: p.rotation,
                _pad: [0.0; 3],
            })
            .collect()
    }
}
