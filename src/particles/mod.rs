//! GPU Particle System
//!
//! Emitters integrate particles on the CPU (position, velocity, age) and
//! evaluate lifetime gradients once per particle per frame; the GPU receives
//! only the final per-instance attributes and renders every emitter as a
//! single instanced billboard draw.

pub mod emitter;
pub mod gradient;

pub use emitter::{EmitterShape, ParticleEmitter};
pub use gradient::Gradient;

use bytemuck::{Pod, Zeroable};

/// Per-instance attributes handed to the billboard vertex shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
    pub rotation: f32,
    pub _pad: [f32; 3],
}

/// All emitters of one scene.
#[derive(Default)]
pub struct ParticleSystem {
    emitters: Vec<ParticleEmitter>,
}

impl ParticleSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_emitter(&mut self, emitter: ParticleEmitter) -> usize {
        self.emitters.push(emitter);
        self.emitters.len() - 1
    }

    #[must_use]
    pub fn emitters(&self) -> &[ParticleEmitter] {
        &self.emitters
    }

    pub fn emitters_mut(&mut self) -> &mut [ParticleEmitter] {
        &mut self.emitters
    }

    /// Advances every emitter by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        for emitter in &mut self.emitters {
            emitter.update(dt);
        }
    }

    /// Total live particle count across emitters.
    #[must_use]
    pub fn live_particles(&self) -> usize {
        self.emitters.iter().map(ParticleEmitter::live_count).sum()
    }
}
