use glam::DVec2;

use crate::draw::{Color, DrawList};

/// Maximum concurrent particles. Spawns past this are dropped.
pub const MAX_PARTICLES: usize = 5000;

/// A single decorative particle shed by an organism.
#[derive(Debug, Clone, Copy)]
struct Particle {
    pos: DVec2,
    vel: DVec2,
    age: f64,
    max_age: f64,
    initial_size: f64,
    initial_alpha: f64,
    color: Color,
}

/// Spawn parameters supplied by organisms.
#[derive(Debug, Clone, Copy)]
pub struct ParticleSpawn {
    pub pos: DVec2,
    /// Units per second.
    pub vel: DVec2,
    pub size: f64,
    pub color: Color,
    pub alpha: f64,
    /// Lifetime in seconds.
    pub max_age: f64,
}

/// Particle system for organism trails and death bursts.
pub struct ParticleSystem {
    particles: Vec<Particle>,
    capacity: usize,
    pub enabled: bool,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::with_capacity(MAX_PARTICLES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            enabled: true,
        }
    }

    /// Add a particle. Returns false when disabled or at capacity.
    pub fn spawn(&mut self, spawn: ParticleSpawn) -> bool {
        if !self.enabled || self.particles.len() >= self.capacity {
            return false;
        }
        self.particles.push(Particle {
            pos: spawn.pos,
            vel: spawn.vel,
            age: 0.0,
            max_age: spawn.max_age.max(f64::EPSILON),
            initial_size: spawn.size,
            initial_alpha: spawn.alpha,
            color: spawn.color,
        });
        true
    }

    /// Update all particles: move, age, remove dead.
    pub fn update(&mut self, dt: f64) {
        // Update in-place, swap-remove dead ones
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            p.pos += p.vel * dt;
            p.age += dt;

            if p.age >= p.max_age {
                self.particles.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Append particle circles to the draw list. Particles shrink and fade to
    /// half their initial size/alpha over their lifetime.
    pub fn draw(&self, draw: &mut DrawList) {
        for p in &self.particles {
            let life = (1.0 - p.age / p.max_age).clamp(0.0, 1.0) * 0.5 + 0.5;
            draw.circle(p.pos, p.initial_size * life);
            draw.fill(p.color, p.initial_alpha * life);
        }
    }

    /// Number of active particles.
    pub fn count(&self) -> usize {
        self.particles.len()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}
