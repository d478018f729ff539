use glam::DVec2;

use crate::organism::OrganismId;
use crate::particles::ParticleSystem;
use crate::spatial::SpatialIndex;

/// Hands out unique organism ids for the lifetime of a simulation.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> OrganismId {
        let id = OrganismId(self.next);
        self.next += 1;
        id
    }
}

/// What ecosystem code needs to know about the player this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSnapshot {
    pub position: DVec2,
    pub size: f64,
    pub level: u32,
}

/// Shared per-tick collaborators, passed explicitly into every update.
pub struct WorldContext<'a> {
    pub spatial: &'a mut dyn SpatialIndex,
    pub particles: &'a mut ParticleSystem,
    pub rng: &'a mut fastrand::Rng,
    pub ids: &'a mut IdAllocator,
    pub player: PlayerSnapshot,
    pub zoom: f64,
}

impl PlayerSnapshot {
    pub fn at(position: DVec2, size: f64, level: u32) -> Self {
        Self {
            position,
            size,
            level,
        }
    }
}
