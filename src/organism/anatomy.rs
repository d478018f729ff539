use glam::DVec2;

use super::blob::Blob;
use super::fish::Fish;
use super::template::AnatomySpec;
use super::worm::Worm;
use super::{Palette, Pose};
use crate::body::Body;
use crate::draw::DrawList;

/// Chain creatures only re-solve their spine once the head lags this far.
const FOLLOW_EPSILON: f64 = 0.1;
/// Particles left behind when a blob is destroyed.
const BLOB_BURST: usize = 3;

/// Per-variant body plan. Blobs are a single membrane; worms and fish drag an
/// articulated spine behind the organism position.
#[derive(Debug)]
pub enum Anatomy {
    Blob(Blob),
    Worm(Worm),
    Fish(Fish),
}

impl Anatomy {
    pub fn build(
        spec: &AnatomySpec,
        origin: DVec2,
        size: f64,
        level: u32,
        hue: f64,
        rng: &mut fastrand::Rng,
    ) -> Self {
        match spec {
            AnatomySpec::Blob(b) => Anatomy::Blob(Blob::new(b, size, hue, rng)),
            AnatomySpec::Worm(w) => Anatomy::Worm(Worm::new(w, origin, size, level, hue)),
            AnatomySpec::Fish(f) => Anatomy::Fish(Fish::new(f, origin, size, hue)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Anatomy::Blob(_) => "blob",
            Anatomy::Worm(_) => "worm",
            Anatomy::Fish(_) => "fish",
        }
    }

    /// The articulated body, if this variant has one.
    pub fn body(&self) -> Option<&Body> {
        match self {
            Anatomy::Blob(_) => None,
            Anatomy::Worm(w) => Some(w.body()),
            Anatomy::Fish(f) => Some(f.body()),
        }
    }

    fn body_mut(&mut self) -> Option<&mut Body> {
        match self {
            Anatomy::Blob(_) => None,
            Anatomy::Worm(w) => Some(w.body_mut()),
            Anatomy::Fish(f) => Some(f.body_mut()),
        }
    }

    /// Swim speed this tick for an organism with base speed `base`.
    pub fn swim_speed(&self, base: f64, timer: f64) -> f64 {
        match self {
            Anatomy::Blob(_) => Blob::pulse_speed(base, timer),
            _ => base,
        }
    }

    pub fn resize(&mut self, old: f64, new: f64, level: u32) {
        match self {
            Anatomy::Blob(_) => {}
            Anatomy::Worm(w) => w.resize(new, level),
            Anatomy::Fish(f) => f.resize(old, new),
        }
    }

    /// Advance internal animation after the organism has moved.
    pub fn update(&mut self, dt: f64, pose: &Pose, hue: f64, rng: &mut fastrand::Rng) {
        if let Anatomy::Blob(blob) = self {
            blob.update(dt, pose, hue, rng);
        }
        if let Some(body) = self.body_mut() {
            if body.head().distance(pose.position) >= FOLLOW_EPSILON {
                body.move_to(pose.position);
            }
        }
    }

    /// Where trail particles are shed.
    pub fn emission_point(&self, pose: &Pose) -> DVec2 {
        match self {
            Anatomy::Blob(_) => pose.position,
            Anatomy::Worm(w) => w.emission_point(),
            Anatomy::Fish(f) => f.emission_point(),
        }
    }

    /// Origins of the death burst: three at a blob's centre, one per joint
    /// for chain creatures.
    pub fn burst_points(&self, pose: &Pose) -> Vec<DVec2> {
        match self.body() {
            Some(body) => body.spine().joints().to_vec(),
            None => vec![pose.position; BLOB_BURST],
        }
    }

    pub fn draw(&self, draw: &mut DrawList, pose: &Pose, palette: &Palette, alpha: f64) {
        match self {
            Anatomy::Blob(b) => b.draw(draw, pose, palette, alpha),
            Anatomy::Worm(w) => w.draw(draw, pose, palette, alpha),
            Anatomy::Fish(f) => f.draw(draw, pose, palette, alpha),
        }
    }
}
