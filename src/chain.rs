//! Articulated spine solver.
//!
//! Joint 0 is the free head. Each call drags the head to a target and lets the
//! rest of the chain trail behind it, every joint bending at most
//! `angle_constraint` relative to the joint ahead of it.

use std::f64::consts::TAU;

use glam::DVec2;

use crate::draw::{Color, DrawList};
use crate::geom::{constrain_angle, constrain_distance, from_angle, heading};

/// Width used by `display` when no per-joint size is supplied.
const DEBUG_JOINT_RADIUS: f64 = 16.0;

#[derive(Debug, Clone)]
pub struct Chain {
    joints: Vec<DVec2>,
    angles: Vec<f64>,
    link_size: f64,
    angle_constraint: f64,
}

impl Chain {
    /// Lay out `joint_count` joints straight down (+y) from `origin`.
    /// At least one joint is always created.
    pub fn new(origin: DVec2, joint_count: usize, link_size: f64, angle_constraint: f64) -> Self {
        let count = joint_count.max(1);
        let joints = (0..count)
            .map(|i| origin + DVec2::new(0.0, i as f64 * link_size))
            .collect();
        Self {
            joints,
            angles: vec![0.0; count],
            link_size,
            angle_constraint,
        }
    }

    /// Chain with no bending limit.
    pub fn free(origin: DVec2, joint_count: usize, link_size: f64) -> Self {
        Self::new(origin, joint_count, link_size, TAU)
    }

    pub fn joints(&self) -> &[DVec2] {
        &self.joints
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn head(&self) -> DVec2 {
        self.joints[0]
    }

    pub fn tail(&self) -> DVec2 {
        self.joints[self.joints.len() - 1]
    }

    pub fn link_size(&self) -> f64 {
        self.link_size
    }

    pub fn angle_constraint(&self) -> f64 {
        self.angle_constraint
    }

    /// Drag the head to `target` and let the body follow.
    ///
    /// Joints are processed head to tail so each one is constrained against its
    /// predecessor's already-updated angle.
    pub fn resolve(&mut self, target: DVec2) {
        self.angles[0] = heading(target - self.joints[0]);
        self.joints[0] = target;

        for i in 1..self.joints.len() {
            let raw = heading(self.joints[i - 1] - self.joints[i]);
            let angle = constrain_angle(raw, self.angles[i - 1], self.angle_constraint);
            self.angles[i] = angle;
            self.joints[i] = self.joints[i - 1] - from_angle(angle) * self.link_size;
        }
    }

    /// Two-pass anchor relaxation for chains whose far end is pinned.
    ///
    /// Forward pass pulls the chain toward `target` from the head, backward pass
    /// pins the last joint to `anchor` and walks back. Angles are refreshed from
    /// the resulting joint directions; the bending limit does not apply here.
    pub fn resolve_anchored(&mut self, target: DVec2, anchor: DVec2) {
        let n = self.joints.len();

        self.joints[0] = target;
        for i in 1..n {
            self.joints[i] = constrain_distance(self.joints[i], self.joints[i - 1], self.link_size);
        }

        self.joints[n - 1] = anchor;
        for i in (0..n - 1).rev() {
            self.joints[i] = constrain_distance(self.joints[i], self.joints[i + 1], self.link_size);
        }

        for i in 1..n {
            self.angles[i] = heading(self.joints[i - 1] - self.joints[i]);
        }
        if n > 1 {
            self.angles[0] = self.angles[1];
        }
    }

    /// Drop the last joint. The head is never removed.
    pub fn pop_tail(&mut self) -> Option<DVec2> {
        if self.joints.len() <= 1 {
            return None;
        }
        self.angles.pop();
        self.joints.pop()
    }

    /// Debug view: link segments plus a circle per joint.
    pub fn display(&self, draw: &mut DrawList, sizes: &[f64]) {
        for pair in self.joints.windows(2) {
            draw.move_to(pair[0]);
            draw.line_to(pair[1]);
        }
        for (i, &joint) in self.joints.iter().enumerate() {
            let radius = sizes.get(i).copied().unwrap_or(DEBUG_JOINT_RADIUS);
            draw.circle(joint, radius);
        }
        draw.stroke(Color::WHITE, 4.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::angle_diff;
    use std::f64::consts::PI;

    fn assert_links(chain: &Chain) {
        for pair in chain.joints().windows(2) {
            let d = pair[0].distance(pair[1]);
            let rel = (d - chain.link_size()).abs() / chain.link_size();
            assert!(rel < 1e-6, "link {d} vs {}", chain.link_size());
        }
    }

    fn assert_bends(chain: &Chain) {
        for i in 1..chain.len() {
            let d = angle_diff(chain.angles()[i - 1], chain.angles()[i]).abs();
            assert!(d <= chain.angle_constraint() + 1e-9, "joint {i} bends {d}");
        }
    }

    #[test]
    fn three_joint_scenario() {
        let mut chain = Chain::new(DVec2::ZERO, 3, 10.0, PI);
        assert_eq!(chain.joints()[2], DVec2::new(0.0, 20.0));

        chain.resolve(DVec2::new(100.0, 0.0));

        assert_eq!(chain.head(), DVec2::new(100.0, 0.0));
        assert_links(&chain);
        // Trailing joints stay on the side of the old tail
        assert!(chain.joints()[1].x < 100.0);
        assert!(chain.joints()[2].x < chain.joints()[1].x);
        assert!(chain.joints()[1].y > 0.0);
    }

    #[test]
    fn constraint_survives_reversal() {
        let mut chain = Chain::new(DVec2::ZERO, 12, 8.0, PI / 8.0);
        for step in 0..50 {
            chain.resolve(DVec2::new(0.0, -(step as f64) * 4.0));
        }
        assert_links(&chain);
        assert_bends(&chain);

        // Teleport the target 180 degrees behind the head.
        let head = chain.head();
        chain.resolve(head + DVec2::new(0.0, 500.0));
        assert_links(&chain);
        assert_bends(&chain);
    }

    #[test]
    fn random_walk_keeps_invariants() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut chain = Chain::new(DVec2::new(5.0, 5.0), 9, 6.0, PI / 6.0);
        let mut target = chain.head();
        for _ in 0..500 {
            target += DVec2::new(rng.f64() * 40.0 - 20.0, rng.f64() * 40.0 - 20.0);
            chain.resolve(target);
            assert_links(&chain);
            assert_bends(&chain);
        }
    }

    #[test]
    fn free_chain_follows_straight() {
        let mut chain = Chain::free(DVec2::ZERO, 4, 5.0);
        chain.resolve(DVec2::new(0.0, -10.0));
        // Heading straight up; the body lines up below the head.
        for (i, joint) in chain.joints().iter().enumerate() {
            assert!((joint.x).abs() < 1e-9);
            assert!((joint.y - (-10.0 + 5.0 * i as f64)).abs() < 1e-9);
        }
    }

    #[test]
    fn anchored_resolve_pins_tail() {
        let mut chain = Chain::free(DVec2::ZERO, 5, 10.0);
        let anchor = DVec2::new(0.0, 40.0);
        chain.resolve_anchored(DVec2::new(15.0, 5.0), anchor);
        assert_eq!(chain.tail(), anchor);
        assert_links(&chain);
    }

    #[test]
    fn pop_tail_keeps_head() {
        let mut chain = Chain::free(DVec2::ZERO, 2, 1.0);
        assert!(chain.pop_tail().is_some());
        assert!(chain.pop_tail().is_none());
        assert_eq!(chain.len(), 1);
        chain.resolve(DVec2::new(1.0, 1.0));
        assert_eq!(chain.head(), DVec2::new(1.0, 1.0));
    }

    #[test]
    fn display_emits_segments_and_joints() {
        let chain = Chain::free(DVec2::ZERO, 3, 1.0);
        let mut draw = DrawList::new();
        chain.display(&mut draw, &[2.0]);
        // 2 segments * 2 + 3 circles + stroke
        assert_eq!(draw.len(), 8);
    }
}
