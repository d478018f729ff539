use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::DVec2;

use crate::chain::Chain;
use crate::draw::{Color, DrawList};
use crate::geom::from_angle;

/// Half-width used for joints past the end of the width profile.
pub const DEFAULT_WIDTH: f64 = 16.0;
/// Tail bulge below this draws a pointed tail.
const POINTED_TAIL_EPSILON: f64 = 0.001;

/// Construction parameters for a [`Body`].
#[derive(Debug, Clone)]
pub struct BodyOptions {
    pub origin: DVec2,
    pub joint_count: usize,
    pub link_size: f64,
    pub angle_constraint: f64,
    pub widths: Vec<f64>,
    pub round_head: f64,
    pub round_tail: f64,
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self {
            origin: DVec2::ZERO,
            joint_count: 3,
            link_size: 16.0,
            angle_constraint: std::f64::consts::TAU,
            widths: Vec::new(),
            round_head: 30.0,
            round_tail: 0.0,
        }
    }
}

/// Eye pupil, drawn centred in the eye.
#[derive(Debug, Clone, Copy)]
pub struct Pupil {
    pub color: Color,
    /// Pupil radius as a fraction of the eye radius.
    pub fraction: f64,
}

impl Default for Pupil {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            fraction: 0.5,
        }
    }
}

/// Spine plus a per-joint half-width profile. All outline geometry is derived
/// from the current chain state on every call.
#[derive(Debug, Clone)]
pub struct Body {
    spine: Chain,
    widths: Vec<f64>,
    pub round_head: f64,
    pub round_tail: f64,
}

impl Body {
    pub fn new(opts: BodyOptions) -> Self {
        Self {
            spine: Chain::new(
                opts.origin,
                opts.joint_count,
                opts.link_size,
                opts.angle_constraint,
            ),
            widths: opts.widths,
            round_head: opts.round_head,
            round_tail: opts.round_tail,
        }
    }

    pub fn spine(&self) -> &Chain {
        &self.spine
    }

    pub fn spine_mut(&mut self) -> &mut Chain {
        &mut self.spine
    }

    pub fn head(&self) -> DVec2 {
        self.spine.head()
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn widths_mut(&mut self) -> &mut [f64] {
        &mut self.widths
    }

    pub fn move_to(&mut self, target: DVec2) {
        self.spine.resolve(target);
    }

    /// Advance the head `step` units toward `target`.
    pub fn move_towards(&mut self, target: DVec2, step: f64) {
        let head = self.spine.head();
        let next = head + (target - head).normalize_or_zero() * step;
        self.spine.resolve(next);
    }

    /// Half-width at joint `i`, falling back to [`DEFAULT_WIDTH`].
    pub fn width_at(&self, i: usize) -> f64 {
        self.widths.get(i).copied().unwrap_or(DEFAULT_WIDTH)
    }

    /// Point on the body edge around joint `i`: rotate `angle_offset` from the
    /// joint's heading and step out `width + length_offset`. Indices past the
    /// tail clamp to the tail.
    pub fn offset_point(&self, i: usize, angle_offset: f64, length_offset: f64) -> DVec2 {
        let i = i.min(self.spine.len().saturating_sub(1));
        let joint = self.spine.joints()[i];
        let angle = self.spine.angles()[i];
        joint + from_angle(angle + angle_offset) * (self.width_at(i) + length_offset)
    }

    fn edge(&self, i: usize, angle_offset: f64) -> DVec2 {
        self.offset_point(i, angle_offset, 0.0)
    }

    /// Closed outline from the head to joint `last`.
    ///
    /// Each pair of consecutive edge points becomes a quadratic curve with the
    /// edge point as control and the midpoint to the next one as end point.
    /// Returns the `(control, end)` pairs in drawing order. Chains with a
    /// single joint have no outline.
    pub fn draw_body(&self, draw: &mut DrawList, last: usize) -> Vec<(DVec2, DVec2)> {
        let n = self.spine.len();
        if n < 2 {
            return Vec::new();
        }
        let last = last.clamp(1, n - 1);

        let right = FRAC_PI_2;
        let left = -FRAC_PI_2;
        let start = (self.edge(0, right) + self.edge(1, right)) * 0.5;
        draw.move_to(start);

        let mut curves = Vec::with_capacity(2 * last + 6);

        for i in 0..last {
            let mid = (self.edge(i, right) + self.edge(i + 1, right)) * 0.5;
            curves.push((self.edge(i, right), mid));
        }

        if self.round_tail <= POINTED_TAIL_EPSILON {
            curves.push((self.edge(last, right), self.edge(last, PI)));
        } else {
            curves.push((
                self.offset_point(last, 3.0 * FRAC_PI_4, self.round_tail),
                self.edge(last, PI),
            ));
            let mid = (self.edge(last, left) + self.edge(last - 1, left)) * 0.5;
            curves.push((self.offset_point(last, -3.0 * FRAC_PI_4, self.round_tail), mid));
        }

        for i in (1..=last).rev() {
            let mid = (self.edge(i, left) + self.edge(i - 1, left)) * 0.5;
            curves.push((self.edge(i, left), mid));
        }

        curves.push((self.edge(0, left), self.edge(0, -FRAC_PI_4)));
        curves.push((self.offset_point(0, 0.0, self.round_head), self.edge(0, FRAC_PI_4)));
        curves.push((self.edge(0, right), start));

        for &(control, end) in &curves {
            draw.quad_to(control, end);
        }
        curves
    }

    /// Filled eye anchored to joint `joint`, turning with it.
    pub fn draw_eye(
        &self,
        draw: &mut DrawList,
        joint: usize,
        angle_offset: f64,
        length_offset: f64,
        size: f64,
        color: Color,
        pupil: Option<Pupil>,
    ) {
        if joint >= self.spine.len() {
            return;
        }
        let center = self.offset_point(joint, angle_offset, length_offset);
        draw.circle(center, size * 0.5);
        draw.fill(color, 1.0);

        if let Some(pupil) = pupil {
            draw.circle(center, size * 0.5 * pupil.fraction);
            draw.fill(pupil.color, 1.0);
        }
    }
}
