//! Segmented worms: a short spine with an optional pair of eyes and a flagellum tail.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec2;

use super::template::WormSpec;
use super::{Palette, Pose};
use crate::body::{Body, BodyOptions, Pupil};
use crate::draw::{Color, DrawList};
use crate::geom::{angle_diff, from_angle};

/// Worms above this level taper and get pupils.
const ADVANCED_LEVEL: u32 = 5;
const TAPER: f64 = 0.8;
const EYE_SIZE: f64 = 0.3;
const TAIL_WAVES: u32 = 5;

#[derive(Debug)]
pub struct Worm {
    body: Body,
    eyes: bool,
    eye_color: Color,
}

fn worm_widths(joints: usize, size: f64, level: u32) -> Vec<f64> {
    (0..joints)
        .map(|i| {
            let taper = if level > ADVANCED_LEVEL {
                TAPER.powi(i as i32)
            } else {
                1.0
            };
            size * taper * 0.8
        })
        .collect()
}

impl Worm {
    pub fn new(spec: &WormSpec, origin: DVec2, size: f64, level: u32, hue: f64) -> Self {
        let joints = spec.joints.max(3);
        let body = Body::new(BodyOptions {
            origin,
            joint_count: joints,
            link_size: size / 2.0,
            angle_constraint: PI / 8.0,
            widths: worm_widths(joints, size, level),
            round_head: size / 2.0,
            round_tail: if level > ADVANCED_LEVEL { 0.0 } else { size / 4.0 },
        });
        Self {
            body,
            eyes: spec.eyes,
            eye_color: Color::from_oklch(1.0, 0.1, hue),
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Recompute the width profile for a new size.
    pub fn resize(&mut self, size: f64, level: u32) {
        let widths = worm_widths(self.body.widths().len(), size, level);
        self.body.widths_mut().copy_from_slice(&widths);
    }

    /// Particles leave from the last joint.
    pub fn emission_point(&self) -> DVec2 {
        self.body.spine().tail()
    }

    pub fn draw(&self, draw: &mut DrawList, pose: &Pose, palette: &Palette, alpha: f64) {
        self.body.draw_body(draw, self.body.spine().len().saturating_sub(1));
        draw.fill(palette.fill, palette.fill_alpha * alpha);
        draw.stroke(palette.stroke, palette.stroke_width, alpha);

        if self.eyes {
            let pupil = (pose.level > ADVANCED_LEVEL).then(Pupil::default);
            for side in [FRAC_PI_2, -FRAC_PI_2] {
                self.body.draw_eye(
                    draw,
                    0,
                    side,
                    -pose.size * 0.3,
                    pose.size * EYE_SIZE,
                    self.eye_color,
                    pupil,
                );
            }
        }

        let angles = self.body.spine().angles();
        let n = angles.len();
        if n < 3 {
            return;
        }
        // Tail keeps bending the way the rear segments curve.
        let angle = angle_diff(angles[n - 3], angles[n - 1]) + angles[n - 1] + PI;
        let start = self.body.offset_point(n - 1, PI, 0.0);
        draw.move_to(start);
        draw.wavy_line(
            start,
            from_angle(angle) * pose.size,
            pose.size,
            pose.size * 0.2,
            TAIL_WAVES,
        );
        draw.stroke(palette.stroke, palette.stroke_width, alpha);
    }
}
