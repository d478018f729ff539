//! Fish: a twelve-joint spine with paired fins, a caudal fin, a dorsal fin and
//! optional markings.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, PI};

use glam::DVec2;

use super::template::FishSpec;
use super::{Palette, Pose};
use crate::body::{Body, BodyOptions, Pupil};
use crate::draw::{Color, DrawList};
use crate::geom::{angle_diff, from_angle};

const JOINTS: usize = 12;
/// Width profile in units of the widest section (84 px in the reference art).
const PROFILE: [f64; 10] = [
    68.0 / 84.0,
    81.0 / 84.0,
    1.0,
    83.0 / 84.0,
    77.0 / 84.0,
    64.0 / 84.0,
    51.0 / 84.0,
    38.0 / 84.0,
    32.0 / 84.0,
    19.0 / 84.0,
];
/// Outline stops here; the rest of the spine carries the caudal fin.
const LAST_BODY_JOINT: usize = 9;
const FIN_ALPHA: f64 = 0.7;
const SPOT_OFFSETS: [f64; 9] = [-0.8, 0.6, -0.3, 0.5, -0.3, -0.1, 0.1, -0.1, 0.1];
const SPOT_SIZES: [f64; 9] = [0.2, 0.2, 0.4, 0.3, 0.3, 0.1, 0.2, 0.1, 0.1];

#[derive(Debug)]
pub struct Fish {
    body: Body,
    spec: FishSpec,
    fin_color: Color,
}

impl Fish {
    pub fn new(spec: &FishSpec, origin: DVec2, size: f64, hue: f64) -> Self {
        let thickness = if spec.thickness > 0.0 { spec.thickness } else { 1.0 };
        let body = Body::new(BodyOptions {
            origin,
            joint_count: JOINTS,
            link_size: (64.0 / 84.0) * size / thickness.powf(0.8),
            angle_constraint: PI / 8.0,
            widths: PROFILE.iter().map(|w| w * size).collect(),
            round_head: size / 2.0 * spec.round_head,
            round_tail: size * spec.round_tail,
        });
        Self {
            body,
            spec: *spec,
            fin_color: Color::from_oklch(0.8, 0.2, hue),
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Scale the width profile by `new / old`.
    pub fn resize(&mut self, old: f64, new: f64) {
        if old <= 0.0 {
            return;
        }
        let ratio = new / old;
        for w in self.body.widths_mut() {
            *w *= ratio;
        }
    }

    pub fn emission_point(&self) -> DVec2 {
        let joints = self.body.spine().joints();
        joints[LAST_BODY_JOINT.min(joints.len() - 1)]
    }

    pub fn draw(&self, draw: &mut DrawList, pose: &Pose, palette: &Palette, alpha: f64) {
        let joints = self.body.spine().joints();
        let angles = self.body.spine().angles();
        if joints.len() < JOINTS {
            return;
        }
        let size = pose.size;
        let fin_scale = size * self.spec.fin_scale;

        let head_to_mid1 = angle_diff(angles[0], angles[6]);
        let head_to_mid2 = angle_diff(angles[0], angles[7]);
        let head_to_tail = head_to_mid1 + angle_diff(angles[6], angles[11]);

        // Pectoral fins
        let radii = DVec2::new(160.0 / 84.0, 64.0 / 84.0) * fin_scale;
        draw.ellipse(self.body.offset_point(3, FRAC_PI_3, 0.0), radii, angles[2] - FRAC_PI_4);
        draw.fill(self.fin_color, FIN_ALPHA * alpha);
        draw.ellipse(self.body.offset_point(3, -FRAC_PI_3, 0.0), radii, angles[2] + FRAC_PI_4);
        draw.fill(self.fin_color, FIN_ALPHA * alpha);

        // Ventral fins
        if self.spec.back_fins {
            let radii = DVec2::new(96.0 / 84.0, 32.0 / 84.0) * fin_scale;
            draw.ellipse(self.body.offset_point(7, FRAC_PI_2, 0.0), radii, angles[6] - FRAC_PI_4);
            draw.fill(self.fin_color, FIN_ALPHA * alpha);
            draw.ellipse(self.body.offset_point(7, -FRAC_PI_2, 0.0), radii, angles[6] + FRAC_PI_4);
            draw.fill(self.fin_color, FIN_ALPHA * alpha);
        }

        if self.spec.caudal_fin {
            self.draw_caudal_fin(draw, size, head_to_tail, alpha);
        }

        self.body.draw_body(draw, LAST_BODY_JOINT);
        draw.fill(palette.fill, palette.fill_alpha * alpha);
        draw.stroke(palette.stroke, palette.stroke_width, alpha);

        // Dorsal fin
        let side = |i: usize, bend: f64| joints[i] + from_angle(angles[i] + FRAC_PI_2) * bend * 16.0;
        draw.move_to(joints[4]);
        draw.bezier_to(joints[5], joints[6], joints[7]);
        draw.bezier_to(side(6, head_to_mid2), side(5, head_to_mid1), joints[4]);
        draw.fill(self.fin_color, alpha);

        if self.spec.horizontal_stripes {
            self.draw_horizontal_stripes(draw, palette, pose, alpha);
        }
        if self.spec.vertical_stripes {
            self.draw_vertical_stripes(draw, palette, pose, alpha);
        }
        if self.spec.spots {
            for (i, (offset, spot)) in SPOT_OFFSETS.iter().zip(SPOT_SIZES).enumerate() {
                draw.circle(self.body.offset_point(i, offset * 0.5 + PI, 0.0), size * spot);
            }
            draw.fill(palette.stroke, 0.5 * alpha);
        }

        let pupil = self.spec.pupils.then(Pupil::default);
        for side in [self.spec.eye_angle, -self.spec.eye_angle] {
            self.body.draw_eye(
                draw,
                0,
                side,
                -size * 0.2,
                size * self.spec.eye_size,
                Color::WHITE,
                pupil,
            );
        }
    }

    /// Fan between joints 8 and 11: one edge flares with the body bend, the
    /// other stays a thin clamped sliver.
    fn draw_caudal_fin(&self, draw: &mut DrawList, size: f64, head_to_tail: f64, alpha: f64) {
        let joints = self.body.spine().joints();
        let angles = self.body.spine().angles();

        draw.move_to(joints[8]);
        for i in 8..JOINTS {
            let k = (i - 8) as f64;
            let width = 1.5 * head_to_tail * k * k / 80.0 * size;
            draw.line_to(joints[i] + from_angle(angles[i] - FRAC_PI_2) * width);
        }
        let width = (head_to_tail * 6.0).clamp(-13.0, 13.0) / 80.0 * size;
        for i in (8..JOINTS).rev() {
            draw.line_to(joints[i] + from_angle(angles[i] + FRAC_PI_2) * width);
        }
        draw.close_path();
        draw.fill(self.fin_color, alpha);
    }

    fn draw_horizontal_stripes(&self, draw: &mut DrawList, palette: &Palette, pose: &Pose, alpha: f64) {
        let control = self.body.offset_point(8, 0.0, 0.0);
        for i in 1..LAST_BODY_JOINT {
            let j = LAST_BODY_JOINT - i;
            draw.move_to(self.body.offset_point(i, FRAC_PI_2, 0.0));
            draw.quad_to(control, self.body.offset_point(j, -FRAC_PI_2, 0.0));
            draw.move_to(self.body.offset_point(i, -FRAC_PI_2, 0.0));
            draw.quad_to(control, self.body.offset_point(j, FRAC_PI_2, 0.0));
        }
        let width = palette.stroke_width * if pose.is_player { 0.4 } else { 1.0 };
        draw.stroke(palette.stroke, width, 0.5 * alpha);
    }

    fn draw_vertical_stripes(&self, draw: &mut DrawList, palette: &Palette, pose: &Pose, alpha: f64) {
        for i in 1..8 {
            let control = self.body.offset_point(i + 2, 0.0, 0.0);
            draw.move_to(self.body.offset_point(i, FRAC_PI_2, 0.0));
            draw.quad_to(control, self.body.offset_point(i + 1, -FRAC_PI_2, 0.0));
            draw.move_to(self.body.offset_point(i + 1, FRAC_PI_2, 0.0));
            draw.quad_to(control, self.body.offset_point(i, -FRAC_PI_2, 0.0));
        }
        let width = palette.stroke_width * if pose.is_player { 0.5 } else { 1.0 };
        draw.stroke(palette.stroke, width, 0.5 * alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::DrawCommand;

    fn pose(size: f64) -> Pose {
        Pose {
            position: DVec2::ZERO,
            direction: 0.0,
            size,
            timer: 0.0,
            level: 7,
            hunting_range: 5.0,
            focus: None,
            is_player: false,
        }
    }

    fn count(draw: &DrawList, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        draw.commands().iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn profile_scales_with_size() {
        let fish = Fish::new(&FishSpec::default(), DVec2::ZERO, 84.0, 0.0);
        assert_eq!(fish.body().spine().len(), JOINTS);
        assert!((fish.body().width_at(2) - 84.0).abs() < 1e-9);
        assert!((fish.body().width_at(9) - 19.0).abs() < 1e-9);
        // Joints past the profile fall back to the default width.
        assert_eq!(fish.body().width_at(10), crate::body::DEFAULT_WIDTH);
        assert!((fish.body().spine().link_size() - 64.0).abs() < 1e-9);
    }

    #[test]
    fn thicker_fish_have_shorter_links() {
        let thin = Fish::new(&FishSpec::default(), DVec2::ZERO, 100.0, 0.0);
        let thick = Fish::new(
            &FishSpec {
                thickness: 2.8,
                ..FishSpec::default()
            },
            DVec2::ZERO,
            100.0,
            0.0,
        );
        assert!(thick.body().spine().link_size() < thin.body().spine().link_size());
    }

    #[test]
    fn resize_scales_widths() {
        let mut fish = Fish::new(&FishSpec::default(), DVec2::ZERO, 100.0, 0.0);
        fish.resize(100.0, 150.0);
        assert!((fish.body().width_at(2) - 150.0).abs() < 1e-9);
        fish.resize(0.0, 10.0);
        assert!((fish.body().width_at(2) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn back_fins_and_pupils_follow_flags() {
        let palette = Palette::plain(Color::WHITE, Color::BLACK);
        let plain = Fish::new(&FishSpec::default(), DVec2::ZERO, 50.0, 0.0);
        let mut draw = DrawList::new();
        plain.draw(&mut draw, &pose(50.0), &palette, 1.0);
        assert_eq!(count(&draw, |c| matches!(c, DrawCommand::Ellipse { .. })), 2);
        assert_eq!(count(&draw, |c| matches!(c, DrawCommand::Circle { .. })), 4);

        let fancy = Fish::new(
            &FishSpec {
                back_fins: true,
                pupils: false,
                spots: true,
                ..FishSpec::default()
            },
            DVec2::ZERO,
            50.0,
            0.0,
        );
        draw.clear();
        fancy.draw(&mut draw, &pose(50.0), &palette, 1.0);
        assert_eq!(count(&draw, |c| matches!(c, DrawCommand::Ellipse { .. })), 4);
        // nine spots + two pupil-less eyes
        assert_eq!(count(&draw, |c| matches!(c, DrawCommand::Circle { .. })), 11);
    }

    #[test]
    fn caudal_fin_is_optional() {
        let palette = Palette::plain(Color::WHITE, Color::BLACK);
        let closes = |caudal_fin: bool| {
            let fish = Fish::new(
                &FishSpec {
                    caudal_fin,
                    ..FishSpec::default()
                },
                DVec2::ZERO,
                50.0,
                0.0,
            );
            let mut draw = DrawList::new();
            fish.draw(&mut draw, &pose(50.0), &palette, 1.0);
            count(&draw, |c| matches!(c, DrawCommand::ClosePath))
        };
        assert_eq!(closes(true), 1);
        assert_eq!(closes(false), 0);
    }

    #[test]
    fn emits_from_joint_nine() {
        let mut fish = Fish::new(&FishSpec::default(), DVec2::ZERO, 40.0, 0.0);
        fish.body_mut().move_to(DVec2::new(30.0, 10.0));
        assert_eq!(fish.emission_point(), fish.body().spine().joints()[9]);
    }
}
