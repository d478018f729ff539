//! Single-celled organisms: a noisy membrane, a flagellum and drifting specks.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::DVec2;

use super::template::BlobSpec;
use super::{Palette, Pose};
use crate::draw::{Color, DrawList};
use crate::geom::{angle_diff, from_angle};
use crate::noise_field::{NoiseField, NoiseOptions};

/// Speck drift, units per second.
const SPECK_SPEED: f64 = 1.2;
/// Speck fade-in, alpha per second.
const SPECK_FADE_IN: f64 = 0.3;
/// Flagellum waves.
const TAIL_WAVES: u32 = 5;

#[derive(Debug, Clone)]
struct Speck {
    /// Offset from the blob centre.
    offset: DVec2,
    radius: f64,
    color: Color,
    fill_alpha: f64,
    alpha: f64,
    scale: f64,
}

#[derive(Debug)]
pub struct Blob {
    segments: usize,
    wiggle: bool,
    membrane_noise: NoiseField,
    speck_noise: NoiseField,
    specks: Vec<Speck>,
    speck_target: usize,
}

impl Blob {
    pub fn new(spec: &BlobSpec, size: f64, hue: f64, rng: &mut fastrand::Rng) -> Self {
        let mut blob = Self {
            segments: spec.segments.max(3),
            wiggle: spec.wiggle,
            membrane_noise: NoiseField::new(NoiseOptions::ranged(-0.1, 0.1, 1.0), rng),
            speck_noise: NoiseField::new(NoiseOptions::ranged(-PI * 4.0, PI * 4.0, 0.005), rng),
            specks: Vec::with_capacity(spec.specks),
            speck_target: spec.specks,
        };
        for _ in 0..spec.specks {
            blob.add_speck(size, hue, rng);
        }
        blob
    }

    /// Current swim speed: pulses with the flagellum beat.
    pub fn pulse_speed(base: f64, timer: f64) -> f64 {
        base * 0.8 + 0.4 * base * (timer * 2.0).cos().abs()
    }

    pub fn speck_count(&self) -> usize {
        self.specks.len()
    }

    fn add_speck(&mut self, size: f64, hue: f64, rng: &mut fastrand::Rng) {
        let spread = (rng.f64() - 0.5) * self.speck_target as f64 * 5.0;
        let color = Color::from_oklch(0.7, 0.3, (hue + spread).rem_euclid(360.0));
        let angle = rng.f64() * TAU;
        let radius = rng.f64() * size;
        self.specks.push(Speck {
            offset: from_angle(angle) * radius,
            radius: size * 0.3 * rng.f64(),
            color,
            fill_alpha: 0.1 + rng.f64() * 0.2,
            alpha: 0.0,
            scale: 1.0,
        });
    }

    /// Drift specks through the cell; specks leaving the membrane are replaced
    /// one per tick.
    pub fn update(&mut self, dt: f64, pose: &Pose, hue: f64, rng: &mut fastrand::Rng) {
        if self.specks.len() < self.speck_target {
            self.add_speck(pose.size, hue, rng);
        }

        let size = pose.size;
        let timer = pose.timer;
        let noise = &self.speck_noise;
        let mut i = 0;
        self.specks.retain_mut(|speck| {
            let angle = noise.get3(speck.offset.x, speck.offset.y, timer + i as f64 * 100.0);
            i += 1;
            speck.offset += from_angle(angle) * SPECK_SPEED * dt;
            speck.alpha = (speck.alpha + dt * SPECK_FADE_IN).min(1.0);

            let dist = speck.offset.length();
            if dist > size {
                return false;
            }
            speck.scale = if dist > size * 0.9 {
                (size - dist) / (size * 0.1)
            } else {
                1.0
            };
            true
        });
    }

    /// Membrane radius multiplier in direction `angle`: noise, a breathing
    /// stretch along the facing axis, and a bulge toward whatever the blob is
    /// chasing or just ate.
    fn membrane_scale(&self, pose: &Pose, angle: f64) -> f64 {
        let unit = from_angle(angle);
        let diff_perpendicular = angle_diff(angle, pose.direction);
        let diff_direction = angle_diff(angle, pose.direction + FRAC_PI_2);
        let scale_perpendicular = (diff_perpendicular.abs() - FRAC_PI_2).abs() * 0.3;
        let scale_direction = (diff_direction.abs() - FRAC_PI_2).abs() * 0.3;

        let mut scale = 1.0 + self.membrane_noise.get3(unit.x, unit.y, pose.timer);

        if let Some(focus) = pose.focus {
            let reach = pose.size * pose.hunting_range;
            if focus.distance < reach {
                let diff = angle_diff(angle, focus.angle);
                let pull = (PI - diff.abs()).powi(2) * (1.0 - focus.distance / reach) * 0.1;
                let w = focus.weight;
                let warp = 1.0 + pull * 2.0 * w;
                scale = 1.0
                    + self.membrane_noise.get3(unit.x * warp, unit.y * warp, pose.timer)
                        * (1.0 + pull * w);
                scale += pull * 0.4 * w;
            }
        }

        let beat = (pose.timer * 2.0).cos().abs();
        scale *= ((1.0 + scale_direction) * beat + (1.0 + scale_perpendicular) * (1.0 - beat)) * 0.5
            + 0.5;
        scale * 0.7
    }

    fn radius_at(&self, pose: &Pose, angle: f64) -> f64 {
        if self.wiggle {
            pose.size * self.membrane_scale(pose, angle)
        } else {
            pose.size
        }
    }

    pub fn draw(&self, draw: &mut DrawList, pose: &Pose, palette: &Palette, alpha: f64) {
        let center = pose.position;

        for i in 0..self.segments {
            let angle = i as f64 / self.segments as f64 * TAU;
            let p = center + from_angle(angle) * self.radius_at(pose, angle);
            if i == 0 {
                draw.move_to(p);
            } else {
                draw.line_to(p);
            }
        }
        draw.close_path();
        draw.fill(palette.fill, palette.fill_alpha * alpha);
        draw.stroke(palette.stroke, palette.stroke_width, alpha);

        // Flagellum, trailing opposite the facing direction.
        let back = pose.direction + PI;
        let dir = from_angle(back);
        let start = center + dir * self.radius_at(pose, back);
        draw.move_to(start);
        draw.wavy_line(start, dir * pose.size, pose.size, pose.size * 0.2, TAIL_WAVES);
        draw.stroke(palette.stroke, palette.stroke_width, alpha);

        for speck in &self.specks {
            let r = speck.radius * speck.scale;
            if r <= 0.0 {
                continue;
            }
            draw.circle(center + speck.offset, r);
            draw.fill(speck.color, speck.fill_alpha * speck.alpha * alpha);
            draw.stroke(speck.color, 2.0, 0.3 * speck.alpha * alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organism::Focus;

    fn pose(size: f64) -> Pose {
        Pose {
            position: DVec2::new(10.0, 10.0),
            direction: 0.0,
            size,
            timer: 0.3,
            level: 1,
            hunting_range: 5.0,
            focus: None,
            is_player: false,
        }
    }

    #[test]
    fn pulse_stays_between_bounds() {
        for i in 0..100 {
            let s = Blob::pulse_speed(2.0, i as f64 * 0.1);
            assert!((1.6..=2.4 + 1e-12).contains(&s));
        }
    }

    #[test]
    fn specks_stay_inside_membrane() {
        let mut rng = fastrand::Rng::with_seed(5);
        let spec = BlobSpec {
            specks: 10,
            ..BlobSpec::default()
        };
        let mut blob = Blob::new(&spec, 6.0, 180.0, &mut rng);
        assert_eq!(blob.speck_count(), 10);
        let mut p = pose(6.0);
        for _ in 0..600 {
            p.timer += 1.0 / 60.0;
            blob.update(1.0 / 60.0, &p, 180.0, &mut rng);
            assert!(blob.specks.iter().all(|s| s.offset.length() <= 6.0));
            assert!(blob.speck_count() <= 10);
        }
    }

    #[test]
    fn rigid_blob_is_round() {
        let mut rng = fastrand::Rng::with_seed(1);
        let spec = BlobSpec {
            wiggle: false,
            segments: 8,
            ..BlobSpec::default()
        };
        let blob = Blob::new(&spec, 4.0, 0.0, &mut rng);
        let p = pose(4.0);
        for i in 0..8 {
            assert_eq!(blob.radius_at(&p, i as f64), 4.0);
        }
    }

    #[test]
    fn membrane_bulges_toward_prey() {
        let mut rng = fastrand::Rng::with_seed(2);
        let blob = Blob::new(&BlobSpec::default(), 10.0, 0.0, &mut rng);
        let mut p = pose(10.0);
        let calm_front = blob.radius_at(&p, FRAC_PI_2);
        p.focus = Some(Focus {
            angle: FRAC_PI_2,
            distance: 1.0,
            weight: 1.0,
        });
        let eager_front = blob.radius_at(&p, FRAC_PI_2);
        assert!(eager_front > calm_front, "{eager_front} <= {calm_front}");
    }

    #[test]
    fn draw_emits_closed_membrane_and_tail() {
        let mut rng = fastrand::Rng::with_seed(3);
        let spec = BlobSpec {
            segments: 12,
            ..BlobSpec::default()
        };
        let blob = Blob::new(&spec, 5.0, 0.0, &mut rng);
        let palette = Palette::plain(Color::WHITE, Color::BLACK);
        let mut draw = DrawList::new();
        blob.draw(&mut draw, &pose(5.0), &palette, 1.0);
        // 12 outline points + close + fill + stroke, then move + 5 waves + stroke
        assert_eq!(draw.len(), 12 + 3 + 1 + TAIL_WAVES as usize + 1);
    }
}
