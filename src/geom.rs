//! Angle and distance helpers shared by the spine solver and organism steering.

use std::f64::consts::{PI, TAU};

use glam::DVec2;

/// Unit vector pointing along `angle` (radians).
#[inline]
pub fn from_angle(angle: f64) -> DVec2 {
    DVec2::new(angle.cos(), angle.sin())
}

/// Heading of `v` in radians, `atan2(y, x)`.
#[inline]
pub fn heading(v: DVec2) -> f64 {
    v.y.atan2(v.x)
}

/// Wrap an angle into `(-π, π]`.
pub fn wrap_angle(mut angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    angle %= TAU;
    if angle > PI {
        angle -= TAU;
    } else if angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Signed shortest-arc difference going from `from` to `to`, in `(-π, π]`.
#[inline]
pub fn angle_diff(from: f64, to: f64) -> f64 {
    wrap_angle(to - from)
}

/// Clamp `angle` to lie within `max_diff` of `reference` along the shortest arc.
/// Snaps to exactly `reference ± max_diff` when outside.
pub fn constrain_angle(angle: f64, reference: f64, max_diff: f64) -> f64 {
    let diff = angle_diff(reference, angle);
    if diff > max_diff {
        reference + max_diff
    } else if diff < -max_diff {
        reference - max_diff
    } else {
        angle
    }
}

/// Move `point` onto the circle of radius `distance` around `anchor`, keeping its direction.
/// A point sitting exactly on the anchor has no direction and collapses onto it.
pub fn constrain_distance(point: DVec2, anchor: DVec2, distance: f64) -> DVec2 {
    anchor + (point - anchor).normalize_or_zero() * distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_stays_in_half_open_range() {
        for k in -20..=20 {
            let a = wrap_angle(k as f64 * 0.7);
            assert!(a > -PI - 1e-12 && a <= PI + 1e-12, "{a}");
        }
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-9);
    }

    #[test]
    fn diff_takes_short_way_round() {
        let d = angle_diff(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-9);
        let d = angle_diff(-PI + 0.1, PI - 0.1);
        assert!((d + 0.2).abs() < 1e-9);
    }

    #[test]
    fn constrain_snaps_to_limit() {
        let c = constrain_angle(PI / 2.0, 0.0, PI / 8.0);
        assert!((c - PI / 8.0).abs() < 1e-12);
        let c = constrain_angle(-PI / 2.0, 0.0, PI / 8.0);
        assert!((c + PI / 8.0).abs() < 1e-12);
        // Within range is untouched
        assert_eq!(constrain_angle(0.05, 0.0, PI / 8.0), 0.05);
    }

    #[test]
    fn constrain_across_wraparound() {
        // Reference just below +π, raw angle just above -π: only 0.2 apart.
        let c = constrain_angle(-PI + 0.1, PI - 0.1, 0.5);
        assert_eq!(c, -PI + 0.1);
    }

    #[test]
    fn distance_projection() {
        let p = constrain_distance(DVec2::new(10.0, 0.0), DVec2::ZERO, 3.0);
        assert!((p - DVec2::new(3.0, 0.0)).length() < 1e-12);
    }
}
