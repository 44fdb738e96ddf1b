//! Collision geometry
//!
//! Three shapes cover every combat query:
//! - circles (most bodies and projectiles)
//! - capsules, i.e. a line segment thickened by a radius (segmented bodies)
//! - angular sectors in polar space around a center (melee swipes)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{cartesian_to_polar, normalize_angle};

/// Strict circle overlap test
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance_squared(b) < (radius_a + radius_b) * (radius_a + radius_b)
}

/// Closest point to `p` on the segment `a..b`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let line_vec = b - a;
    let len_sq = line_vec.length_squared();
    if len_sq < 0.0001 {
        // Degenerate segment
        return a;
    }
    let t = ((p - a).dot(line_vec) / len_sq).clamp(0.0, 1.0);
    a + line_vec * t
}

/// Distance from `p` to the segment `a..b`
#[inline]
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (p - closest_point_on_segment(p, a, b)).length()
}

/// A line segment with a radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    pub a: Vec2,
    pub b: Vec2,
    pub radius: f32,
}

impl Capsule {
    pub fn new(a: Vec2, b: Vec2, radius: f32) -> Self {
        Self { a, b, radius }
    }

    /// Does a circle at `p` with `probe_radius` touch the capsule?
    pub fn overlaps_circle(&self, p: Vec2, probe_radius: f32) -> bool {
        point_segment_distance(p, self.a, self.b) < self.radius + probe_radius
    }
}

/// An angular range in polar space
///
/// Angles are normalized to [-π, π); a range whose start is numerically
/// larger than its end wraps through ±π.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularRange {
    pub start: f32,
    pub end: f32,
}

impl AngularRange {
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            start: normalize_angle(start),
            end: normalize_angle(end),
        }
    }

    /// Angular span of the range (handles wraparound)
    pub fn span(&self) -> f32 {
        let mut span = self.end - self.start;
        if span < 0.0 {
            span += std::f32::consts::TAU;
        }
        span
    }

    /// Check if an angle is within the range
    pub fn contains(&self, theta: f32) -> bool {
        let theta = normalize_angle(theta);
        let start = self.start;
        let end = self.end;

        if start <= end {
            // No wraparound
            theta >= start && theta <= end
        } else {
            // Wraparound case (e.g., start=170°, end=-170°)
            theta >= start || theta <= end
        }
    }
}

/// A circular sector anchored at `center`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub center: Vec2,
    pub radius: f32,
    pub range: AngularRange,
}

impl Sector {
    /// Does a circle at `p` with `probe_radius` fall inside the sector?
    ///
    /// Distance is checked against the grown radius, but the bearing of the
    /// probe center must lie inside the angular range itself.
    pub fn contains_circle(&self, p: Vec2, probe_radius: f32) -> bool {
        let (r, theta) = cartesian_to_polar(p - self.center);
        if r > self.radius + probe_radius {
            return false;
        }
        self.range.contains(theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_circles_overlap_strict() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
    }

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(Vec2::new(-5.0, 3.0), a, b), a);
        assert_eq!(closest_point_on_segment(Vec2::new(15.0, 3.0), a, b), b);
        assert_eq!(
            closest_point_on_segment(Vec2::new(4.0, 3.0), a, b),
            Vec2::new(4.0, 0.0)
        );
    }

    #[test]
    fn test_degenerate_segment_is_a_point() {
        let p = Vec2::new(3.0, 4.0);
        assert!((point_segment_distance(p, Vec2::ZERO, Vec2::ZERO) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_capsule_covers_gap_between_end_circles() {
        // Two circles of radius 8 whose centers sit 40 apart
        let capsule = Capsule::new(Vec2::new(0.0, 0.0), Vec2::new(40.0, 0.0), 8.0);
        let probe = Vec2::new(20.0, 6.0);
        assert!(capsule.overlaps_circle(probe, 0.0));
        assert!(probe.distance(capsule.a) > 8.0);
        assert!(probe.distance(capsule.b) > 8.0);
        assert!(!capsule.overlaps_circle(Vec2::new(20.0, 9.0), 0.0));
    }

    #[test]
    fn test_range_contains_no_wrap() {
        let range = AngularRange::new(0.0, PI / 2.0);
        assert!(range.contains(0.1));
        assert!(range.contains(PI / 4.0));
        assert!(!range.contains(PI));
        assert!(!range.contains(-PI / 4.0));
    }

    #[test]
    fn test_range_contains_wraparound() {
        let range = AngularRange::new(170.0_f32.to_radians(), -170.0_f32.to_radians());
        assert!(range.contains(PI));
        assert!(range.contains(-PI + 0.01));
        assert!(!range.contains(0.0));
        assert!((range.span() - 20.0_f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn test_sector_checks_radius_and_bearing() {
        let sector = Sector {
            center: Vec2::new(100.0, 100.0),
            radius: 42.0,
            range: AngularRange::new(-PI / 2.0, PI / 2.0),
        };
        // In front, inside radius
        assert!(sector.contains_circle(Vec2::new(130.0, 100.0), 0.0));
        // In front, outside radius even with probe
        assert!(!sector.contains_circle(Vec2::new(160.0, 100.0), 14.0));
        // Behind, inside radius
        assert!(!sector.contains_circle(Vec2::new(80.0, 100.0), 0.0));
    }
}
