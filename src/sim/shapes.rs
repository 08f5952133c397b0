//! Static geometry and overlap predicates
//!
//! The arena is bounded by four straight segments wound counter-clockwise
//! (bottom, right, top, left), so the left-hand normal of every segment
//! points into the arena.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A fixed, immovable boundary segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: DVec2,
    pub b: DVec2,
}

impl Segment {
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self { a, b }
    }

    /// Projection parameter of `p` along the segment, clamped to [0, 1]
    pub fn project(&self, p: DVec2) -> f64 {
        let line_vec = self.b - self.a;
        let line_len_sq = line_vec.length_squared();
        if line_len_sq == 0.0 {
            return 0.0;
        }
        ((p - self.a).dot(line_vec) / line_len_sq).clamp(0.0, 1.0)
    }

    /// Closest point on the segment to `p` (projection clamped to the endpoints)
    pub fn closest_point(&self, p: DVec2) -> DVec2 {
        self.a + (self.b - self.a) * self.project(p)
    }

    /// Distance from `p` to the segment
    #[inline]
    pub fn distance_to(&self, p: DVec2) -> f64 {
        (p - self.closest_point(p)).length()
    }

    /// Unit left-hand normal. Points into the arena for the walls built by
    /// [`arena_walls`].
    pub fn inward_normal(&self) -> DVec2 {
        let perp = (self.b - self.a).perp();
        let len = perp.length();
        // Divide rather than multiply by the reciprocal so axis-aligned
        // walls get an exact unit normal
        if len == 0.0 { DVec2::ZERO } else { perp / len }
    }
}

/// The four walls of a `size.x` × `size.y` arena: bottom, right, top, left
pub fn arena_walls(size: DVec2) -> [Segment; 4] {
    let (w, h) = (size.x, size.y);
    [
        Segment::new(DVec2::new(0.0, 0.0), DVec2::new(w, 0.0)),
        Segment::new(DVec2::new(w, 0.0), DVec2::new(w, h)),
        Segment::new(DVec2::new(w, h), DVec2::new(0.0, h)),
        Segment::new(DVec2::new(0.0, h), DVec2::new(0.0, 0.0)),
    ]
}

/// Signed distances from a point to each arena wall.
///
/// Negative values mean the point is outside the arena on that side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallDistances {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

/// Wall distances for a point, unclamped
#[inline]
pub fn distance_to_walls(pos: DVec2, size: DVec2) -> WallDistances {
    WallDistances {
        left: pos.x,
        right: size.x - pos.x,
        bottom: pos.y,
        top: size.y - pos.y,
    }
}

/// True if the point lies inside the closed arena rectangle
#[inline]
pub fn is_in_bounds(pos: DVec2, size: DVec2) -> bool {
    (0.0..=size.x).contains(&pos.x) && (0.0..=size.y).contains(&pos.y)
}

/// Circle-circle overlap (touching does not count)
#[inline]
pub fn circles_overlap(p1: DVec2, r1: f64, p2: DVec2, r2: f64) -> bool {
    p1.distance(p2) < r1 + r2
}

/// Circle-segment overlap (touching does not count)
#[inline]
pub fn circle_segment_overlap(center: DVec2, radius: f64, segment: &Segment) -> bool {
    segment.distance_to(center) < radius
}
