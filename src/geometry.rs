//! Planar geometry primitives
//!
//! Points are `glam::DVec2`; this module adds the bounding rectangle and the
//! few polygon helpers the graph stages need.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A location on the map plane
pub type Point = DVec2;

/// Interpolate between two points (`t = 0` yields `a`, `t = 1` yields `b`)
#[inline]
pub fn interpolate(a: Point, b: Point, t: f64) -> Point {
    a.lerp(b, t)
}

/// Arithmetic mean of a set of points, `None` when the set is empty
pub fn mean(points: impl IntoIterator<Item = Point>) -> Option<Point> {
    let mut sum = Point::ZERO;
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Area of a polygon given its vertices in any order
///
/// Vertices are sorted by angle around their mean first, so callers can pass
/// unordered corner sets. Fewer than 3 vertices yield 0.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let Some(center) = mean(points.iter().copied()) else {
        return 0.0;
    };

    let mut ordered = points.to_vec();
    ordered.sort_by(|a, b| {
        let ta = (a.y - center.y).atan2(a.x - center.x);
        let tb = (b.y - center.y).atan2(b.x - center.x);
        ta.total_cmp(&tb)
    });

    let mut twice_area = 0.0;
    for i in 0..ordered.len() {
        let p = ordered[i];
        let q = ordered[(i + 1) % ordered.len()];
        twice_area += p.perp_dot(q);
    }
    twice_area.abs() * 0.5
}

/// Axis-aligned bounding rectangle of the map
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Horizontal extent
    pub width: f64,
    /// Vertical extent
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// A rectangle anchored at the origin
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Check whether a point lies inside or on the rectangle
    pub fn contains(&self, p: Point) -> bool {
        let max = self.max();
        p.x >= self.x && p.x <= max.x && p.y >= self.y && p.y <= max.y
    }

    /// Check whether a point lies on one of the rectangle's sides
    pub fn on_border(&self, p: Point, tolerance: f64) -> bool {
        let max = self.max();
        (p.x - self.x).abs() <= tolerance
            || (p.x - max.x).abs() <= tolerance
            || (p.y - self.y).abs() <= tolerance
            || (p.y - max.y).abs() <= tolerance
    }
}
