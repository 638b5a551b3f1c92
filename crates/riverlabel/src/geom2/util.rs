use nalgebra::{matrix, Vector2};
use std::cmp::Ordering;

use super::types::{Vec2, EPS};

/// z-component of `(b - a) × (c - a)`; positive when `a, b, c` turn left.
#[inline]
pub(crate) fn cross(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Andrew’s monotone chain convex hull (CCW, collinear points dropped).
///
/// Returns `None` for fewer than two distinct points.
pub fn convex_hull(points: &[Vec2]) -> Option<Vec<Vec2>> {
    if points.len() < 2 {
        return None;
    }
    let mut pts: Vec<_> = points.iter().copied().filter(|p| p.x.is_finite() && p.y.is_finite()).collect();
    pts.sort_by(|a, b| match a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal),
        o => o,
    });
    pts.dedup_by(|a, b| (*a - *b).norm() < 1e-12);
    if pts.len() < 2 {
        return None;
    }
    let mut lower: Vec<Vec2> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Vec2> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    Some(hull)
}

/// Intersection of the lines `n1·x = c1` and `n2·x = c2`.
///
/// Returns `None` for (near-)parallel lines.
pub(crate) fn line_intersection(n1: Vec2, c1: f64, n2: Vec2, c2: f64) -> Option<Vec2> {
    let a = matrix![n1.x, n1.y; n2.x, n2.y];
    if a.determinant().abs() < EPS {
        return None;
    }
    let inv = a.try_inverse()?;
    let p = inv * Vector2::new(c1, c2);
    (p.x.is_finite() && p.y.is_finite()).then_some(p)
}

/// Euclidean distance from `p` to the segment `[a, b]`.
pub(crate) fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// `p` lies on segment `[a, b]` within `EPS` (scaled by the segment length).
pub(crate) fn on_segment(p: Vec2, a: Vec2, b: Vec2) -> bool {
    let scale = (b - a).norm().max(1.0);
    segment_distance(p, a, b) <= EPS * scale
}

/// Proper crossing of segments `[a, b]` and `[c, d]` (interiors intersect at one point).
///
/// Touching at endpoints or collinear overlap does not count.
pub(crate) fn segments_cross(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
}

/// Unit left normal of the direction `a → b`; `None` for a zero-length edge.
#[inline]
pub(crate) fn left_normal(a: Vec2, b: Vec2) -> Option<Vec2> {
    let d = b - a;
    let len = d.norm();
    if !len.is_finite() || len <= 0.0 {
        return None;
    }
    Some(Vec2::new(-d.y, d.x) / len)
}
