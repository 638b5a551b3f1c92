//! Basic 2D types and tolerances for river polygons.
//!
//! - `Ring`: open vertex loop (closing duplicate stripped on construction).
//! - `Polygon`: outer ring plus holes; never mutated by the placement code.
//! - `BBox`: axis-aligned bounds.
//!
//! Orientation is not normalized on construction. Operations that depend on
//! it (inward buffering) orient rings themselves.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// 2D point / vector in polygon coordinates.
pub type Vec2 = Vector2<f64>;

/// Tolerance for geometric predicates (on-segment, parallel lines, duplicates).
pub(crate) const EPS: f64 = 1e-9;

/// Closed vertex loop stored without the closing duplicate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub pts: Vec<Vec2>,
}

impl Ring {
    /// Build from a closed or open vertex sequence. Consecutive duplicates and the
    /// closing vertex are dropped.
    pub fn new(pts: Vec<Vec2>) -> Self {
        let mut pts = pts;
        pts.dedup_by(|a, b| (*a - *b).norm() < 1e-12);
        while pts.len() > 1 && (pts[0] - pts[pts.len() - 1]).norm() < 1e-12 {
            pts.pop();
        }
        Self { pts }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    /// Edges `(p_i, p_{i+1})`, wrapping around.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.pts.len();
        (0..n).map(move |i| (self.pts[i], self.pts[(i + 1) % n]))
    }

    /// Shoelace area; positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        let s: f64 = self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum();
        0.5 * s
    }

    /// Copy with reversed vertex order.
    pub fn reversed(&self) -> Ring {
        let mut pts = self.pts.clone();
        pts.reverse();
        Ring { pts }
    }
}

/// Polygon with one outer ring and optional holes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub outer: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(outer: Vec<Vec2>, holes: Vec<Vec<Vec2>>) -> Self {
        Self {
            outer: Ring::new(outer),
            holes: holes.into_iter().map(Ring::new).collect(),
        }
    }

    /// Convenience constructor from `(x, y)` tuples without holes.
    pub fn from_xy(outer: &[(f64, f64)]) -> Self {
        Self::from_xy_with_holes(outer, &[])
    }

    pub fn from_xy_with_holes(outer: &[(f64, f64)], holes: &[Vec<(f64, f64)>]) -> Self {
        fn to_pts(xy: &[(f64, f64)]) -> Vec<Vec2> {
            xy.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
        }
        Self::new(to_pts(outer), holes.iter().map(|h| to_pts(h.as_slice())).collect())
    }

    /// Outer ring first, then holes.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Same polygon shifted by `v`.
    pub fn translated(&self, v: Vec2) -> Polygon {
        let shift = |r: &Ring| Ring {
            pts: r.pts.iter().map(|p| p + v).collect(),
        };
        Polygon {
            outer: shift(&self.outer),
            holes: self.holes.iter().map(shift).collect(),
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl BBox {
    /// Bounds of a point set; `None` when empty.
    pub fn of_points<'a>(pts: impl IntoIterator<Item = &'a Vec2>) -> Option<BBox> {
        let mut it = pts.into_iter();
        let first = *it.next()?;
        let mut b = BBox {
            min: first,
            max: first,
        };
        for p in it {
            b.min = b.min.inf(p);
            b.max = b.max.sup(p);
        }
        Some(b)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
    #[inline]
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }
    /// `(min_x, min_y, max_x, max_y)`.
    #[inline]
    pub fn to_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min.x, self.min.y, self.max.x, self.max.y)
    }
}
