//! Polygon predicates: membership, boundary distance, area, centroid, bounds.
//!
//! Methods on `Polygon` are infallible and meant for hot loops (pole search,
//! footprint checks) after the caller validated the polygon once. The free
//! functions validate first and report `DegenerateGeometry`.

use super::types::{BBox, Polygon, Ring, Vec2, EPS};
use super::util::{on_segment, segment_distance};
use crate::error::{LabelError, LabelResult};

impl Polygon {
    /// Outer ring has at least three vertices and all coordinates are finite.
    pub fn check(&self) -> LabelResult<()> {
        if self.outer.len() < 3 {
            return Err(LabelError::DegenerateGeometry(
                "outer ring needs at least 3 distinct vertices",
            ));
        }
        let finite = self
            .rings()
            .flat_map(|r| r.pts.iter())
            .all(|p| p.x.is_finite() && p.y.is_finite());
        if !finite {
            return Err(LabelError::DegenerateGeometry("non-finite coordinate"));
        }
        Ok(())
    }

    /// `check` plus a non-vanishing area (relative to the bounding box). Returns the area.
    pub fn check_area(&self) -> LabelResult<f64> {
        self.check()?;
        let area = self.area();
        let diag = self.bbox().map(|b| b.diagonal()).unwrap_or(0.0);
        if !(area > EPS * diag * diag) {
            return Err(LabelError::DegenerateGeometry("polygon has zero area"));
        }
        Ok(area)
    }

    /// Outer area minus hole areas.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| h.signed_area().abs()).sum();
        self.outer.signed_area().abs() - holes
    }

    /// Bounds of the outer ring.
    pub fn bbox(&self) -> Option<BBox> {
        BBox::of_points(&self.outer.pts)
    }

    /// Interior or boundary membership (even-odd over all rings).
    pub fn contains(&self, p: Vec2) -> bool {
        let mut inside = false;
        for ring in self.rings() {
            for (a, b) in ring.edges() {
                if on_segment(p, a, b) {
                    return true;
                }
                if (a.y > p.y) != (b.y > p.y) {
                    let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                    if p.x < x {
                        inside = !inside;
                    }
                }
            }
        }
        inside
    }

    /// Distance to the nearest edge of any ring; `INFINITY` for a polygon without edges.
    pub fn boundary_distance(&self, p: Vec2) -> f64 {
        self.rings()
            .flat_map(|r| r.edges())
            .map(|(a, b)| segment_distance(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Boundary distance, negated outside the polygon.
    #[inline]
    pub fn signed_distance(&self, p: Vec2) -> f64 {
        let d = self.boundary_distance(p);
        if self.contains(p) {
            d
        } else {
            -d
        }
    }

    /// Area-weighted centroid with holes subtracted; `None` without area.
    pub fn centroid_unchecked(&self) -> Option<Vec2> {
        let (oa, oc) = ring_moments(&self.outer)?;
        let mut w = oa.abs();
        let mut acc = oc * w;
        for h in &self.holes {
            if let Some((ha, hc)) = ring_moments(h) {
                w -= ha.abs();
                acc -= hc * ha.abs();
            }
        }
        if w <= 0.0 {
            return None;
        }
        let c = acc / w;
        (c.x.is_finite() && c.y.is_finite()).then_some(c)
    }

    /// Representative point strictly inside the polygon.
    ///
    /// Scans a few horizontal lines and returns the midpoint of the widest
    /// interior interval found.
    pub fn interior_point_unchecked(&self) -> Option<Vec2> {
        let b = self.bbox()?;
        let h = b.height();
        let mut best: Option<(f64, Vec2)> = None;
        for frac in [0.5, 0.375, 0.625, 0.25, 0.75, 0.125, 0.875] {
            let y = b.min.y + h * frac;
            let mut xs: Vec<f64> = self
                .rings()
                .flat_map(|r| r.edges())
                .filter(|(a, b)| (a.y > y) != (b.y > y))
                .map(|(a, b)| a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y))
                .collect();
            xs.sort_by(f64::total_cmp);
            for pair in xs.chunks_exact(2) {
                let width = pair[1] - pair[0];
                if width > 0.0 && best.as_ref().is_none_or(|(w, _)| width > *w) {
                    best = Some((width, Vec2::new(0.5 * (pair[0] + pair[1]), y)));
                }
            }
        }
        best.map(|(_, p)| p)
    }
}

/// Signed area and centroid of one ring.
fn ring_moments(ring: &Ring) -> Option<(f64, Vec2)> {
    let a = ring.signed_area();
    if a == 0.0 || !a.is_finite() {
        return None;
    }
    let mut c = Vec2::zeros();
    for (p, q) in ring.edges() {
        let f = p.x * q.y - q.x * p.y;
        c += (p + q) * f;
    }
    Some((a, c / (6.0 * a)))
}

/// Point-in-polygon (boundary counts as inside; holes excluded).
pub fn contains_point(polygon: &Polygon, p: Vec2) -> LabelResult<bool> {
    polygon.check()?;
    Ok(polygon.contains(p))
}

/// Minimum distance from `p` to any edge of the outer ring or holes. 0 on an edge.
pub fn distance_to_boundary(polygon: &Polygon, p: Vec2) -> LabelResult<f64> {
    polygon.check()?;
    Ok(polygon.boundary_distance(p))
}

/// `(min_x, min_y, max_x, max_y)` of the outer ring.
pub fn bounding_box(polygon: &Polygon) -> LabelResult<BBox> {
    polygon.check()?;
    polygon
        .bbox()
        .ok_or(LabelError::DegenerateGeometry("empty outer ring"))
}

/// Polygon area (outer minus holes).
pub fn area(polygon: &Polygon) -> LabelResult<f64> {
    polygon.check()?;
    Ok(polygon.area())
}

/// Area-weighted centroid (may lie outside for concave shapes).
pub fn centroid(polygon: &Polygon) -> LabelResult<Vec2> {
    polygon.check_area()?;
    polygon
        .centroid_unchecked()
        .ok_or(LabelError::DegenerateGeometry("centroid undefined"))
}

/// A point guaranteed to lie inside the polygon.
pub fn interior_point(polygon: &Polygon) -> LabelResult<Vec2> {
    polygon.check_area()?;
    polygon
        .interior_point_unchecked()
        .ok_or(LabelError::DegenerateGeometry("no interior found"))
}
