//! Flow direction of a river polygon.
//!
//! - `min_area_rect`: minimum-area enclosing rectangle by rotating calipers
//!   over the convex hull of the outer ring.
//! - `FlowDirection`: strategy seam for "rotation from shape" heuristics.
//!   `MinAreaRect` (long axis of the rectangle) is the default;
//!   `PrincipalAxis` uses the major axis of the area second moments.
//!
//! Rotation convention: degrees, counter-clockwise from +x, canonicalized to
//! `(-90, 90]` so that opposite directions are identified.

use nalgebra::{Matrix2, SymmetricEigen};

use crate::error::{LabelError, LabelResult};
use crate::geom2::{convex_hull, Polygon, Vec2, EPS};

/// Minimum-area rectangle enclosing a polygon.
///
/// Invariant: `width >= height`; `rotation` is the direction of the width side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedRect {
    pub center: Vec2,
    pub width: f64,
    pub height: f64,
    /// Degrees in `(-90, 90]`.
    pub rotation: f64,
}

impl OrientedRect {
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Unit vector along the long side.
    #[inline]
    pub fn axis(&self) -> Vec2 {
        let th = self.rotation.to_radians();
        Vec2::new(th.cos(), th.sin())
    }

    /// Corners in counter-clockwise order.
    pub fn corners(&self) -> [Vec2; 4] {
        let u = self.axis() * (0.5 * self.width);
        let v = Vec2::new(-self.axis().y, self.axis().x) * (0.5 * self.height);
        let c = self.center;
        [c - u - v, c + u - v, c + u + v, c - u + v]
    }
}

/// Map an angle in degrees to `(-90, 90]`.
pub fn canonical_rotation(deg: f64) -> f64 {
    let a = deg.rem_euclid(180.0);
    if a > 90.0 {
        a - 180.0
    } else {
        a
    }
}

/// Minimum-area oriented bounding rectangle of the outer ring.
///
/// Ties between hull edges keep the first edge in hull order. Collinear input
/// fails with `DegenerateGeometry`.
pub fn min_area_rect(polygon: &Polygon) -> LabelResult<OrientedRect> {
    polygon.check()?;
    let hull = convex_hull(&polygon.outer.pts)
        .filter(|h| h.len() >= 3)
        .ok_or(LabelError::DegenerateGeometry("hull has fewer than 3 vertices"))?;
    let scale = polygon.bbox().map(|b| b.diagonal()).unwrap_or(0.0);

    struct Caliper {
        area: f64,
        u: Vec2,
        v: Vec2,
        s: (f64, f64),
        t: (f64, f64),
    }
    let n = hull.len();
    let mut best: Option<Caliper> = None;
    for k in 0..n {
        let e = hull[(k + 1) % n] - hull[k];
        let len = e.norm();
        if !(len > 0.0) {
            continue;
        }
        let u = e / len;
        let v = Vec2::new(-u.y, u.x);
        let mut s = (f64::INFINITY, f64::NEG_INFINITY);
        let mut t = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &hull {
            let (ps, pt) = (p.dot(&u), p.dot(&v));
            s = (s.0.min(ps), s.1.max(ps));
            t = (t.0.min(pt), t.1.max(pt));
        }
        let area = (s.1 - s.0) * (t.1 - t.0);
        if best
            .as_ref()
            .is_none_or(|b| area < b.area - 1e-12 * b.area)
        {
            best = Some(Caliper { area, u, v, s, t });
        }
    }
    let b = best.ok_or(LabelError::DegenerateGeometry("hull has no edges"))?;
    if !(b.area > EPS * scale * scale) {
        return Err(LabelError::DegenerateGeometry("collinear points"));
    }
    let (ext_u, ext_v) = (b.s.1 - b.s.0, b.t.1 - b.t.0);
    let center = b.u * (0.5 * (b.s.0 + b.s.1)) + b.v * (0.5 * (b.t.0 + b.t.1));
    let (width, height, axis) = if ext_u >= ext_v {
        (ext_u, ext_v, b.u)
    } else {
        (ext_v, ext_u, b.v)
    };
    Ok(OrientedRect {
        center,
        width,
        height,
        rotation: canonical_rotation(axis.y.atan2(axis.x).to_degrees()),
    })
}

/// Strategy deriving a label rotation (degrees, `(-90, 90]`) from a polygon.
pub trait FlowDirection: Sync {
    fn rotation(&self, polygon: &Polygon) -> LabelResult<f64>;
}

/// Long axis of the minimum-area rectangle.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinAreaRect;

impl FlowDirection for MinAreaRect {
    fn rotation(&self, polygon: &Polygon) -> LabelResult<f64> {
        Ok(min_area_rect(polygon)?.rotation)
    }
}

/// Major axis of the outer ring's area second moments.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrincipalAxis;

impl FlowDirection for PrincipalAxis {
    fn rotation(&self, polygon: &Polygon) -> LabelResult<f64> {
        polygon.check_area()?;
        let ring = &polygon.outer;
        // Moments relative to the first vertex to keep magnitudes small.
        let o = ring.pts[0];
        let (mut a, mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        for (p, q) in ring.edges() {
            let (p, q) = (p - o, q - o);
            let f = p.x * q.y - q.x * p.y;
            a += f / 2.0;
            sx += f * (p.x + q.x) / 6.0;
            sy += f * (p.y + q.y) / 6.0;
            sxx += f * (p.x * p.x + p.x * q.x + q.x * q.x) / 12.0;
            syy += f * (p.y * p.y + p.y * q.y + q.y * q.y) / 12.0;
            sxy += f * (2.0 * p.x * p.y + p.x * q.y + q.x * p.y + 2.0 * q.x * q.y) / 24.0;
        }
        let (cx, cy) = (sx / a, sy / a);
        let cov = Matrix2::new(
            sxx / a - cx * cx,
            sxy / a - cx * cy,
            sxy / a - cx * cy,
            syy / a - cy * cy,
        );
        let eig = SymmetricEigen::new(cov);
        let major = if eig.eigenvalues[0] >= eig.eigenvalues[1] { 0 } else { 1 };
        let axis = eig.eigenvectors.column(major);
        if !(axis[0].is_finite() && axis[1].is_finite()) {
            return Err(LabelError::DegenerateGeometry("second moments undefined"));
        }
        Ok(canonical_rotation(axis[1].atan2(axis[0]).to_degrees()))
    }
}
