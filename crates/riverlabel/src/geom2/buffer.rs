//! Inward offset ("negative buffer") of polygons.
//!
//! Each ring edge is shifted to its interior side and consecutive offset lines
//! are re-intersected (mitre joins). Convex corners are exact; reflex corners
//! keep the mitre, which lies inside the true erosion. Edges whose offset
//! reverses direction are removed one at a time, earliest collapse first, and
//! their neighbours re-intersected; antiparallel neighbours closer than twice
//! the margin (spikes, narrow channels) are dropped together. The outer ring
//! collapsing yields `BufferCollapsed`; holes grow and never collapse.
//!
//! Self-intersections at narrow necks are not resolved.

use super::types::{BBox, Polygon, Ring, Vec2, EPS};
use super::util::{left_normal, line_intersection};
use crate::error::{LabelError, LabelResult};

/// Supporting line of one ring edge, interior on the left: `n·x = c` at offset 0.
#[derive(Clone, Copy, Debug)]
struct EdgeLine {
    n: Vec2,
    c: f64,
    dir: Vec2,
    start: Vec2,
}

impl EdgeLine {
    fn through(a: Vec2, b: Vec2) -> Option<Self> {
        let n = left_normal(a, b)?;
        Some(Self {
            n,
            c: n.dot(&a),
            dir: Vec2::new(n.y, -n.x),
            start: a,
        })
    }
}

/// Joint of two consecutive edge lines shifted inward by `t`.
///
/// Parallel lines pointing the same way join at the next edge's shifted start;
/// antiparallel neighbours mean the strip between them is gone.
fn corner(prev: &EdgeLine, next: &EdgeLine, t: f64) -> Option<Vec2> {
    match line_intersection(prev.n, prev.c + t, next.n, next.c + t) {
        Some(p) => Some(p),
        None if prev.n.dot(&next.n) > 0.0 => Some(next.start + next.n * t),
        None => None,
    }
}

/// First consecutive antiparallel pair whose strip is narrower than `2t`.
///
/// Returns the index of the earlier line of the pair.
fn closed_strip(lines: &[EdgeLine], t: f64) -> Option<usize> {
    let m = lines.len();
    (0..m).find(|&i| {
        let (a, b) = (&lines[i], &lines[(i + 1) % m]);
        let parallel = (a.n.x * b.n.y - a.n.y * b.n.x).abs() < EPS;
        // Interior is c_a <= n·x <= -c_b.
        parallel && a.n.dot(&b.n) < 0.0 && -(a.c + b.c) < 2.0 * t
    })
}

/// Offset a ring (interior on the left of every edge) by `t`.
///
/// Returns `None` when fewer than three edges survive.
fn offset_ring(ring: &Ring, t: f64) -> Option<Vec<Vec2>> {
    let mut lines: Vec<EdgeLine> = ring
        .edges()
        .filter_map(|(a, b)| EdgeLine::through(a, b))
        .collect();
    loop {
        let m = lines.len();
        if m < 3 {
            return None;
        }
        if let Some(i) = closed_strip(&lines, t) {
            let j = (i + 1) % m;
            lines.remove(i.max(j));
            lines.remove(i.min(j));
            continue;
        }
        let joints = |t: f64| -> Option<Vec<Vec2>> {
            (0..m)
                .map(|i| corner(&lines[(i + m - 1) % m], &lines[i], t))
                .collect()
        };
        let base = joints(0.0)?;
        let moved = joints(t)?;

        // Edge lengths shrink linearly in t; the first to reach zero goes first.
        let mut first: Option<(f64, usize)> = None;
        for i in 0..m {
            let j = (i + 1) % m;
            let dir = lines[i].dir;
            let l0 = (base[j] - base[i]).dot(&dir);
            let lt = (moved[j] - moved[i]).dot(&dir);
            if lt < -EPS {
                let when = if l0 <= 0.0 { 0.0 } else { t * l0 / (l0 - lt) };
                if first.is_none_or(|(w, _)| when < w) {
                    first = Some((when, i));
                }
            }
        }
        match first {
            None => return Some(moved),
            Some((_, i)) => {
                lines.remove(i);
            }
        }
    }
}

/// Ring copy with the requested orientation (counter-clockwise or clockwise).
fn oriented(ring: &Ring, ccw: bool) -> Ring {
    if (ring.signed_area() > 0.0) == ccw {
        ring.clone()
    } else {
        ring.reversed()
    }
}

/// Clockwise box around a hole grown by `margin`; contains the grown hole.
fn hole_envelope(hole: &Ring, margin: f64) -> Option<Ring> {
    let b = BBox::of_points(&hole.pts)?;
    let (x0, y0) = (b.min.x - margin, b.min.y - margin);
    let (x1, y1) = (b.max.x + margin, b.max.y + margin);
    Some(Ring::new(vec![
        Vec2::new(x0, y0),
        Vec2::new(x0, y1),
        Vec2::new(x1, y1),
        Vec2::new(x1, y0),
    ]))
}

/// Shrink `polygon` by `margin` (Minkowski erosion, approximated at reflex corners).
///
/// - `margin == 0` returns a copy.
/// - `Err(BufferCollapsed)` when no interior remains.
/// - Negative or non-finite margins are `InvalidConfig`.
pub fn buffer_inward(polygon: &Polygon, margin: f64) -> LabelResult<Polygon> {
    if !margin.is_finite() || margin < 0.0 {
        return Err(LabelError::InvalidConfig(
            "buffer margin must be finite and non-negative",
        ));
    }
    polygon.check_area()?;
    if margin == 0.0 {
        return Ok(polygon.clone());
    }
    let collapsed = LabelError::BufferCollapsed { margin };
    let scale = polygon.bbox().map(|b| b.diagonal()).unwrap_or(0.0);

    let outer = offset_ring(&oriented(&polygon.outer, true), margin)
        .map(Ring::new)
        .ok_or_else(|| collapsed.clone())?;
    if outer.len() < 3 || !(outer.signed_area() > EPS * scale * scale) {
        return Err(collapsed);
    }

    let holes = polygon
        .holes
        .iter()
        .filter(|h| h.len() >= 3)
        .filter_map(|h| {
            offset_ring(&oriented(h, false), margin)
                .map(Ring::new)
                .filter(|r| r.len() >= 3 && r.signed_area() < 0.0)
                .or_else(|| hole_envelope(h, margin))
        })
        .collect();

    Ok(Polygon { outer, holes })
}
