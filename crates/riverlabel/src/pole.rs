//! Pole of inaccessibility (visual center) by best-first cell subdivision.
//!
//! Purpose
//! - Find the interior point farthest from the polygon boundary, i.e. the
//!   center of the largest inscribed circle, to within a given precision.
//!
//! Search
//! - Cover the bounding box with square cells. A cell's score is the signed
//!   boundary distance `d` of its center (negative outside); `d + h·√2` bounds
//!   what any point in the cell can reach (`h` = half side).
//! - Cells live in an index arena; a max-heap of `(bound, centroid distance,
//!   index)` keys decides which cell to split next. Equal bounds prefer the
//!   cell closer to the centroid, then the earlier cell, so the output is
//!   deterministic.
//! - A cell is split into quadrants until its bound cannot beat the best
//!   center by more than `precision`.
//! - The best candidate is seeded with the centroid and a scanline interior
//!   point, so the result is inside the polygon even when the budget runs out.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f64::consts::SQRT_2;

use crate::error::{LabelError, LabelResult};
use crate::geom2::{Polygon, Vec2, EPS};

/// Pole search configuration.
#[derive(Clone, Copy, Debug)]
pub struct PoleCfg {
    /// Absolute tolerance on the clearance, in polygon units.
    pub precision: f64,
    /// Maximum number of cell splits before giving up on the tolerance.
    pub max_iterations: usize,
}

impl Default for PoleCfg {
    fn default() -> Self {
        Self {
            precision: 0.5,
            max_iterations: 10_000,
        }
    }
}

/// Search result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pole {
    pub point: Vec2,
    /// Distance from `point` to the nearest boundary edge.
    pub distance: f64,
    /// Cell splits performed.
    pub iterations: usize,
    /// Cells evaluated, initial grid included.
    pub cells: usize,
    /// `false` when the iteration budget ran out before the tolerance was met.
    pub converged: bool,
}

impl Pole {
    /// Treat a budget overrun as an error.
    pub fn require_converged(self) -> LabelResult<Pole> {
        if self.converged {
            Ok(self)
        } else {
            Err(LabelError::NonConvergence {
                iterations: self.iterations,
            })
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Cell {
    center: Vec2,
    h: f64,
    d: f64,
    max: f64,
    to_centroid: f64,
}

impl Cell {
    fn new(center: Vec2, h: f64, polygon: &Polygon, centroid: Vec2) -> Self {
        let d = polygon.signed_distance(center);
        Self {
            center,
            h,
            d,
            max: d + h * SQRT_2,
            to_centroid: (center - centroid).norm(),
        }
    }
}

/// Heap key referencing a cell in the arena.
#[derive(Clone, Copy, Debug)]
struct QueueKey {
    max: f64,
    to_centroid: f64,
    idx: usize,
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.max
            .total_cmp(&other.max)
            .then_with(|| other.to_centroid.total_cmp(&self.to_centroid))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}
impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for QueueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for QueueKey {}

/// Arena plus best-first queue.
struct Worklist<'a> {
    polygon: &'a Polygon,
    centroid: Vec2,
    cells: Vec<Cell>,
    queue: BinaryHeap<QueueKey>,
}

impl<'a> Worklist<'a> {
    fn push(&mut self, center: Vec2, h: f64) {
        let cell = Cell::new(center, h, self.polygon, self.centroid);
        let idx = self.cells.len();
        self.cells.push(cell);
        self.queue.push(QueueKey {
            max: cell.max,
            to_centroid: cell.to_centroid,
            idx,
        });
    }

    fn pop(&mut self) -> Option<Cell> {
        self.queue.pop().map(|k| self.cells[k.idx])
    }
}

/// Pole of inaccessibility with the default iteration budget.
pub fn find_pole(polygon: &Polygon, precision: f64) -> LabelResult<Pole> {
    find_pole_with(
        polygon,
        &PoleCfg {
            precision,
            ..PoleCfg::default()
        },
    )
}

/// Pole of inaccessibility.
///
/// Errors: `InvalidConfig` for a non-positive precision, `DegenerateGeometry`
/// for polygons without area.
pub fn find_pole_with(polygon: &Polygon, cfg: &PoleCfg) -> LabelResult<Pole> {
    if !(cfg.precision.is_finite() && cfg.precision > 0.0) {
        return Err(LabelError::InvalidConfig("pole precision must be positive"));
    }
    polygon.check_area()?;
    let bb = polygon
        .bbox()
        .ok_or(LabelError::DegenerateGeometry("empty outer ring"))?;
    let (w, h) = (bb.width(), bb.height());
    let mut cell_size = w.min(h);
    if !(cell_size > 0.0) {
        return Err(LabelError::DegenerateGeometry("zero-width bounds"));
    }
    // The initial grid counts against the budget: at most `max_iterations` cells.
    let budget = cfg.max_iterations.max(1) as f64;
    let grid = |c: f64| (w / c).ceil().max(1.0) * (h / c).ceil().max(1.0);
    if grid(cell_size) > budget {
        cell_size = (w * h / budget).sqrt().max(w.max(h) / budget);
        while grid(cell_size) > budget {
            cell_size *= 1.25;
        }
    }
    let centroid = polygon.centroid_unchecked().unwrap_or_else(|| bb.center());
    let tie = EPS * bb.diagonal();

    let mut work = Worklist {
        polygon,
        centroid,
        cells: Vec::new(),
        queue: BinaryHeap::new(),
    };
    let half = cell_size / 2.0;
    let nx = (w / cell_size).ceil().max(1.0) as usize;
    let ny = (h / cell_size).ceil().max(1.0) as usize;
    for i in 0..nx {
        for j in 0..ny {
            let c = bb.min + Vec2::new(i as f64 * cell_size + half, j as f64 * cell_size + half);
            work.push(c, half);
        }
    }

    let mut best = Cell::new(centroid, 0.0, polygon, centroid);
    let mut seeds = vec![bb.center()];
    seeds.extend(polygon.interior_point_unchecked());
    for s in seeds {
        let c = Cell::new(s, 0.0, polygon, centroid);
        if better(&c, &best, tie) {
            best = c;
        }
    }

    let mut iterations = 0usize;
    let mut converged = true;
    while let Some(cell) = work.pop() {
        if better(&cell, &best, tie) {
            best = cell;
        }
        if cell.max - best.d <= cfg.precision {
            continue;
        }
        if iterations >= cfg.max_iterations {
            converged = false;
            break;
        }
        iterations += 1;
        let q = cell.h / 2.0;
        for (dx, dy) in [(-q, -q), (q, -q), (-q, q), (q, q)] {
            work.push(cell.center + Vec2::new(dx, dy), q);
        }
    }

    if !(best.d > 0.0) {
        return Err(LabelError::DegenerateGeometry("no interior point found"));
    }
    tracing::trace!(
        iterations,
        converged,
        cells = work.cells.len(),
        distance = best.d,
        "pole search finished"
    );
    Ok(Pole {
        point: best.center,
        distance: best.d,
        iterations,
        cells: work.cells.len(),
        converged,
    })
}

/// Larger clearance wins; clearances within `tie` prefer the cell closer to the centroid.
#[inline]
fn better(cand: &Cell, best: &Cell, tie: f64) -> bool {
    if cand.d > best.d + tie {
        return true;
    }
    (cand.d - best.d).abs() <= tie && cand.to_centroid < best.to_centroid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom2::rand::{draw_river, ReplayToken, RiverCfg};
    use nalgebra::vector;
    use proptest::prelude::*;

    fn regular(n: usize, r: f64, c: Vec2) -> Polygon {
        let pts = (0..n)
            .map(|k| {
                let th = std::f64::consts::TAU * k as f64 / n as f64;
                c + vector![th.cos(), th.sin()] * r
            })
            .collect();
        Polygon::new(pts, Vec::new())
    }

    /// Max clearance over a dense grid of the bounding box.
    fn grid_max(p: &Polygon, steps: usize) -> f64 {
        let bb = p.bbox().unwrap();
        let mut best = f64::NEG_INFINITY;
        for i in 0..=steps {
            for j in 0..=steps {
                let q = bb.min
                    + vector![
                        bb.width() * i as f64 / steps as f64,
                        bb.height() * j as f64 / steps as f64
                    ];
                best = best.max(p.signed_distance(q));
            }
        }
        best
    }

    #[test]
    fn square_pole_is_center() {
        let sq = Polygon::from_xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let pole = find_pole(&sq, 0.01).unwrap();
        assert!(pole.converged);
        assert!((pole.point - vector![5.0, 5.0]).norm() < 0.02);
        assert!((pole.distance - 5.0).abs() <= 0.01);
    }

    #[test]
    fn hexagon_pole_is_incenter() {
        let c = vector![3.0, -2.0];
        let hex = regular(6, 10.0, c);
        let prec = 0.01;
        let pole = find_pole(&hex, prec).unwrap();
        let inradius = 10.0 * (std::f64::consts::PI / 6.0).cos();
        assert!((pole.distance - inradius).abs() <= prec);
        assert!((pole.point - c).norm() < 2.0 * prec);
    }

    #[test]
    fn long_rectangle_prefers_centroid_on_flat_ridge() {
        let r = Polygon::from_xy(&[(0.0, 0.0), (100.0, 0.0), (100.0, 10.0), (0.0, 10.0)]);
        let pole = find_pole(&r, 0.5).unwrap();
        assert!((pole.point - vector![50.0, 5.0]).norm() < 1e-6);
        assert!((pole.distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn concave_shapes_no_regret() {
        let u = Polygon::from_xy(&[
            (0.0, 0.0),
            (30.0, 0.0),
            (30.0, 30.0),
            (20.0, 30.0),
            (20.0, 5.0),
            (10.0, 5.0),
            (10.0, 30.0),
            (0.0, 30.0),
        ]);
        let framed = Polygon::from_xy_with_holes(
            &[(0.0, 0.0), (40.0, 0.0), (40.0, 30.0), (0.0, 30.0)],
            &[vec![(8.0, 8.0), (20.0, 8.0), (20.0, 22.0), (8.0, 22.0)]],
        );
        for p in [u, framed] {
            let prec = 0.05;
            let pole = find_pole(&p, prec).unwrap();
            assert!(p.contains(pole.point));
            assert!(grid_max(&p, 120) <= pole.distance + prec + 1e-9);
        }
    }

    #[test]
    fn degenerate_and_invalid_inputs() {
        let flat = Polygon::from_xy(&[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)]);
        assert!(matches!(
            find_pole(&flat, 0.1),
            Err(LabelError::DegenerateGeometry(_))
        ));
        let sq = Polygon::from_xy(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!(matches!(
            find_pole(&sq, 0.0),
            Err(LabelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn exhausted_budget_returns_inside_point() {
        let river = draw_river(RiverCfg::default(), ReplayToken { seed: 5, index: 0 }).unwrap();
        let cfg = PoleCfg {
            precision: 1e-6,
            max_iterations: 3,
        };
        let pole = find_pole_with(&river, &cfg).unwrap();
        assert!(!pole.converged);
        assert!(pole.iterations <= 3);
        assert!(river.contains(pole.point));
        assert!(pole.distance > 0.0);
        assert_eq!(
            pole.require_converged(),
            Err(LabelError::NonConvergence { iterations: pole.iterations })
        );
    }

    #[test]
    fn budget_caps_work_on_extreme_strip() {
        let strip = Polygon::from_xy(&[(0.0, 0.0), (1e6, 0.0), (1e6, 1e-2), (0.0, 1e-2)]);
        let cfg = PoleCfg {
            precision: 0.5,
            max_iterations: 100,
        };
        let pole = find_pole_with(&strip, &cfg).unwrap();
        assert!(pole.iterations <= cfg.max_iterations);
        // Initial grid plus four children per split.
        assert!(pole.cells <= 5 * cfg.max_iterations, "{} cells", pole.cells);
        assert!(strip.contains(pole.point));

        let river = draw_river(RiverCfg::default(), ReplayToken { seed: 6, index: 1 }).unwrap();
        let tight = PoleCfg {
            precision: 1e-6,
            max_iterations: 2,
        };
        let pole = find_pole_with(&river, &tight).unwrap();
        assert!(pole.cells <= 5 * tight.max_iterations);
    }

    #[test]
    fn repeated_search_is_identical() {
        let river = draw_river(RiverCfg::default(), ReplayToken { seed: 9, index: 4 }).unwrap();
        let a = find_pole(&river, 0.1).unwrap();
        let b = find_pole(&river, 0.1).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn river_pole_no_regret(index in 0u64..1000) {
            let cfg = RiverCfg { random_heading: true, ..RiverCfg::default() };
            let river = draw_river(cfg, ReplayToken { seed: 21, index }).unwrap();
            let prec = 0.1;
            let pole = find_pole(&river, prec).unwrap();
            prop_assert!(pole.converged);
            prop_assert!(river.contains(pole.point));
            prop_assert!(grid_max(&river, 200) <= pole.distance + prec + 1e-9);
        }
    }
}
