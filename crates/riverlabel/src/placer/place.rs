use rayon::prelude::*;

use super::types::{LabelCfg, Placement, TextMetrics};
use crate::error::{LabelError, LabelResult};
use crate::geom2::{buffer_inward, segments_cross, Polygon, Vec2};
use crate::orient::{FlowDirection, MinAreaRect, OrientedRect};
use crate::pole::{find_pole_with, Pole};

/// Share of the inscribed diameter usable along the label.
const AVAILABLE_WIDTH_FRAC: f64 = 0.9;
/// Share of the inscribed diameter usable across the label.
const AVAILABLE_HEIGHT_FRAC: f64 = 0.5;

/// Places labels with a shared configuration and flow-direction strategy.
#[derive(Clone, Debug)]
pub struct LabelPlacer<S = MinAreaRect> {
    cfg: LabelCfg,
    strategy: S,
}

impl Default for LabelPlacer {
    fn default() -> Self {
        Self {
            cfg: LabelCfg::default(),
            strategy: MinAreaRect,
        }
    }
}

impl LabelPlacer {
    pub fn new(cfg: LabelCfg) -> LabelResult<Self> {
        Self::with_strategy(cfg, MinAreaRect)
    }
}

impl<S: FlowDirection> LabelPlacer<S> {
    pub fn with_strategy(cfg: LabelCfg, strategy: S) -> LabelResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg, strategy })
    }

    pub fn cfg(&self) -> &LabelCfg {
        &self.cfg
    }

    /// Place one label. Geometry failures become a failed placement.
    pub fn place_label(&self, polygon: &Polygon, polygon_id: usize, feature_name: &str) -> Placement {
        match self.try_place(polygon, polygon_id, feature_name) {
            Ok(p) => {
                tracing::debug!(
                    polygon_id,
                    x = p.x,
                    y = p.y,
                    rotation = p.rotation,
                    fits_inside = p.fits_inside,
                    "placed label"
                );
                p
            }
            Err(err) => {
                tracing::warn!(polygon_id, feature_name, error = %err, "label placement failed");
                Placement::failed(polygon_id, feature_name, &err)
            }
        }
    }

    fn try_place(&self, polygon: &Polygon, polygon_id: usize, feature_name: &str) -> LabelResult<Placement> {
        let cfg = &self.cfg;
        let pole_cfg = cfg.pole_cfg();
        let padding = cfg.padding;

        let buffered = match buffer_inward(polygon, padding) {
            Ok(b) => Some(b),
            Err(LabelError::BufferCollapsed { .. }) => None,
            Err(e) => return Err(e),
        };
        let padded = match &buffered {
            Some(b) => match find_pole_with(b, &pole_cfg) {
                Ok(pole) if polygon.contains(pole.point) => Some((b, pole)),
                // Offset banks crossed over; the lobe lies outside the river.
                Ok(_) => None,
                // Buffered shape too thin to search; treat like a collapse.
                Err(LabelError::DegenerateGeometry(_)) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };
        let (search, pole, effective_padding, degraded): (&Polygon, Pole, f64, bool) = match padded {
            Some((b, pole)) => (b, pole, padding, false),
            None => {
                tracing::warn!(polygon_id, padding, "padding collapsed the polygon, placing without it");
                (polygon, find_pole_with(polygon, &pole_cfg)?, 0.0, true)
            }
        };
        if !pole.converged {
            tracing::warn!(
                polygon_id,
                iterations = pole.iterations,
                "pole search hit its iteration budget"
            );
        }

        let rotation = self.strategy.rotation(polygon)?;
        let clearance = polygon.boundary_distance(pole.point);
        let mut fits_inside =
            polygon.contains(pole.point) && clearance >= effective_padding - cfg.fit_eps;
        if fits_inside && cfg.footprint_check {
            fits_inside = footprint_fits(search, pole.point, rotation, cfg.metrics(feature_name));
        }

        Ok(Placement {
            x: pole.point.x,
            y: pole.point.y,
            rotation,
            fits_inside,
            polygon_id,
            feature_name: feature_name.to_owned(),
            clearance,
            available_width: 2.0 * pole.distance * AVAILABLE_WIDTH_FRAC,
            available_height: 2.0 * pole.distance * AVAILABLE_HEIGHT_FRAC,
            effective_padding,
            degraded,
            converged: pole.converged,
            failure: None,
        })
    }

    /// One placement per polygon, in input order; polygons are placed in parallel.
    pub fn place_labels_batch(&self, polygons: &[Polygon], feature_name: &str) -> LabelResult<Vec<Placement>> {
        if polygons.is_empty() {
            return Err(LabelError::EmptyBatch);
        }
        let placements: Vec<Placement> = polygons
            .par_iter()
            .enumerate()
            .map(|(i, poly)| self.place_label(poly, i, feature_name))
            .collect();
        tracing::debug!(
            feature_name,
            polygons = placements.len(),
            fitted = placements.iter().filter(|p| p.fits_inside).count(),
            failed = placements.iter().filter(|p| !p.is_valid()).count(),
            "placed label batch"
        );
        Ok(placements)
    }

    /// Single label for a multi-part feature.
    ///
    /// Prefers a fitting placement, then the largest available space, then the
    /// lowest polygon index.
    pub fn best_placement(&self, polygons: &[Polygon], feature_name: &str) -> LabelResult<Placement> {
        let placements = self.place_labels_batch(polygons, feature_name)?;
        let mut best: Option<Placement> = None;
        for p in placements {
            let wins = match &best {
                None => true,
                Some(b) => {
                    (p.fits_inside && !b.fits_inside)
                        || (p.fits_inside == b.fits_inside && p.available_area() > b.available_area())
                }
            };
            if wins {
                best = Some(p);
            }
        }
        best.ok_or(LabelError::EmptyBatch)
    }
}

/// Place one label with default settings and the given padding.
pub fn place_label(polygon: &Polygon, padding: f64, feature_name: &str) -> LabelResult<Placement> {
    let placer = LabelPlacer::new(LabelCfg {
        padding,
        ..LabelCfg::default()
    })?;
    Ok(placer.place_label(polygon, 0, feature_name))
}

/// Rotated text box centered at `center` lies inside `shape`.
///
/// Corners inside, no box side properly crossing a ring edge, and no ring
/// vertex strictly inside the box.
pub(crate) fn footprint_fits(shape: &Polygon, center: Vec2, rotation: f64, metrics: TextMetrics) -> bool {
    let rect = OrientedRect {
        center,
        width: metrics.width,
        height: metrics.height,
        rotation,
    };
    let corners = rect.corners();
    if !corners.iter().all(|c| shape.contains(*c)) {
        return false;
    }
    let u = rect.axis();
    let v = Vec2::new(-u.y, u.x);
    let (hw, hh) = (0.5 * rect.width, 0.5 * rect.height);
    for ring in shape.rings() {
        for (a, b) in ring.edges() {
            let d = a - center;
            if d.dot(&u).abs() < hw && d.dot(&v).abs() < hh {
                return false;
            }
            for k in 0..4 {
                if segments_cross(corners[k], corners[(k + 1) % 4], a, b) {
                    return false;
                }
            }
        }
    }
    true
}
