use super::place::footprint_fits;
use super::*;
use crate::error::{LabelError, LabelResult};
use crate::geom2::rand::{draw_river, ReplayToken, RiverCfg};
use crate::geom2::{Polygon, Vec2};
use crate::orient::{canonical_rotation, FlowDirection, PrincipalAxis};
use nalgebra::{vector, Rotation2};
use proptest::prelude::*;

fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Polygon {
    Polygon::from_xy(&[(x0, y0), (x0 + w, y0), (x0 + w, y0 + h), (x0, y0 + h)])
}

fn rotated_rect(w: f64, h: f64, deg: f64) -> Polygon {
    let rot = Rotation2::new(deg.to_radians());
    let pts = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
        .iter()
        .map(|&(x, y)| rot * vector![x, y] + vector![40.0, -15.0])
        .collect();
    Polygon::new(pts, Vec::new())
}

/// Always reports the same angle.
struct FixedAngle(f64);

impl FlowDirection for FixedAngle {
    fn rotation(&self, _polygon: &Polygon) -> LabelResult<f64> {
        Ok(canonical_rotation(self.0))
    }
}

#[test]
fn rectangle_with_padding_two_fits() {
    let p = place_label(&rect(0.0, 0.0, 100.0, 10.0), 2.0, "ELBE").unwrap();
    assert!((vector![p.x, p.y] - vector![50.0, 5.0]).norm() < 0.5);
    assert!(p.rotation.abs() < 1e-9);
    assert!(p.fits_inside);
    assert!(!p.degraded);
    assert_eq!(p.effective_padding, 2.0);
    assert!(p.clearance >= 2.0);
    assert!(p.converged);
    assert_eq!(p.feature_name, "ELBE");
    assert_eq!(p.polygon_id, 0);
    // Inscribed radius 3 on the padded shape.
    assert!((p.available_width - 5.4).abs() < 0.5);
    assert!((p.available_height - 3.0).abs() < 0.5);
}

#[test]
fn rectangle_with_padding_six_degrades() {
    let p = place_label(&rect(0.0, 0.0, 100.0, 10.0), 6.0, "ELBE").unwrap();
    assert!(p.is_valid());
    assert!(p.degraded);
    assert_eq!(p.effective_padding, 0.0);
    assert!(p.fits_inside);
    assert!((vector![p.x, p.y] - vector![50.0, 5.0]).norm() < 0.5);
    assert!(p.rotation.abs() < 1e-9);
}

#[test]
fn zero_padding_never_degrades() {
    let p = place_label(&rect(0.0, 0.0, 100.0, 10.0), 0.0, "ELBE").unwrap();
    assert!(!p.degraded);
    assert!(p.fits_inside);
    assert!((p.clearance - 5.0).abs() < 0.5);
}

#[test]
fn collapsed_triangle_fails_without_aborting_batch() {
    let flat = Polygon::from_xy(&[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)]);
    let polys = vec![rect(0.0, 0.0, 100.0, 10.0), flat, rect(0.0, 50.0, 60.0, 20.0)];
    let placer = LabelPlacer::new(LabelCfg {
        padding: 2.0,
        ..LabelCfg::default()
    })
    .unwrap();
    let out = placer.place_labels_batch(&polys, "MAIN").unwrap();
    assert_eq!(out.len(), 3);
    assert!(out[0].is_valid() && out[0].fits_inside);
    assert!(!out[1].fits_inside);
    assert!(out[1].x.is_nan() && out[1].y.is_nan());
    assert!(out[1].failure.as_deref().unwrap().contains("degenerate"));
    assert!(out[2].is_valid() && out[2].fits_inside);
    let ids: Vec<usize> = out.iter().map(|p| p.polygon_id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn batch_matches_sequential_order() {
    let polys: Vec<Polygon> = (0..12)
        .map(|i| rect(100.0 * i as f64, 0.0, 80.0, 10.0 + i as f64))
        .collect();
    let placer = LabelPlacer::default();
    let batch = placer.place_labels_batch(&polys, "ODER").unwrap();
    for (i, (poly, got)) in polys.iter().zip(&batch).enumerate() {
        assert_eq!(got, &placer.place_label(poly, i, "ODER"));
        assert!((got.x - (100.0 * i as f64 + 40.0)).abs() < 1.0);
    }
}

#[test]
fn empty_batch_is_reported() {
    let placer = LabelPlacer::default();
    assert_eq!(
        placer.place_labels_batch(&[], "X"),
        Err(LabelError::EmptyBatch)
    );
    assert_eq!(placer.best_placement(&[], "X"), Err(LabelError::EmptyBatch));
}

#[test]
fn repeated_placement_is_identical() {
    let river = draw_river(RiverCfg::default(), ReplayToken { seed: 3, index: 14 }).unwrap();
    let placer = LabelPlacer::default();
    let a = placer.place_label(&river, 7, "DANUBE");
    let b = placer.place_label(&river, 7, "DANUBE");
    assert_eq!(a, b);
}

#[test]
fn invalid_config_is_rejected() {
    assert!(matches!(
        LabelPlacer::new(LabelCfg {
            padding: -1.0,
            ..LabelCfg::default()
        }),
        Err(LabelError::InvalidConfig(_))
    ));
    assert!(matches!(
        LabelPlacer::new(LabelCfg {
            font_size: f64::NAN,
            ..LabelCfg::default()
        }),
        Err(LabelError::InvalidConfig(_))
    ));
    assert!(LabelCfg {
        max_iterations: 0,
        ..LabelCfg::default()
    }
    .validate()
    .is_err());
    assert!(place_label(&rect(0.0, 0.0, 10.0, 10.0), f64::INFINITY, "X").is_err());
    assert!(LabelCfg::default().validate().is_ok());
}

#[test]
fn exhausted_budget_is_flagged() {
    let river = draw_river(RiverCfg::default(), ReplayToken { seed: 4, index: 2 }).unwrap();
    let placer = LabelPlacer::new(LabelCfg {
        padding: 1.0,
        precision: 1e-6,
        max_iterations: 1,
        ..LabelCfg::default()
    })
    .unwrap();
    let p = placer.place_label(&river, 0, "AAR");
    assert!(p.is_valid());
    assert!(!p.converged);
    assert!(river.contains(vector![p.x, p.y]));
}

#[test]
fn text_metrics_estimate() {
    let m = TextMetrics::estimate("ELBE", 12.0, 0.6);
    assert!((m.width - 28.8).abs() < 1e-12);
    assert_eq!(m.height, 12.0);
    // Characters, not bytes.
    let u = LabelCfg::default().metrics("Ölbach");
    assert!((u.width - 6.0 * 12.0 * 0.6).abs() < 1e-12);
}

#[test]
fn footprint_check_uses_label_extent() {
    let r = rect(0.0, 0.0, 100.0, 10.0);
    let small = LabelPlacer::new(LabelCfg {
        padding: 2.0,
        font_size: 4.0,
        footprint_check: true,
        ..LabelCfg::default()
    })
    .unwrap();
    assert!(small.place_label(&r, 0, "ELBE").fits_inside);

    let large = LabelPlacer::new(LabelCfg {
        padding: 2.0,
        footprint_check: true,
        ..LabelCfg::default()
    })
    .unwrap();
    let p = large.place_label(&r, 0, "ELBE");
    assert!(p.is_valid());
    assert!(!p.fits_inside);
}

#[test]
fn font_size_matters_only_with_footprint_check() {
    let r = rect(0.0, 0.0, 100.0, 10.0);
    for font_size in [1.0, 12.0, 100.0] {
        let cfg = LabelCfg {
            padding: 2.0,
            font_size,
            ..LabelCfg::default()
        };
        let p = LabelPlacer::new(cfg).unwrap().place_label(&r, 0, "ELBE");
        assert!(p.fits_inside, "font {font_size}");
        let strict = LabelPlacer::new(LabelCfg {
            footprint_check: true,
            ..cfg
        })
        .unwrap()
        .place_label(&r, 0, "ELBE");
        assert_eq!(strict.fits_inside, font_size < 6.0, "font {font_size}");
    }
}

#[test]
fn footprint_follows_strategy_rotation() {
    let river = rotated_rect(200.0, 20.0, 30.0);
    let cfg = LabelCfg {
        padding: 2.0,
        font_size: 6.0,
        footprint_check: true,
        ..LabelCfg::default()
    };
    let along = LabelPlacer::new(cfg).unwrap().place_label(&river, 0, "RHINE");
    assert!((along.rotation - 30.0).abs() < 1e-7);
    assert!(along.fits_inside);

    let pca = LabelPlacer::with_strategy(cfg, PrincipalAxis)
        .unwrap()
        .place_label(&river, 0, "RHINE");
    assert!((pca.rotation - 30.0).abs() < 1e-7);
    assert!(pca.fits_inside);

    let across = LabelPlacer::with_strategy(cfg, FixedAngle(120.0))
        .unwrap()
        .place_label(&river, 0, "RHINE");
    assert!((across.rotation + 60.0).abs() < 1e-9);
    assert!(!across.fits_inside);
    assert_eq!((across.x, across.y), (along.x, along.y));
}

#[test]
fn footprint_rejects_enclosed_hole() {
    let framed = Polygon::from_xy_with_holes(
        &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
        &[vec![(48.0, 48.0), (52.0, 48.0), (52.0, 52.0), (48.0, 52.0)]],
    );
    let metrics = TextMetrics {
        width: 20.0,
        height: 10.0,
    };
    let c = vector![50.0, 50.0];
    assert!(!footprint_fits(&framed, c, 0.0, metrics));
    assert!(footprint_fits(&rect(0.0, 0.0, 100.0, 100.0), c, 0.0, metrics));
    assert!(footprint_fits(&framed, vector![50.0, 20.0], 15.0, metrics));
    // Corner pokes out of the right edge.
    assert!(!footprint_fits(&framed, vector![95.0, 20.0], 0.0, metrics));
}

#[test]
fn best_placement_prefers_fit_then_space() {
    let placer = LabelPlacer::new(LabelCfg {
        padding: 3.0,
        ..LabelCfg::default()
    })
    .unwrap();
    let narrow = rect(0.0, 0.0, 100.0, 4.0);
    let wide = rect(0.0, 20.0, 100.0, 30.0);
    let best = placer.best_placement(&[narrow, wide], "ISAR").unwrap();
    assert_eq!(best.polygon_id, 1);

    // Long label fits the long channel but not the larger square.
    let strict = LabelPlacer::new(LabelCfg {
        padding: 3.0,
        font_size: 4.0,
        footprint_check: true,
        ..LabelCfg::default()
    })
    .unwrap();
    let name = "A".repeat(40);
    let channel = rect(0.0, 0.0, 300.0, 20.0);
    let pond = rect(0.0, 100.0, 60.0, 60.0);
    let best = strict.best_placement(&[pond, channel], &name).unwrap();
    assert_eq!(best.polygon_id, 1);
    assert!(best.fits_inside);
}

#[test]
fn placement_serializes_flat() {
    let p = place_label(&rect(0.0, 0.0, 100.0, 10.0), 2.0, "ELBE").unwrap();
    let v = serde_json::to_value(&p).unwrap();
    for key in [
        "x",
        "y",
        "rotation",
        "fits_inside",
        "polygon_id",
        "feature_name",
        "clearance",
        "available_width",
        "available_height",
        "effective_padding",
        "degraded",
        "converged",
    ] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
    assert!(v.get("failure").is_none());
    assert_eq!(v["feature_name"], "ELBE");
    let back: Placement = serde_json::from_value(v).unwrap();
    assert_eq!(back.feature_name, p.feature_name);
    assert_eq!(back.fits_inside, p.fits_inside);
    assert!((back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9);

    let cfg: LabelCfg = serde_json::from_str(r#"{"padding": 2.5, "footprint_check": true}"#).unwrap();
    assert_eq!(cfg.padding, 2.5);
    assert!(cfg.footprint_check);
    assert_eq!(cfg.font_size, 12.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]
    #[test]
    fn fit_verdict_is_never_outside(index in 0u64..1000, padding in 0.0f64..8.0) {
        let cfg = RiverCfg { random_heading: true, ..RiverCfg::default() };
        let river = draw_river(cfg, ReplayToken { seed: 31, index }).unwrap();
        let placer = LabelPlacer::new(LabelCfg { padding, ..LabelCfg::default() }).unwrap();
        let p = placer.place_label(&river, 0, "VOLGA");
        prop_assert!(p.is_valid());
        let at = Vec2::new(p.x, p.y);
        prop_assert!(river.contains(at));
        if p.fits_inside {
            prop_assert!(river.boundary_distance(at) >= p.effective_padding - 1e-6);
        }
        prop_assert_eq!(p.degraded, p.effective_padding == 0.0 && padding > 0.0);
    }
}
