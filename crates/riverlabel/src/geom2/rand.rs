//! Random test polygons (convex radial blobs and meandering river strips).
//!
//! Purpose
//! - Deterministic inputs for property tests and benchmarks. Every draw is
//!   keyed by a replay token `(seed, index)` mixed into a single RNG, so a
//!   failing case can be reproduced from its token alone.
//!
//! Model
//! - Convex: `n` jittered angles on [0, 2π), jittered radii, convex hull.
//! - River: a sine-meander centerline with a random phase, banks at a
//!   jittered half-width along the centerline normal, then rotated by a
//!   heading and shifted. Default parameters keep the bank curvature radius above the
//!   half-width so banks do not fold over.

use nalgebra::Rotation2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{Polygon, Vec2};
use super::util::convex_hull;

/// Vertex count distribution.
#[derive(Clone, Copy, Debug)]
pub enum VertexCount {
    Fixed(usize),
    Uniform { min: usize, max: usize },
}
impl VertexCount {
    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        match *self {
            VertexCount::Fixed(n) => n.max(3),
            VertexCount::Uniform { min, max } => {
                let lo = min.max(3);
                let hi = max.max(lo);
                rng.gen_range(lo..=hi)
            }
        }
    }
}

/// Radial-jitter sampler configuration for convex polygons.
#[derive(Clone, Copy, Debug)]
pub struct RadialCfg {
    pub vertex_count: VertexCount,
    /// Angular jitter as a fraction of the base spacing Δ=2π/n. Clamped to [0, 0.49].
    pub angle_jitter_frac: f64,
    /// Radii = `base_radius * (1 + u)`, with `u∈[-radial_jitter, radial_jitter]`.
    pub radial_jitter: f64,
    pub base_radius: f64,
    pub center: Vec2,
}
impl Default for RadialCfg {
    fn default() -> Self {
        Self {
            vertex_count: VertexCount::Fixed(12),
            angle_jitter_frac: 0.3,
            radial_jitter: 0.25,
            base_radius: 10.0,
            center: Vec2::zeros(),
        }
    }
}

/// Meandering strip configuration.
#[derive(Clone, Copy, Debug)]
pub struct RiverCfg {
    /// Number of centerline samples (bank vertices per side).
    pub samples: usize,
    /// Centerline extent along its local axis.
    pub length: f64,
    pub half_width: f64,
    /// Relative half-width jitter per sample, clamped to [0, 0.9].
    pub width_jitter: f64,
    pub meander_amplitude: f64,
    pub meander_wavelength: f64,
    /// Draw a uniform heading in [0, 2π); otherwise the strip runs along +x.
    pub random_heading: bool,
    pub origin: Vec2,
}
impl Default for RiverCfg {
    fn default() -> Self {
        Self {
            samples: 24,
            length: 200.0,
            half_width: 5.0,
            width_jitter: 0.3,
            meander_amplitude: 15.0,
            meander_wavelength: 120.0,
            random_heading: false,
            origin: Vec2::zeros(),
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}
impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Draw a random convex polygon (CCW) around `cfg.center`.
pub fn draw_convex_radial(cfg: RadialCfg, tok: ReplayToken) -> Option<Polygon> {
    let mut rng = tok.to_std_rng();
    let n = cfg.vertex_count.sample(&mut rng);
    let aj = cfg.angle_jitter_frac.clamp(0.0, 0.49);
    let rj = cfg.radial_jitter.max(0.0);
    let r0 = cfg.base_radius.max(1e-9);
    let delta = std::f64::consts::TAU / (n as f64);
    let phase = rng.gen::<f64>() * std::f64::consts::TAU;
    let pts: Vec<Vec2> = (0..n)
        .map(|k| {
            let jitter = (rng.gen::<f64>() * 2.0 - 1.0) * aj * delta;
            let th = phase + (k as f64) * delta + jitter;
            let u = (rng.gen::<f64>() * 2.0 - 1.0) * rj;
            let r = (1.0 + u).max(1e-6) * r0;
            cfg.center + Vec2::new(th.cos() * r, th.sin() * r)
        })
        .collect();
    let hull = convex_hull(&pts)?;
    (hull.len() >= 3).then(|| Polygon::new(hull, Vec::new()))
}

/// Draw a meandering river strip (CCW outer ring, no holes).
pub fn draw_river(cfg: RiverCfg, tok: ReplayToken) -> Option<Polygon> {
    let n = cfg.samples.max(2);
    if !(cfg.length > 0.0 && cfg.half_width > 0.0 && cfg.meander_wavelength > 0.0) {
        return None;
    }
    let mut rng = tok.to_std_rng();
    let wj = cfg.width_jitter.clamp(0.0, 0.9);
    let k = std::f64::consts::TAU / cfg.meander_wavelength;
    let phase = rng.gen::<f64>() * std::f64::consts::TAU;
    let heading = if cfg.random_heading {
        rng.gen::<f64>() * std::f64::consts::TAU
    } else {
        0.0
    };
    let rot = Rotation2::new(heading);

    let mut right = Vec::with_capacity(n);
    let mut left = Vec::with_capacity(n);
    for i in 0..n {
        let x = cfg.length * (i as f64) / ((n - 1) as f64);
        let y = cfg.meander_amplitude * (k * x + phase).sin();
        let slope = cfg.meander_amplitude * k * (k * x + phase).cos();
        let normal = Vec2::new(-slope, 1.0).normalize();
        let w = cfg.half_width * (1.0 + (rng.gen::<f64>() * 2.0 - 1.0) * wj);
        let c = Vec2::new(x, y);
        right.push(cfg.origin + rot * (c - normal * w));
        left.push(cfg.origin + rot * (c + normal * w));
    }
    left.reverse();
    right.extend(left);
    Some(Polygon::new(right, Vec::new()))
}
