//! 2D geometry kernel for river polygons.
//!
//! Purpose
//! - Polygon predicates needed by label placement: membership, distance to the
//!   boundary, area, centroid, interior point, bounds, convex hull.
//! - Inward offset (`buffer_inward`) for padding.
//!
//! Conventions
//! - Points are `nalgebra::Vector2<f64>` (`Vec2`).
//! - Boundary points count as inside. Holes are excluded by the even-odd rule.
//! - Free functions validate their input and fail with `DegenerateGeometry`;
//!   the `Polygon` methods they wrap do not.

mod buffer;
mod kernel;
pub mod rand;
mod types;
mod util;

pub use buffer::buffer_inward;
pub use kernel::{
    area, bounding_box, centroid, contains_point, distance_to_boundary, interior_point,
};
pub use types::{BBox, Polygon, Ring, Vec2};
pub use util::convex_hull;

pub(crate) use types::EPS;
pub(crate) use util::segments_cross;
