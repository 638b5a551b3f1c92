//! Label placement inside river polygons.
//!
//! Given a polygon outlining a river segment, compute where a name label goes
//! (the pole of inaccessibility of the padded polygon), how it is rotated (the
//! flow direction) and whether it fits.
//!
//! Modules
//! - `geom2`: polygon kernel (membership, boundary distance, inward buffer,
//!   hull) and seeded river generators.
//! - `pole`: pole-of-inaccessibility search.
//! - `orient`: minimum-area rectangle and the `FlowDirection` strategies.
//! - `placer`: per-polygon placement and the parallel batch API.
//!
//! Logging goes through `tracing`; the crate installs no subscriber.

pub mod error;
pub mod geom2;
pub mod orient;
pub mod placer;
pub mod pole;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{LabelError, LabelResult};
pub use geom2::{Polygon, Vec2};
pub use placer::{place_label, LabelCfg, LabelPlacer, Placement};

/// Common exports for callers.
pub mod prelude {
    pub use crate::error::{LabelError, LabelResult};
    pub use crate::geom2::rand::{draw_river, ReplayToken, RiverCfg};
    pub use crate::geom2::{buffer_inward, contains_point, distance_to_boundary, BBox, Polygon, Vec2};
    pub use crate::orient::{
        canonical_rotation, min_area_rect, FlowDirection, MinAreaRect, OrientedRect, PrincipalAxis,
    };
    pub use crate::placer::{place_label, LabelCfg, LabelPlacer, Placement, TextMetrics};
    pub use crate::pole::{find_pole, find_pole_with, Pole, PoleCfg};
}
