//! Label placement: padding, pole search, rotation and fit verdict per polygon.
//!
//! Purpose
//! - Turn a river polygon into one `Placement`: the pole of inaccessibility of
//!   the padded polygon, the flow rotation of the original polygon and a
//!   `fits_inside` verdict.
//! - Batch placement over independent polygons with rayon, results in input
//!   order.
//!
//! Degradation
//! - A padding that collapses the polygon is dropped (`degraded`,
//!   `effective_padding == 0`) and the pole is searched in the original shape.
//! - Degenerate polygons yield a placement with NaN coordinates,
//!   `fits_inside == false` and a `failure` message; siblings are unaffected.
//! - Only an empty batch or an invalid `LabelCfg` reach the caller as errors.
//!
//! Fit verdict
//! - Pole inside the original polygon and clearance `>= effective_padding - fit_eps`.
//! - With `LabelCfg::footprint_check`, the rotated text box (`TextMetrics`)
//!   must also lie inside the polygon the pole was searched in.

mod place;
mod types;

pub use place::{place_label, LabelPlacer};
pub use types::{LabelCfg, Placement, TextMetrics};

#[cfg(test)]
mod tests;
