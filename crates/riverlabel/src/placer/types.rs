use serde::{Deserialize, Serialize};

use crate::error::{LabelError, LabelResult};
use crate::pole::PoleCfg;

/// Placement configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelCfg {
    /// Inward margin from the polygon boundary, in polygon units.
    pub padding: f64,
    /// Label height in polygon units. Enters the fit verdict only through
    /// `footprint_check`; otherwise it only sizes `TextMetrics`.
    pub font_size: f64,
    /// Average glyph advance as a fraction of the font size. Same scope as `font_size`.
    pub char_width_ratio: f64,
    /// Pole search tolerance.
    pub precision: f64,
    /// Pole search budget (cell splits).
    pub max_iterations: usize,
    /// Slack on the clearance comparison in the fit verdict.
    pub fit_eps: f64,
    /// Also require the rotated text box to lie inside the search polygon.
    pub footprint_check: bool,
}

impl Default for LabelCfg {
    fn default() -> Self {
        Self {
            padding: 3.0,
            font_size: 12.0,
            char_width_ratio: 0.6,
            precision: 0.5,
            max_iterations: 10_000,
            fit_eps: 1e-6,
            footprint_check: false,
        }
    }
}

impl LabelCfg {
    pub fn validate(&self) -> LabelResult<()> {
        let finite_nonneg = |x: f64| x.is_finite() && x >= 0.0;
        let finite_pos = |x: f64| x.is_finite() && x > 0.0;
        if !finite_nonneg(self.padding) {
            return Err(LabelError::InvalidConfig("padding must be finite and non-negative"));
        }
        if !finite_pos(self.font_size) {
            return Err(LabelError::InvalidConfig("font size must be finite and positive"));
        }
        if !finite_pos(self.char_width_ratio) {
            return Err(LabelError::InvalidConfig(
                "character width ratio must be finite and positive",
            ));
        }
        if !finite_pos(self.precision) {
            return Err(LabelError::InvalidConfig("pole precision must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(LabelError::InvalidConfig("iteration budget must be at least 1"));
        }
        if !finite_nonneg(self.fit_eps) {
            return Err(LabelError::InvalidConfig("fit epsilon must be finite and non-negative"));
        }
        Ok(())
    }

    pub fn pole_cfg(&self) -> PoleCfg {
        PoleCfg {
            precision: self.precision,
            max_iterations: self.max_iterations,
        }
    }

    pub fn metrics(&self, text: &str) -> TextMetrics {
        TextMetrics::estimate(text, self.font_size, self.char_width_ratio)
    }
}

/// Estimated extent of a single-line label.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

impl TextMetrics {
    /// Fixed advance per character; no shaping.
    pub fn estimate(text: &str, font_size: f64, char_width_ratio: f64) -> Self {
        Self {
            width: text.chars().count() as f64 * font_size * char_width_ratio,
            height: font_size,
        }
    }
}

/// Label placement for one polygon.
///
/// Failed polygons carry NaN coordinates, `fits_inside == false` and a
/// `failure` message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    /// Degrees, counter-clockwise from +x, in `(-90, 90]`.
    pub rotation: f64,
    pub fits_inside: bool,
    pub polygon_id: usize,
    pub feature_name: String,
    /// Distance from the label point to the original polygon boundary.
    pub clearance: f64,
    pub available_width: f64,
    pub available_height: f64,
    /// Padding actually honored; 0 after a collapsed buffer.
    pub effective_padding: f64,
    pub degraded: bool,
    pub converged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl Placement {
    pub(crate) fn failed(polygon_id: usize, feature_name: &str, err: &LabelError) -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
            rotation: 0.0,
            fits_inside: false,
            polygon_id,
            feature_name: feature_name.to_owned(),
            clearance: 0.0,
            available_width: 0.0,
            available_height: 0.0,
            effective_padding: 0.0,
            degraded: false,
            converged: false,
            failure: Some(err.to_string()),
        }
    }

    /// `false` for the NaN sentinel of a failed polygon.
    pub fn is_valid(&self) -> bool {
        self.failure.is_none() && self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn available_area(&self) -> f64 {
        self.available_width * self.available_height
    }
}
