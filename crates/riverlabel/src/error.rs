//! Errors surfaced by the geometry kernel, the pole search and the placer.
//!
//! Only `EmptyBatch` and `InvalidConfig` are meant to reach callers of the batch
//! API; geometry failures are folded into per-polygon placements.

use thiserror::Error;

/// Errors surfaced by label placement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabelError {
    /// Empty, non-finite, too-few-vertex or zero-area polygon.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    /// Inward offset removed all interior. Recoverable: the placer drops the padding.
    #[error("inward buffer of {margin} collapsed the polygon")]
    BufferCollapsed { margin: f64 },

    /// Pole search ran out of its iteration budget before meeting the tolerance.
    #[error("pole search did not converge within {iterations} iterations")]
    NonConvergence { iterations: usize },

    /// Parameter outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Batch call without any polygon.
    #[error("empty polygon batch")]
    EmptyBatch,
}

/// Result type for label placement.
pub type LabelResult<T> = Result<T, LabelError>;
