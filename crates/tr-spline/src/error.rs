//! Spline-graph construction errors.

use thiserror::Error;

use tr_core::{JunctionId, SplinePointId};

/// Errors produced while building a [`SplineGraph`][crate::SplineGraph].
///
/// A built graph is valid by construction: every segment has positive length
/// and every reference resolves, so traversal never divides by zero.
#[derive(Debug, Error)]
pub enum SplineError {
    #[error("spline point {0} not found in graph")]
    UnknownPoint(SplinePointId),

    #[error("segment starting at {0} has zero length")]
    DegenerateSegment(SplinePointId),

    #[error("spline point {point} already starts junction {existing}")]
    DuplicateJunction {
        point:    SplinePointId,
        existing: JunctionId,
    },

    #[error("junction starting at {0} has no branch with positive weight")]
    EmptyJunction(SplinePointId),

    #[error("spline point {0} has a non-finite position")]
    NonFinitePosition(SplinePointId),

    #[error("spline point {point} has invalid curve radius {radius}")]
    InvalidRadius {
        point:  SplinePointId,
        radius: f32,
    },
}

pub type SplineResult<T> = Result<T, SplineError>;
