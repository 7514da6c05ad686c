//! Engine-wide error type.
//!
//! Sub-crates define their own error enums and wrap `TrError` as one variant
//! via `#[from]` where configuration problems can surface.

use thiserror::Error;

use crate::{AgentId, SplinePointId};

/// The top-level error type for `tr-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum TrError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("spline point {0} not found")]
    PointNotFound(SplinePointId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `tr-*` crates.
pub type TrResult<T> = Result<T, TrError>;
