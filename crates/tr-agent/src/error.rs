use thiserror::Error;

use tr_core::{AgentId, SplinePointId};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent {agent} cannot start at {point}: no successor")]
    NoSuccessor { agent: AgentId, point: SplinePointId },

    #[error("spline point {0} not found in graph")]
    UnknownPoint(SplinePointId),

    #[error("status encoding failed: {0}")]
    Encode(#[from] bincode::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
