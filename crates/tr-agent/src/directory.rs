//! Spline point → occupying agent index.

use tr_core::{AgentId, SplinePointId};

use crate::state::AiState;

/// One slot per spline point holding the agent that currently stands on it.
///
/// Read by every agent's look-ahead during the update phase; rebuilt by the
/// coordinator only after all agents have updated, so no agent ever sees a
/// neighbour that has already moved this tick.  When two agents share a
/// point the first one inserted keeps the slot.
#[derive(Clone, Debug, Default)]
pub struct AiDirectory {
    slots:    Vec<Option<AgentId>>,
    occupied: usize,
}

impl AiDirectory {
    /// An empty directory for a graph with `point_count` points.
    pub fn new(point_count: usize) -> Self {
        Self { slots: vec![None; point_count], occupied: 0 }
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.occupied = 0;
    }

    /// Claim `point` for `agent`.  Returns `false` (and changes nothing) if
    /// the point is already taken or out of range.
    pub fn insert(&mut self, point: SplinePointId, agent: AgentId) -> bool {
        match self.slots.get_mut(point.index()) {
            Some(slot @ None) => {
                *slot = Some(agent);
                self.occupied += 1;
                true
            }
            _ => false,
        }
    }

    /// Re-index from scratch.  Uninitialized agents occupy nothing.
    pub fn rebuild(&mut self, agents: &[AiState]) {
        self.clear();
        for agent in agents.iter().filter(|a| a.is_initialized()) {
            self.insert(agent.current_point(), agent.id());
        }
    }

    #[inline]
    pub fn occupant(&self, point: SplinePointId) -> Option<AgentId> {
        self.slots.get(point.index()).copied().flatten()
    }

    #[inline]
    pub fn is_free(&self, point: SplinePointId) -> bool {
        self.occupant(point).is_none()
    }

    /// Number of occupied points.
    #[inline]
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Number of slots (spline points).
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
