//! Per-agent traversal of the spline graph.
//!
//! A [`MapCursor`] remembers which way its agent goes at each junction ahead.
//! The first time a junction is consulted (by movement or by look-ahead) the
//! cursor draws once from the agent's RNG; every later query sees the same
//! answer until the agent has passed the junction.  That keeps look-ahead,
//! indicators and actual movement in agreement.
//!
//! A choice is discarded when the agent leaves the junction's start point on
//! the main line, or leaves the branch end point after taking the branch.

use glam::Vec3;

use tr_core::{AgentRng, JunctionId, SplinePointId};

use crate::graph::SplineGraph;
use crate::junction::JunctionChoice;

#[cfg(feature = "fx-hash")]
type ChoiceMap = rustc_hash::FxHashMap<JunctionId, JunctionChoice>;
#[cfg(not(feature = "fx-hash"))]
type ChoiceMap = std::collections::HashMap<JunctionId, JunctionChoice>;

#[derive(Clone, Debug, Default)]
pub struct MapCursor {
    current:       SplinePointId,
    choices:       ChoiceMap,
    start_tangent: Vec3,
    end_tangent:   Vec3,
}

impl MapCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the current point, all junction choices and tangents.
    pub fn clear(&mut self) {
        self.current = SplinePointId::INVALID;
        self.choices.clear();
        self.start_tangent = Vec3::ZERO;
        self.end_tangent = Vec3::ZERO;
    }

    /// Point the agent stands on; `INVALID` before the first placement.
    #[inline]
    pub fn current(&self) -> SplinePointId {
        self.current
    }

    #[inline]
    pub fn start_tangent(&self) -> Vec3 {
        self.start_tangent
    }

    #[inline]
    pub fn end_tangent(&self) -> Vec3 {
        self.end_tangent
    }

    /// Choice already drawn for `junction`, without drawing.
    #[inline]
    pub fn cached_choice(&self, junction: JunctionId) -> Option<JunctionChoice> {
        self.choices.get(&junction).copied()
    }

    /// Number of junctions with an outstanding choice.
    #[inline]
    pub fn pending_choices(&self) -> usize {
        self.choices.len()
    }

    /// This agent's choice at `junction`, drawing it on first use.
    pub fn choice(&mut self, graph: &SplineGraph, junction: JunctionId, rng: &mut AgentRng) -> JunctionChoice {
        *self
            .choices
            .entry(junction)
            .or_insert_with(|| graph.junction(junction).choose(rng.unit_f32()))
    }

    /// Whether this agent will leave the main line at `junction`.
    pub fn will_take_junction(&mut self, graph: &SplineGraph, junction: JunctionId, rng: &mut AgentRng) -> bool {
        self.choice(graph, junction, rng).is_taken()
    }

    /// Successor of `point` for this agent, resolving a junction starting
    /// there.
    pub fn next(&mut self, graph: &SplineGraph, point: SplinePointId, rng: &mut AgentRng) -> Option<SplinePointId> {
        if let Some(j) = graph.junction_start(point) {
            let choice = self.choice(graph, j, rng);
            if let Some(end) = graph.junction(j).branch_end(choice) {
                return Some(end);
            }
        }
        graph.next(point)
    }

    /// Length of the segment this agent drives from `point`; `0.0` at a dead
    /// end.  Differs from the graph's main-line length on a taken branch.
    pub fn segment_length(&mut self, graph: &SplineGraph, point: SplinePointId, rng: &mut AgentRng) -> f32 {
        match self.next(graph, point, rng) {
            Some(n) => graph.position(point).distance(graph.position(n)),
            None => 0.0,
        }
    }

    /// Follow [`next`](Self::next) `n` times.  `next_n(p, 0) == Some(p)`.
    pub fn next_n(
        &mut self,
        graph: &SplineGraph,
        point: SplinePointId,
        n:     usize,
        rng:   &mut AgentRng,
    ) -> Option<SplinePointId> {
        let mut p = point;
        for _ in 0..n {
            p = self.next(graph, p, rng)?;
        }
        Some(p)
    }

    /// Predecessor of `point` for this agent.  On a branch end reached through
    /// a taken junction this is the junction's start point.
    pub fn previous(&self, graph: &SplineGraph, point: SplinePointId) -> Option<SplinePointId> {
        if let Some(j) = graph.junction_end(point) {
            let junction = graph.junction(j);
            if let Some(choice) = self.cached_choice(j) {
                if junction.branch_end(choice) == Some(point) {
                    return Some(junction.start);
                }
            }
        }
        graph.previous(point)
    }

    /// Move the cursor onto `point` and recompute the segment tangents.
    ///
    /// Returns `false` if `point` has no successor for this agent; the
    /// cursor still stands on `point` but its tangents are stale.
    pub fn advance_to(&mut self, graph: &SplineGraph, point: SplinePointId, rng: &mut AgentRng) -> bool {
        let left = self.current;
        if left.is_valid() && left != point && graph.contains(left) {
            self.forget_passed(graph, left);
        }
        self.current = point;
        self.update_tangents(graph, rng)
    }

    fn forget_passed(&mut self, graph: &SplineGraph, left: SplinePointId) {
        if let Some(j) = graph.junction_start(left) {
            if self.cached_choice(j) == Some(JunctionChoice::Stay) {
                self.choices.remove(&j);
            }
        }
        if let Some(j) = graph.junction_end(left) {
            if let Some(choice) = self.cached_choice(j) {
                if graph.junction(j).branch_end(choice) == Some(left) {
                    self.choices.remove(&j);
                }
            }
        }
    }

    fn update_tangents(&mut self, graph: &SplineGraph, rng: &mut AgentRng) -> bool {
        let cur = self.current;
        let Some(next) = self.next(graph, cur, rng) else {
            return false;
        };
        let p = graph.position(cur);
        let n = graph.position(next);

        self.start_tangent = match self.previous(graph, cur) {
            Some(prev) => (n - graph.position(prev)) * 0.5,
            None => (n - p) * 0.5,
        };
        self.end_tangent = match self.next_n(graph, cur, 2, rng) {
            Some(next2) => (graph.position(next2) - p) * 0.5,
            None => (n - p) * 0.5,
        };
        true
    }
}
