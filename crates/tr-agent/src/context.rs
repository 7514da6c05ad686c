//! Read-only world view passed to every agent during a tick.

use glam::Vec3;

use tr_core::{AiParams, ServerTime};
use tr_spline::SplineGraph;

use crate::directory::AiDirectory;
use crate::player::PlayerState;

/// What other agents may know about an agent: its state as of the end of the
/// previous tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AgentSnapshot {
    pub position:      Vec3,
    pub current_speed: f32,
    pub target_speed:  f32,
    pub max_speed:     f32,
    pub initialized:   bool,
}

impl AgentSnapshot {
    /// `true` if the agent is slowing for an obstacle of its own.
    #[inline]
    pub fn has_slowdown(&self) -> bool {
        self.target_speed < self.max_speed
    }
}

/// A read-only snapshot of the world passed to
/// [`AiState::detect_obstacles`][crate::AiState::detect_obstacles] and
/// [`AiState::update`][crate::AiState::update].
///
/// Built once per tick by the coordinator and shared immutably across all
/// agents.
///
/// # Lifetimes
///
/// All borrows live for one tick's update phase.  The coordinator never
/// mutates the directory, peers or players while a `TickContext` is live.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    /// Server time of this tick.
    pub now: ServerTime,

    pub graph: &'a SplineGraph,

    /// Occupancy as of the end of the previous tick.
    pub directory: &'a AiDirectory,

    /// Snapshot of every agent, indexed by `AgentId`.
    pub peers: &'a [AgentSnapshot],

    /// Every player that has reported a position.
    pub players: &'a [PlayerState],

    /// Ambient rain intensity in `0..=1`.
    pub rain_intensity: f32,

    pub params: &'a AiParams,
}

impl<'a> TickContext<'a> {
    #[inline]
    pub fn new(
        now:            ServerTime,
        graph:          &'a SplineGraph,
        directory:      &'a AiDirectory,
        peers:          &'a [AgentSnapshot],
        players:        &'a [PlayerState],
        rain_intensity: f32,
        params:         &'a AiParams,
    ) -> Self {
        Self { now, graph, directory, peers, players, rain_intensity, params }
    }
}
