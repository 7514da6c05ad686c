//! Choosing where to spawn traffic.

use tr_agent::{AiDirectory, AiState, PlayerState};
use tr_core::{AiParams, SimRng, SplinePointId};
use tr_spline::SplineGraph;

/// Final say on whether an agent may appear at a point, e.g. to keep large
/// vehicles off narrow lanes.
///
/// Called from the single-threaded spawn phase.
pub trait SpawnCheck {
    fn can_spawn(&self, point: SplinePointId, agent: &AiState) -> bool;
}

/// Accepts every candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl SpawnCheck for AllowAll {
    #[inline]
    fn can_spawn(&self, _point: SplinePointId, _agent: &AiState) -> bool {
        true
    }
}

impl<F> SpawnCheck for F
where
    F: Fn(SplinePointId, &AiState) -> bool,
{
    #[inline]
    fn can_spawn(&self, point: SplinePointId, agent: &AiState) -> bool {
        self(point, agent)
    }
}

/// Pick a spawn point for `agent` ahead of a random player.
///
/// Snaps the player to the nearest spline point, walks the main line forward
/// a random distance in the configured spawn band, and rejects the result if
/// it is occupied, a dead end, too close to any player, or refused by
/// `check`.  One attempt per call; `None` means "try again next tick".
pub fn find_spawn_point<S: SpawnCheck>(
    graph:     &SplineGraph,
    directory: &AiDirectory,
    players:   &[PlayerState],
    params:    &AiParams,
    rng:       &mut SimRng,
    check:     &S,
    agent:     &AiState,
) -> Option<SplinePointId> {
    let player = &players[rng.index(players.len())?];
    let mut point = graph.nearest_point(player.position)?;

    let distance = rng.between_f32(params.min_spawn_distance_to_player, params.max_spawn_distance_to_player);
    let mut travelled = 0.0;
    while travelled < distance {
        travelled += graph.length(point);
        point = graph.next(point)?;
    }

    if !directory.is_free(point) || graph.next(point).is_none() {
        return None;
    }
    let pos = graph.position(point);
    let safety_sq = params.spawn_safety_distance_to_player * params.spawn_safety_distance_to_player;
    if players.iter().any(|p| p.position.distance_squared(pos) < safety_sq) {
        return None;
    }
    check.can_spawn(point, agent).then_some(point)
}
