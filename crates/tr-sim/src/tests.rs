//! Integration tests for tr-sim.

use tr_agent::{AiCarParams, AiState, CarStatus, PlayerState};
use tr_core::{AgentId, AiParams, ServerTime, SessionId, SimConfig, SplinePointId};
use tr_spline::{SplineGraph, SplineGraphBuilder, Vec3};

use crate::{NoopObserver, SimError, TickStats, TrafficEvent, TrafficObserver, TrafficSim, TrafficSimBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config() -> SimConfig {
    SimConfig { seed: 42, tick_interval_ms: 50, num_threads: Some(1) }
}

/// Spawns 100..200 m ahead of a player, 80 m safety margin.
fn test_params() -> AiParams {
    AiParams {
        min_spawn_distance_to_player:    100.0,
        max_spawn_distance_to_player:    200.0,
        spawn_safety_distance_to_player: 80.0,
        ..AiParams::default()
    }
}

/// `n` points along +z, 10 m apart, starting at the origin.
fn road(n: usize) -> SplineGraph {
    let mut b = SplineGraphBuilder::new();
    let pos: Vec<Vec3> = (0..n).map(|i| Vec3::new(0.0, 0.0, i as f32 * 10.0)).collect();
    b.add_polyline(&pos, false);
    b.build().unwrap()
}

fn player_at_origin(session: u8) -> PlayerState {
    PlayerState::new(SessionId(session), Vec3::ZERO, Vec3::ZERO)
}

fn sim_with_player(points: usize, agents: usize) -> TrafficSim {
    let sim = TrafficSimBuilder::new(test_config(), test_params(), road(points), agents).build().unwrap();
    sim.event_sender().send(TrafficEvent::PlayerUpdated(player_at_origin(0))).unwrap();
    sim
}

#[derive(Default)]
struct Counting {
    starts:    usize,
    ends:      usize,
    spawns:    Vec<(AgentId, SplinePointId)>,
    despawns:  Vec<(AgentId, SplinePointId)>,
    statuses:  usize,
    last:      TickStats,
}

impl TrafficObserver for Counting {
    fn on_tick_start(&mut self, _now: ServerTime) { self.starts += 1; }
    fn on_spawn(&mut self, agent: AgentId, at: SplinePointId) { self.spawns.push((agent, at)); }
    fn on_despawn(&mut self, agent: AgentId, at: SplinePointId) { self.despawns.push((agent, at)); }
    fn on_status(&mut self, _agent: AgentId, _status: &CarStatus) { self.statuses += 1; }
    fn on_tick_end(&mut self, stats: &TickStats) {
        self.ends += 1;
        self.last = *stats;
    }
}

// ── TrafficSimBuilder validation ──────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let sim = TrafficSimBuilder::new(test_config(), test_params(), road(10), 3).build().unwrap();
        assert_eq!(sim.agents().len(), 3);
        assert_eq!(sim.active_count(), 0);
        assert_eq!(sim.directory().len(), 10);
        assert_eq!(sim.agent(AgentId(2)).unwrap().id(), AgentId(2));
        assert!(sim.agent(AgentId(3)).is_err());
    }

    #[test]
    fn invalid_params_rejected() {
        let params = AiParams { traffic_density: 0.0, ..test_params() };
        let err = TrafficSimBuilder::new(test_config(), params, road(10), 1).build().err().unwrap();
        assert!(matches!(err, SimError::Core(_)));
    }

    #[test]
    fn empty_graph_rejected() {
        let err = TrafficSimBuilder::new(test_config(), test_params(), SplineGraph::empty(), 1)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::EmptyGraph));
    }

    #[test]
    fn zero_tick_interval_rejected() {
        let config = SimConfig { tick_interval_ms: 0, ..test_config() };
        let err = TrafficSimBuilder::new(config, test_params(), road(10), 1).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn car_count_mismatch_errors() {
        let err = TrafficSimBuilder::new(test_config(), test_params(), road(10), 3)
            .cars(vec![AiCarParams::default(); 2])
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::AgentCountMismatch { expected: 3, got: 2, what: "cars" }));
    }

    #[test]
    fn explicit_cars_are_assigned_in_order() {
        let slow = AiCarParams { max_speed_ms: 5.0, ..AiCarParams::default() };
        let sim = TrafficSimBuilder::new(test_config(), test_params(), road(10), 2)
            .cars(vec![AiCarParams::default(), slow.clone()])
            .build()
            .unwrap();
        assert_eq!(sim.agent(AgentId(1)).unwrap().car(), &slow);
    }
}

// ── Event ingress ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod event_tests {
    use super::*;

    #[test]
    fn player_updates_replace_by_session() {
        let mut sim = TrafficSimBuilder::new(test_config(), test_params(), road(10), 0).build().unwrap();
        let tx = sim.event_sender();
        tx.send(TrafficEvent::PlayerUpdated(player_at_origin(3))).unwrap();
        let moved = PlayerState::new(SessionId(3), Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO);
        tx.send(TrafficEvent::PlayerUpdated(moved)).unwrap();
        tx.send(TrafficEvent::PlayerUpdated(player_at_origin(4))).unwrap();

        let stats = sim.tick(ServerTime(0), &mut NoopObserver);
        assert_eq!(stats.events, 3);
        assert_eq!(sim.players().len(), 2);
        assert_eq!(sim.players()[0].position, Vec3::new(0.0, 0.0, 50.0));
    }

    #[test]
    fn player_left_removes_player() {
        let mut sim = TrafficSimBuilder::new(test_config(), test_params(), road(10), 0).build().unwrap();
        let tx = sim.event_sender();
        tx.send(TrafficEvent::PlayerUpdated(player_at_origin(1))).unwrap();
        tx.send(TrafficEvent::PlayerUpdated(player_at_origin(2))).unwrap();
        tx.send(TrafficEvent::PlayerLeft(SessionId(1))).unwrap();
        sim.tick(ServerTime(0), &mut NoopObserver);
        assert_eq!(sim.players().len(), 1);
        assert_eq!(sim.players()[0].session, SessionId(2));
    }

    #[test]
    fn rain_is_clamped_and_non_finite_ignored() {
        let mut sim = TrafficSimBuilder::new(test_config(), test_params(), road(10), 0).build().unwrap();
        let tx = sim.event_sender();
        tx.send(TrafficEvent::RainChanged(2.0)).unwrap();
        sim.tick(ServerTime(0), &mut NoopObserver);
        assert_eq!(sim.rain_intensity(), 1.0);

        tx.send(TrafficEvent::RainChanged(f32::NAN)).unwrap();
        tx.send(TrafficEvent::RainChanged(0.3)).unwrap();
        tx.send(TrafficEvent::RainChanged(f32::INFINITY)).unwrap();
        sim.tick(ServerTime(50), &mut NoopObserver);
        assert_eq!(sim.rain_intensity(), 0.3);
    }

    #[test]
    fn collision_stops_active_agent() {
        let mut sim = sim_with_player(100, 1);
        sim.tick(ServerTime(0), &mut NoopObserver);
        assert_eq!(sim.active_count(), 1);

        sim.event_sender().send(TrafficEvent::Collision { agent: AgentId(0) }).unwrap();
        sim.tick(ServerTime(50), &mut NoopObserver);
        assert_eq!(sim.agent(AgentId(0)).unwrap().target_speed(), 0.0);
    }

    #[test]
    fn collision_for_inactive_or_unknown_agent_is_ignored() {
        let mut sim = TrafficSimBuilder::new(test_config(), test_params(), road(10), 1).build().unwrap();
        let tx = sim.event_sender();
        tx.send(TrafficEvent::Collision { agent: AgentId(0) }).unwrap();
        tx.send(TrafficEvent::Collision { agent: AgentId(99) }).unwrap();
        let stats = sim.tick(ServerTime(0), &mut NoopObserver);
        assert_eq!(stats.events, 2);
        assert_eq!(sim.active_count(), 0);
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod spawn_tests {
    use super::*;

    #[test]
    fn no_players_no_spawns() {
        let mut sim = TrafficSimBuilder::new(test_config(), test_params(), road(100), 4).build().unwrap();
        sim.run_ticks(10, &mut NoopObserver);
        assert_eq!(sim.active_count(), 0);
    }

    #[test]
    fn spawns_ahead_of_player_outside_safety_distance() {
        let mut sim = sim_with_player(100, 4);
        let mut obs = Counting::default();
        sim.tick(ServerTime(0), &mut obs);

        assert!(!obs.spawns.is_empty());
        for &(agent, at) in &obs.spawns {
            let d = sim.graph().position(at).length();
            assert!(d >= 80.0, "spawned {d} m from the player");
            assert!(d <= 220.0, "spawned {d} m from the player");
            assert_eq!(sim.directory().occupant(at), Some(agent));
            assert!(sim.agent(agent).unwrap().is_initialized());
        }
        assert_eq!(obs.last.spawned, obs.spawns.len());
        assert_eq!(obs.last.active, sim.active_count());
    }

    #[test]
    fn spawns_per_tick_are_capped() {
        let params = AiParams { max_spawns_per_tick: 1, ..test_params() };
        let mut sim = TrafficSimBuilder::new(test_config(), params, road(100), 8).build().unwrap();
        sim.event_sender().send(TrafficEvent::PlayerUpdated(player_at_origin(0))).unwrap();
        let mut obs = Counting::default();
        sim.run_ticks(3, &mut obs);
        assert!(obs.spawns.len() <= 3);
        assert_eq!(sim.active_count(), obs.spawns.len());
    }

    #[test]
    fn spawn_check_can_refuse_every_point() {
        let mut sim = TrafficSimBuilder::new(test_config(), test_params(), road(100), 4)
            .spawn_check(|_: SplinePointId, _: &AiState| false)
            .build()
            .unwrap();
        sim.event_sender().send(TrafficEvent::PlayerUpdated(player_at_origin(0))).unwrap();
        sim.run_ticks(20, &mut NoopObserver);
        assert_eq!(sim.active_count(), 0);
    }

    #[test]
    fn spawn_check_sees_candidate_point() {
        let mut sim = TrafficSimBuilder::new(test_config(), test_params(), road(100), 4)
            .spawn_check(|p: SplinePointId, _: &AiState| p.0 % 2 == 0)
            .build()
            .unwrap();
        sim.event_sender().send(TrafficEvent::PlayerUpdated(player_at_origin(0))).unwrap();
        let mut obs = Counting::default();
        sim.run_ticks(5, &mut obs);
        assert!(obs.spawns.iter().all(|(_, p)| p.0 % 2 == 0));
    }

    #[test]
    fn directory_tracks_live_agents() {
        let mut sim = sim_with_player(100, 16);
        sim.run_ticks(40, &mut NoopObserver);
        let dir = sim.directory();
        assert!(dir.occupied() > 0);
        assert!(dir.occupied() <= sim.active_count());
        for agent in sim.agents().iter().filter(|a| a.is_initialized()) {
            let occupant = dir.occupant(agent.current_point()).unwrap();
            assert!(sim.agent(occupant).unwrap().is_initialized());
        }
    }
}

// ── Running ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn run_ticks_advances_clock() {
        let mut sim = TrafficSimBuilder::new(test_config(), test_params(), road(10), 0).build().unwrap();
        sim.run_ticks(5, &mut NoopObserver);
        assert_eq!(sim.clock.ticks, 5);
        assert_eq!(sim.clock.now, ServerTime(250));
    }

    #[test]
    fn observer_called_once_per_tick() {
        let mut sim = sim_with_player(100, 2);
        let mut obs = Counting::default();
        sim.run_ticks(7, &mut obs);
        assert_eq!(obs.starts, 7);
        assert_eq!(obs.ends, 7);
        assert_eq!(obs.last.now, ServerTime(300));
        assert!(obs.statuses > 0);
    }

    #[test]
    fn agents_move_forward() {
        let mut sim = sim_with_player(100, 1);
        sim.tick(ServerTime(0), &mut NoopObserver);
        let start = sim.agent(AgentId(0)).unwrap().status().position.z;
        sim.tick(ServerTime(1_000), &mut NoopObserver);
        let end = sim.agent(AgentId(0)).unwrap().status().position.z;
        assert!(end > start + 5.0, "moved from {start} to {end}");
    }

    #[test]
    fn agents_despawn_at_road_end_and_respawn() {
        let mut sim = sim_with_player(30, 1);
        let mut obs = Counting::default();
        // 20 s at ≥ 18 m/s covers the longest spawn-to-end run.
        sim.run_ticks(400, &mut obs);
        assert!(!obs.despawns.is_empty());
        assert!(obs.spawns.len() >= obs.despawns.len());
        let (_, at) = obs.despawns[0];
        assert!(sim.graph().next_n(at, 2).is_none());
    }

    #[test]
    fn same_seed_same_traffic() {
        let run = || {
            let mut sim = sim_with_player(100, 6);
            sim.run_ticks(120, &mut NoopObserver);
            sim.agents()
                .iter()
                .map(|a| (a.is_initialized(), a.current_point(), a.status().position))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
