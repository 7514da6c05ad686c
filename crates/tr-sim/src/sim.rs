//! The [`TrafficSim`] struct and its tick loop.

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use tr_agent::{AgentSnapshot, AgentUpdate, AiDirectory, AiState, PlayerState, TickContext};
use tr_core::{AgentId, AiParams, ServerTime, SimClock, SimConfig, SimRng, SplinePointId, TrError, TrResult};
use tr_spline::SplineGraph;

use crate::events::TrafficEvent;
use crate::observer::{TickStats, TrafficObserver};
use crate::spawn::{self, AllowAll, SpawnCheck};

/// The traffic coordinator.
///
/// Generic over the spawn predicate `S` so a game mode's placement rules are
/// monomorphised into the spawn phase.
///
/// Construct with [`TrafficSimBuilder`][crate::TrafficSimBuilder].
pub struct TrafficSim<S: SpawnCheck = AllowAll> {
    pub config: SimConfig,
    pub params: AiParams,

    /// Clock driven by [`run_ticks`](Self::run_ticks).
    pub clock: SimClock,

    pub(crate) graph:     SplineGraph,
    pub(crate) agents:    Vec<AiState>,
    pub(crate) directory: AiDirectory,

    /// Reused every tick; indexed by `AgentId`.
    pub(crate) peers: Vec<AgentSnapshot>,

    pub(crate) players: Vec<PlayerState>,
    pub(crate) rain:    f32,

    pub(crate) events_tx: Sender<TrafficEvent>,
    pub(crate) events_rx: Receiver<TrafficEvent>,

    pub(crate) rng:         SimRng,
    pub(crate) spawn_check: S,

    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl<S: SpawnCheck> TrafficSim<S> {
    // ── Accessors ─────────────────────────────────────────────────────────

    /// A sender for feeding events into the next tick.  Cheap to clone.
    pub fn event_sender(&self) -> Sender<TrafficEvent> {
        self.events_tx.clone()
    }

    pub fn graph(&self) -> &SplineGraph {
        &self.graph
    }

    pub fn agents(&self) -> &[AiState] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> TrResult<&AiState> {
        self.agents.get(id.index()).ok_or(TrError::AgentNotFound(id))
    }

    pub fn directory(&self) -> &AiDirectory {
        &self.directory
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn rain_intensity(&self) -> f32 {
        self.rain
    }

    /// Number of agents currently on the road.
    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_initialized()).count()
    }

    // ── Driving ───────────────────────────────────────────────────────────

    /// Run `n` ticks on the internal clock, advancing it by
    /// `tick_interval_ms` after each.
    pub fn run_ticks<O: TrafficObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            let now = self.clock.now;
            self.tick(now, observer);
            self.clock.advance();
        }
    }

    /// Run one tick at the externally supplied time `now`.
    pub fn tick<O: TrafficObserver>(&mut self, now: ServerTime, observer: &mut O) -> TickStats {
        observer.on_tick_start(now);
        let mut stats = TickStats { now, ..TickStats::default() };

        // ── Phase 0: ingress events ───────────────────────────────────────
        stats.events = self.drain_events(now);

        // ── Phase 1: snapshot ─────────────────────────────────────────────
        self.peers.clear();
        self.peers.extend(self.agents.iter().map(AiState::snapshot));

        // ── Phase 2: obstacle detection + movement ────────────────────────
        let despawned = self.update_agents(now);

        // ── Phase 3: re-index and report despawns ─────────────────────────
        self.directory.rebuild(&self.agents);
        for &(agent, at) in &despawned {
            observer.on_despawn(agent, at);
        }
        stats.despawned = despawned.len();

        // ── Phase 4: spawn ────────────────────────────────────────────────
        stats.spawned = self.spawn_phase(now, observer);

        // ── Phase 5: status ───────────────────────────────────────────────
        for agent in self.agents.iter().filter(|a| a.is_initialized()) {
            observer.on_status(agent.id(), agent.status());
        }
        stats.active = self.active_count();

        observer.on_tick_end(&stats);
        stats
    }

    fn drain_events(&mut self, now: ServerTime) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            count += 1;
            match event {
                TrafficEvent::PlayerUpdated(player) => {
                    match self.players.iter_mut().find(|p| p.session == player.session) {
                        Some(slot) => *slot = player,
                        None => self.players.push(player),
                    }
                }
                TrafficEvent::PlayerLeft(session) => {
                    self.players.retain(|p| p.session != session);
                }
                TrafficEvent::Collision { agent } => {
                    match self.agents.get_mut(agent.index()).filter(|a| a.is_initialized()) {
                        Some(state) => state.stop_for_collision(now, &self.params),
                        None => warn!(agent = %agent, "collision reported for an inactive agent"),
                    }
                }
                TrafficEvent::RainChanged(intensity) => {
                    if intensity.is_finite() {
                        self.rain = intensity.clamp(0.0, 1.0);
                    } else {
                        warn!(intensity, "ignoring non-finite rain intensity");
                    }
                }
            }
        }
        count
    }

    /// Every initialized agent detects obstacles and moves.  Agents read the
    /// peer snapshot and last tick's directory; each mutates only itself.
    fn update_agents(&mut self, now: ServerTime) -> Vec<(AgentId, SplinePointId)> {
        let ctx = TickContext::new(
            now,
            &self.graph,
            &self.directory,
            &self.peers,
            &self.players,
            self.rain,
            &self.params,
        );
        let agents = &mut self.agents;

        let step = |agent: &mut AiState| -> Option<(AgentId, SplinePointId)> {
            if !agent.is_initialized() {
                return None;
            }
            agent.detect_obstacles(&ctx);
            match agent.update(&ctx) {
                AgentUpdate::Despawned { at } => Some((agent.id(), at)),
                AgentUpdate::Moved | AgentUpdate::Idle => None,
            }
        };

        #[cfg(not(feature = "parallel"))]
        {
            agents.iter_mut().filter_map(step).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            match &self.pool {
                Some(pool) => pool.install(|| agents.par_iter_mut().filter_map(step).collect()),
                None => agents.par_iter_mut().filter_map(step).collect(),
            }
        }
    }

    /// Place up to `max_spawns_per_tick` idle agents near players.  One
    /// placement attempt per idle agent; misses retry next tick.
    fn spawn_phase<O: TrafficObserver>(&mut self, now: ServerTime, observer: &mut O) -> usize {
        if self.players.is_empty() {
            return 0;
        }
        let budget = self.params.max_spawns_per_tick;
        let mut attempts = 0;
        let mut spawned = 0;

        for i in 0..self.agents.len() {
            if attempts == budget {
                break;
            }
            if self.agents[i].is_initialized() {
                continue;
            }
            attempts += 1;

            let Some(point) = spawn::find_spawn_point(
                &self.graph,
                &self.directory,
                &self.players,
                &self.params,
                &mut self.rng,
                &self.spawn_check,
                &self.agents[i],
            ) else {
                continue;
            };

            let ctx = TickContext::new(
                now,
                &self.graph,
                &self.directory,
                &self.peers,
                &self.players,
                self.rain,
                &self.params,
            );
            let agent = &mut self.agents[i];
            if let Err(e) = agent.teleport(point, &ctx) {
                warn!(agent = %agent.id(), point = %point, error = %e, "spawn failed");
                continue;
            }
            let id = agent.id();
            self.directory.insert(point, id);
            observer.on_spawn(id, point);
            spawned += 1;
        }

        if attempts > 0 {
            debug!(now = %now, attempts, spawned, "spawn phase");
        }
        spawned
    }
}
