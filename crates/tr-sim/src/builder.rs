//! Fluent builder for constructing a [`TrafficSim`].

use tr_agent::{AgentSnapshot, AiCarParams, AiDirectory, AiState};
use tr_core::{AgentId, AgentRng, AiParams, SimConfig, SimRng};
use tr_spline::SplineGraph;

use crate::spawn::{AllowAll, SpawnCheck};
use crate::{SimError, SimResult, TrafficSim};

/// Fluent builder for [`TrafficSim<S>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — seed, tick interval, thread count
/// - [`AiParams`] — traffic tunables, validated on `build()`
/// - [`SplineGraph`] — must contain at least one point
/// - agent count — the size of the agent pool
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                                   |
/// |---------------------|-------------------------------------------|
/// | `.cars(v)`          | `AiCarParams::from_params(&params)` each  |
/// | `.spawn_check(s)`   | [`AllowAll`]                              |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = TrafficSimBuilder::new(config, params, graph, 64)
///     .spawn_check(|point: SplinePointId, _: &AiState| point.0 % 2 == 0)
///     .build()?;
/// sim.run_ticks(20, &mut NoopObserver);
/// ```
pub struct TrafficSimBuilder<S: SpawnCheck = AllowAll> {
    config:      SimConfig,
    params:      AiParams,
    graph:       SplineGraph,
    agent_count: usize,
    cars:        Option<Vec<AiCarParams>>,
    spawn_check: S,
}

impl TrafficSimBuilder<AllowAll> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, params: AiParams, graph: SplineGraph, agent_count: usize) -> Self {
        Self { config, params, graph, agent_count, cars: None, spawn_check: AllowAll }
    }
}

impl<S: SpawnCheck> TrafficSimBuilder<S> {
    /// Supply per-agent car tunables (must be length `agent_count`).
    pub fn cars(mut self, cars: Vec<AiCarParams>) -> Self {
        self.cars = Some(cars);
        self
    }

    /// Replace the spawn predicate.
    pub fn spawn_check<S2: SpawnCheck>(self, spawn_check: S2) -> TrafficSimBuilder<S2> {
        TrafficSimBuilder {
            config:      self.config,
            params:      self.params,
            graph:       self.graph,
            agent_count: self.agent_count,
            cars:        self.cars,
            spawn_check,
        }
    }

    /// Validate all inputs and construct the [`TrafficSim`].
    ///
    /// # Errors
    ///
    /// - [`SimError::Core`] if `AiParams::validate` fails.
    /// - [`SimError::EmptyGraph`] if the graph has no points.
    /// - [`SimError::Config`] if `tick_interval_ms` is zero or the thread
    ///   pool cannot be created.
    /// - [`SimError::AgentCountMismatch`] if `cars` has the wrong length.
    pub fn build(self) -> SimResult<TrafficSim<S>> {
        self.params.validate()?;
        if self.graph.is_empty() {
            return Err(SimError::EmptyGraph);
        }
        if self.config.tick_interval_ms == 0 {
            return Err(SimError::Config("tick_interval_ms must be positive".into()));
        }
        AgentId::try_from(self.agent_count)
            .map_err(|_| SimError::Config(format!("agent count {} exceeds the id range", self.agent_count)))?;

        let n = self.agent_count;
        let cars = match self.cars {
            Some(cars) if cars.len() != n => {
                return Err(SimError::AgentCountMismatch { expected: n, got: cars.len(), what: "cars" });
            }
            Some(cars) => cars,
            None => vec![AiCarParams::from_params(&self.params); n],
        };

        let seed = self.config.seed;
        let agents: Vec<AiState> = cars
            .into_iter()
            .enumerate()
            .map(|(i, car)| {
                let id = AgentId(i as u32);
                AiState::new(id, car, AgentRng::new(seed, id))
            })
            .collect();

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| SimError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };

        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let directory = AiDirectory::new(self.graph.point_count());
        let clock = self.config.make_clock();

        Ok(TrafficSim {
            config: self.config,
            params: self.params,
            clock,
            graph: self.graph,
            agents,
            directory,
            peers: Vec::<AgentSnapshot>::with_capacity(n),
            players: Vec::new(),
            rain: 0.0,
            events_tx,
            events_rx,
            rng: SimRng::new(seed),
            spawn_check: self.spawn_check,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}
