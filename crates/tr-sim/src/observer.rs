//! Observer trait for progress reporting and status replication.

use tr_agent::CarStatus;
use tr_core::{AgentId, ServerTime, SplinePointId};

/// Per-tick counters handed to [`TrafficObserver::on_tick_end`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub now:       ServerTime,
    /// Events drained from the ingress channel.
    pub events:    usize,
    /// Initialized agents after the spawn phase.
    pub active:    usize,
    pub spawned:   usize,
    pub despawned: usize,
}

/// Callbacks invoked by [`TrafficSim::tick`][crate::TrafficSim::tick] between
/// phases.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: replicating statuses
///
/// ```rust,ignore
/// struct Replicator { buf: Vec<u8> }
///
/// impl TrafficObserver for Replicator {
///     fn on_status(&mut self, _agent: AgentId, status: &CarStatus) {
///         let _ = status.encode_into(&mut self.buf);
///     }
/// }
/// ```
pub trait TrafficObserver {
    /// Called at the very start of each tick, before events are drained.
    fn on_tick_start(&mut self, _now: ServerTime) {}

    /// An agent ran out of road at `at` and was despawned.
    fn on_despawn(&mut self, _agent: AgentId, _at: SplinePointId) {}

    /// An agent was placed on `at`.
    fn on_spawn(&mut self, _agent: AgentId, _at: SplinePointId) {}

    /// Called once per live agent per tick, after spawning.
    fn on_status(&mut self, _agent: AgentId, _status: &CarStatus) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _stats: &TickStats) {}
}

/// A [`TrafficObserver`] that does nothing.
pub struct NoopObserver;

impl TrafficObserver for NoopObserver {}
