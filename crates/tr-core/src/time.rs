//! Server time model.
//!
//! # Design
//!
//! Time is a signed count of **milliseconds** since the server clock
//! started, wrapped in `ServerTime`.  Every timer in the agent state machine
//! (spawn protection, collision stop, honk window …) is a `ServerTime`
//! deadline, so comparisons are integer-exact.
//!
//! Two clock sources exist:
//!
//! - [`SimClock`] — advanced by a fixed interval per tick.  Deterministic;
//!   used by tests and offline runs.
//! - [`MonotonicClock`] — reads `std::time::Instant`.  Used by a live server
//!   where the tick scheduler is external.

use std::fmt;
use std::time::Instant;

// ── ServerTime ────────────────────────────────────────────────────────────────

/// Milliseconds since the server clock started.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerTime(pub i64);

impl ServerTime {
    pub const ZERO: ServerTime = ServerTime(0);

    /// Milliseconds elapsed from `earlier` to `self` (negative if `earlier`
    /// is in the future).
    #[inline]
    pub fn since(self, earlier: ServerTime) -> i64 {
        self.0 - earlier.0
    }

    /// Elapsed time from `earlier` to `self` in seconds.
    #[inline]
    pub fn secs_since(self, earlier: ServerTime) -> f32 {
        self.since(earlier) as f32 / 1000.0
    }

    /// Low 32 bits, as carried by the replicated status timestamp.
    #[inline]
    pub fn as_wire(self) -> u32 {
        self.0 as u32
    }
}

impl std::ops::Add<i64> for ServerTime {
    type Output = ServerTime;
    #[inline]
    fn add(self, rhs: i64) -> ServerTime {
        ServerTime(self.0 + rhs)
    }
}

impl std::ops::Sub for ServerTime {
    type Output = i64;
    #[inline]
    fn sub(self, rhs: ServerTime) -> i64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for ServerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Fixed-step clock: each [`advance`](Self::advance) adds one tick interval.
///
/// Cheap to copy; holds no heap data.
#[derive(Clone, Debug)]
pub struct SimClock {
    /// Milliseconds added per tick.
    pub tick_interval_ms: u32,
    /// Current time.
    pub now: ServerTime,
    /// Number of ticks advanced so far.
    pub ticks: u64,
}

impl SimClock {
    pub fn new(start: ServerTime, tick_interval_ms: u32) -> Self {
        Self { tick_interval_ms, now: start, ticks: 0 }
    }

    /// Advance the clock by one tick interval.
    #[inline]
    pub fn advance(&mut self) {
        self.now = self.now + self.tick_interval_ms as i64;
        self.ticks += 1;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {} @ {}", self.ticks, self.now)
    }
}

// ── MonotonicClock ────────────────────────────────────────────────────────────

/// Wall-clock backed server time, monotonic from construction.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    started: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self { started: Instant::now() }
    }

    /// Milliseconds since [`start`](Self::start).
    pub fn now(&self) -> ServerTime {
        ServerTime(self.started.elapsed().as_millis() as i64)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::start()
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Coordinator configuration.
///
/// Typically filled in by the application from its own configuration file
/// and passed to the traffic simulation builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical traffic.
    pub seed: u64,

    /// Milliseconds between ticks when the simulation drives its own clock.
    pub tick_interval_ms: u32,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,
}

impl SimConfig {
    /// Construct a `SimClock` pre-configured for this run, starting at zero.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(ServerTime::ZERO, self.tick_interval_ms)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 0, tick_interval_ms: 50, num_threads: None }
    }
}
