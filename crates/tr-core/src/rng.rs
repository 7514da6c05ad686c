//! Deterministic per-agent and coordinator RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each AI agent owns an independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space.
//! This means:
//!
//! - Agents never share RNG state, so the update phase can run on any
//!   number of worker threads without contention or ordering effects.
//! - Growing the agent pool does not disturb the streams of existing agents.
//!
//! Integer "between" draws follow the half-open `[min, max)` convention and
//! return `min` for an empty range instead of panicking; configuration may
//! legitimately set `min == max` to disable jitter.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Owned by the agent's state machine.  The type is `Send` but deliberately
/// never shared: an agent's draws happen only while that agent is updated.
#[derive(Clone, Debug)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform `f32` in `[0, 1)`.
    #[inline]
    pub fn unit_f32(&mut self) -> f32 {
        self.0.r#gen::<f32>()
    }

    /// Uniform integer in `[min, max)`; `min` when the range is empty.
    #[inline]
    pub fn between_i64(&mut self, min: i64, max: i64) -> i64 {
        if min >= max { min } else { self.0.gen_range(min..max) }
    }

    /// Uniform float in `[min, max)`; `min` when the range is empty.
    #[inline]
    pub fn between_f32(&mut self, min: f32, max: f32) -> f32 {
        if min >= max { min } else { self.0.gen_range(min..max) }
    }

    /// Uniform index in `[0, len)`.  Returns `None` if `len == 0`.
    #[inline]
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.0.gen_range(0..len))
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Coordinator-level RNG for spawn decisions.
///
/// Used only from the single-threaded spawn phase.
#[derive(Clone, Debug)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn between_f32(&mut self, min: f32, max: f32) -> f32 {
        if min >= max { min } else { self.0.gen_range(min..max) }
    }

    /// Uniform index in `[0, len)`.  Returns `None` if `len == 0`.
    #[inline]
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.0.gen_range(0..len))
    }
}
