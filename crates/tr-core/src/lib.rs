//! `tr-core` — foundational types for the `rust_traffic` AI traffic engine.
//!
//! This crate is a dependency of every other `tr-*` crate.  It has no `tr-*`
//! dependencies and few external ones (`rand`, `thiserror`, `tracing`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                    |
//! |------------|-------------------------------------------------------------|
//! | [`ids`]    | `AgentId`, `SplinePointId`, `JunctionId`, `SessionId`       |
//! | [`time`]   | `ServerTime`, `SimClock`, `MonotonicClock`, `SimConfig`     |
//! | [`rng`]    | `AgentRng` (per-agent), `SimRng` (coordinator)              |
//! | [`flags`]  | `StatusFlags` — replicated car signal bitmask               |
//! | [`config`] | `AiParams` — traffic tunables and their validation          |
//! | [`error`]  | `TrError`, `TrResult`                                       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids and configuration.   |

pub mod config;
pub mod error;
pub mod flags;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::AiParams;
pub use error::{TrError, TrResult};
pub use flags::StatusFlags;
pub use ids::{AgentId, JunctionId, SessionId, SplinePointId};
pub use rng::{AgentRng, SimRng};
pub use time::{MonotonicClock, ServerTime, SimClock, SimConfig};
