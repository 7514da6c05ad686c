//! `tr-spline` — the road network the AI drives on, and how it drives it.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`graph`]       | `SplineGraph` (SoA + R-tree), `SplineGraphBuilder`        |
//! | [`junction`]    | `Junction`, `JunctionBranch`, `JunctionChoice`, signals   |
//! | [`cursor`]      | `MapCursor` — per-agent, junction-resolving traversal     |
//! | [`catmull_rom`] | `evaluate` — Hermite/Catmull-Rom segment interpolation    |
//! | [`physics`]     | braking distance and cornering speed formulas            |
//! | [`error`]       | `SplineError`, `SplineResult<T>`                          |
//!
//! # Sharing
//!
//! A built [`SplineGraph`] is immutable and `Sync`; every agent reads it
//! concurrently without locking.  All per-agent traversal state lives in the
//! agent's own [`MapCursor`].
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | FxHash for the cursor's junction-choice map.               |

pub mod catmull_rom;
pub mod cursor;
pub mod error;
pub mod graph;
pub mod junction;
pub mod physics;

#[cfg(test)]
mod tests;

pub use catmull_rom::CatmullRomPoint;
pub use cursor::MapCursor;
pub use error::{SplineError, SplineResult};
pub use graph::{SplineGraph, SplineGraphBuilder};
pub use junction::{Junction, JunctionBranch, JunctionChoice, JunctionSignals};

/// Re-exported so downstream crates name one vector type.
pub use glam::Vec3;
