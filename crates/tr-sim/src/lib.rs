//! `tr-sim` — the coordinator that ticks a population of AI cars.
//!
//! # Tick phases
//!
//! ```text
//! tick(now):
//!   ⓪ Events     drain the ingress channel: player updates, players
//!                leaving, collisions, rain changes.
//!   ① Snapshot   copy every agent's AgentSnapshot into the peer buffer.
//!   ② Update     detect_obstacles + update for each agent, reading only the
//!                peer buffer and the directory from the previous tick
//!                (parallel with the `parallel` feature).
//!   ③ Directory  rebuild spline point → agent, report despawns.
//!   ④ Spawn      place uninitialized agents near players.
//!   ⑤ Status     hand every live agent's CarStatus to the observer.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs phase ② on Rayon's thread pool.                   |
//! | `fx-hash`  | FxHash for cursor junction-choice maps.                |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tr_core::{AiParams, SimConfig};
//! use tr_sim::{NoopObserver, TrafficEvent, TrafficSimBuilder};
//!
//! let mut sim = TrafficSimBuilder::new(SimConfig::default(), AiParams::default(), graph, 64)
//!     .build()?;
//! sim.event_sender().send(TrafficEvent::PlayerUpdated(player))?;
//! sim.run_ticks(100, &mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod events;
pub mod observer;
pub mod sim;
pub mod spawn;

#[cfg(test)]
mod tests;

pub use builder::TrafficSimBuilder;
pub use error::{SimError, SimResult};
pub use events::TrafficEvent;
pub use observer::{NoopObserver, TickStats, TrafficObserver};
pub use sim::TrafficSim;
pub use spawn::{AllowAll, SpawnCheck};
