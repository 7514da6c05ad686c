//! `tr-agent` — one AI car, the directory of which point each car occupies,
//! and the status record replicated to clients.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`state`]     | `AiState` — spawn, movement, status assembly              |
//! | [`obstacles`] | look-ahead, player cone test, `detect_obstacles`          |
//! | [`context`]   | `TickContext`, `AgentSnapshot` — read-only tick inputs    |
//! | [`directory`] | `AiDirectory` — spline point → occupying agent            |
//! | [`params`]    | `AiCarParams` — per-car tunables                          |
//! | [`player`]    | `PlayerState` — last reported human car state             |
//! | [`status`]    | `CarStatus`, wire encoding, tyre/rpm helpers              |
//! | [`palette`]   | `Rgb`, the stock traffic colours                          |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                            |
//!
//! # Tick protocol
//!
//! The coordinator drives every agent through the same two calls per tick:
//!
//! 1. [`AiState::detect_obstacles`] picks a target speed from the previous
//!    tick's world view (peer snapshots, directory, players).
//! 2. [`AiState::update`] integrates speed, moves along the spline and
//!    rebuilds [`CarStatus`].
//!
//! Both mutate only the agent itself, so agents may be processed in any
//! order or in parallel.  The directory is rebuilt by the coordinator after
//! every agent has updated.

pub mod context;
pub mod directory;
pub mod error;
pub mod obstacles;
pub mod palette;
pub mod params;
pub mod player;
pub mod state;
pub mod status;


pub use context::{AgentSnapshot, TickContext};
pub use directory::AiDirectory;
pub use error::{AgentError, AgentResult};
pub use obstacles::Lookahead;
pub use palette::{CAR_COLORS, Rgb};
pub use params::AiCarParams;
pub use player::PlayerState;
pub use state::{AgentUpdate, AiState};
pub use status::CarStatus;
