//! Inputs from the rest of the server, delivered over a channel.

use tr_agent::PlayerState;
use tr_core::{AgentId, SessionId};

/// Something that happened outside the traffic engine since the last tick.
///
/// Senders come from [`TrafficSim::event_sender`][crate::TrafficSim::event_sender]
/// and may live on any thread.  Events are applied in arrival order at the
/// start of the next tick.
#[derive(Clone, Debug, PartialEq)]
pub enum TrafficEvent {
    /// A player's client reported a new position.
    PlayerUpdated(PlayerState),
    /// A player disconnected.
    PlayerLeft(SessionId),
    /// Physics reported a collision involving an AI car.
    Collision { agent: AgentId },
    /// Weather changed; intensity in `0..=1`.
    RainChanged(f32),
}
