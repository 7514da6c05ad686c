use glam::Vec3;

use tr_core::SessionId;

/// Last state a human player's client reported.
///
/// Only players that have sent at least one update are tracked, so every
/// entry is a candidate obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerState {
    pub session:  SessionId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Heading, pitch, roll in radians.
    pub rotation: Vec3,
}

impl PlayerState {
    pub fn new(session: SessionId, position: Vec3, velocity: Vec3) -> Self {
        Self { session, position, velocity, rotation: Vec3::ZERO }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}
