//! The replicated car status record.
//!
//! # Wire layout
//!
//! Little-endian, packed, 53 bytes (legacy client protocol):
//!
//! ```text
//!  0  u32      timestamp (server ms, truncated)
//!  4  f32 × 3  position
//! 16  f32 × 3  rotation (heading, pitch, roll)
//! 28  f32 × 3  velocity
//! 40  u8 × 4   tyre angular speed (log-encoded, see encode_tyre_angular_speed)
//! 44  u8       steer angle   (127 = centred)
//! 45  u8       wheel angle   (127 = centred)
//! 46  u16      engine rpm
//! 48  u8       gear
//! 49  u32      status flags
//! ```

use std::f32::consts::PI;

use glam::Vec3;
use serde::Serialize;

use tr_core::{ServerTime, StatusFlags};

use crate::error::AgentResult;

/// Size of an encoded [`CarStatus`].
pub const ENCODED_LEN: usize = 53;

/// Centred steering/wheel byte.
pub const CENTRED_ANGLE: u8 = 127;

/// Status of one car as sent to clients every tick.
#[derive(Clone, Debug, PartialEq)]
pub struct CarStatus {
    pub timestamp:          ServerTime,
    pub position:           Vec3,
    pub rotation:           Vec3,
    pub velocity:           Vec3,
    pub tyre_angular_speed: [u8; 4],
    pub steer_angle:        u8,
    pub wheel_angle:        u8,
    pub engine_rpm:         u16,
    pub gear:               u8,
    pub status_flags:       StatusFlags,
}

impl Default for CarStatus {
    fn default() -> Self {
        Self {
            timestamp:          ServerTime::ZERO,
            position:           Vec3::ZERO,
            rotation:           Vec3::ZERO,
            velocity:           Vec3::ZERO,
            tyre_angular_speed: [100; 4],
            steer_angle:        CENTRED_ANGLE,
            wheel_angle:        CENTRED_ANGLE,
            engine_rpm:         0,
            gear:               0,
            status_flags:       StatusFlags::NONE,
        }
    }
}

#[derive(Serialize)]
struct WireStatus {
    timestamp:          u32,
    position:           [f32; 3],
    rotation:           [f32; 3],
    velocity:           [f32; 3],
    tyre_angular_speed: [u8; 4],
    steer_angle:        u8,
    wheel_angle:        u8,
    engine_rpm:         u16,
    gear:               u8,
    status_flags:       u32,
}

impl CarStatus {
    /// Append the wire form of this status to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) -> AgentResult<()> {
        let wire = WireStatus {
            timestamp:          self.timestamp.as_wire(),
            position:           self.position.to_array(),
            rotation:           self.rotation.to_array(),
            velocity:           self.velocity.to_array(),
            tyre_angular_speed: self.tyre_angular_speed,
            steer_angle:        self.steer_angle,
            wheel_angle:        self.wheel_angle,
            engine_rpm:         self.engine_rpm,
            gear:               self.gear,
            status_flags:       self.status_flags.bits(),
        };
        out.reserve(ENCODED_LEN);
        bincode::serialize_into(out, &wire)?;
        Ok(())
    }

    /// Heading in degrees, normalised to `[0, 360)`.
    #[inline]
    pub fn heading_degrees(&self) -> f32 {
        self.rotation.x.to_degrees().rem_euclid(360.0)
    }
}

// ── Encoding helpers ──────────────────────────────────────────────────────────

/// Wheel angular speed (rad/s) for a road speed, with the client's ×6 scale.
#[inline]
pub fn tyre_angular_speed(speed: f32, wheel_diameter: f32) -> f32 {
    speed / (PI * wheel_diameter) * 6.0
}

/// Log-compress a wheel angular speed into one byte: sign-preserving,
/// `round(log10(|w| + 1) · 20)` with halves to even, clamped to `-100..=154`, offset by 100.
pub fn encode_tyre_angular_speed(angular_speed: f32) -> u8 {
    if !angular_speed.is_finite() {
        return if angular_speed > 0.0 { 254 } else { 0 };
    }
    let magnitude = ((angular_speed.abs() + 1.0).log10() * 20.0).round_ties_even();
    let signed = if angular_speed < 0.0 { -magnitude } else { magnitude };
    (signed.clamp(-100.0, 154.0) + 100.0) as u8
}

/// Engine rpm interpolated from idle to max by the fraction of cruise speed.
#[inline]
pub fn engine_rpm(idle: f32, max: f32, speed: f32, max_speed: f32) -> u16 {
    let t = if max_speed > 0.0 { speed / max_speed } else { 0.0 };
    (idle + (max - idle) * t).max(0.0) as u16
}
