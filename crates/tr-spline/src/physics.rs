//! Closed-form driving physics used by obstacle and curve look-ahead.
//!
//! Speeds are in m/s, decelerations in m/s², distances and radii in metres.

/// Standard gravity, m/s².
pub const GRAVITY: f32 = 9.81;

/// Distance needed to shed `delta_speed` at a constant `deceleration`:
/// `v² / (2a)`.
///
/// A negative delta (already slower than the target) needs no braking and
/// yields `0.0`.  `deceleration` must be positive.
#[inline]
pub fn braking_distance(delta_speed: f32, deceleration: f32) -> f32 {
    debug_assert!(deceleration > 0.0, "deceleration must be positive");
    let v = delta_speed.max(0.0);
    v * v / (2.0 * deceleration)
}

/// Highest speed at which a curve of `radius` can be taken with the given
/// lateral-grip factor: `sqrt(g · r · factor)`.
///
/// An infinite radius (straight road) yields `f32::INFINITY`.
#[inline]
pub fn max_cornering_speed(radius: f32, cornering_speed_factor: f32) -> f32 {
    (GRAVITY * radius.max(0.0) * cornering_speed_factor.max(0.0)).sqrt()
}
