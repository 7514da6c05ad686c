//! AI traffic tunables.
//!
//! `AiParams` carries every knob the agent state machine and the spawn phase
//! read.  Parsing a configuration file is the application's job; this module
//! only supplies stock defaults and range validation.
//!
//! Speeds are metres per second, distances metres, durations milliseconds.

use tracing::warn;

use crate::{TrError, TrResult};

/// Traffic-wide AI configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiParams {
    // ── Speed ─────────────────────────────────────────────────────────────
    /// Base cruising speed.
    pub max_speed_ms: f32,
    /// Total cruising-speed spread as a fraction of `max_speed_ms`
    /// (`0.15` → ±7.5 %).
    pub max_speed_variation_percent: f32,
    /// Added to the cruising speed of agents spawned on a lane that has a
    /// lane to its left.
    pub right_lane_offset_ms: f32,
    pub default_acceleration: f32,
    pub default_deceleration: f32,

    // ── Cornering ─────────────────────────────────────────────────────────
    /// Scales the lateral-grip-limited corner speed.
    pub cornering_speed_factor: f32,
    /// Fraction of full deceleration used when braking for corners.
    pub cornering_brake_force_factor: f32,
    /// Safety multiplier on corner braking distances.
    pub cornering_brake_distance_factor: f32,

    // ── Presentation ──────────────────────────────────────────────────────
    /// Vertical offset applied to the interpolated spline position.
    pub spline_height_offset_meters: f32,
    pub default_idle_engine_rpm: f32,
    pub default_max_engine_rpm: f32,

    // ── Density and timers ────────────────────────────────────────────────
    /// Multiplier on traffic density; safety distances scale with its inverse.
    pub traffic_density: f32,
    pub min_spawn_protection_time_ms: i64,
    pub max_spawn_protection_time_ms: i64,
    pub min_collision_stop_time_ms: i64,
    pub max_collision_stop_time_ms: i64,
    /// Squared following distance to a free-flowing AI ahead (before density scaling).
    pub min_ai_safety_distance_squared: f32,
    pub max_ai_safety_distance_squared: f32,
    /// An agent stopped for an obstacle this long starts ignoring obstacles.
    pub ignore_obstacles_after_ms: i64,

    // ── Perception ────────────────────────────────────────────────────────
    /// Half-width of the forward cone in which players count as obstacles.
    pub obstacle_cone_half_angle_deg: f32,
    /// Hard cap on the lookahead horizon.
    pub max_lookahead_meters: f32,

    // ── Spawning ──────────────────────────────────────────────────────────
    pub min_spawn_distance_to_player: f32,
    pub max_spawn_distance_to_player: f32,
    /// No agent spawns closer than this to any player.
    pub spawn_safety_distance_to_player: f32,
    pub max_spawns_per_tick: usize,
}

impl Default for AiParams {
    fn default() -> Self {
        Self {
            max_speed_ms:                    80.0 / 3.6,
            max_speed_variation_percent:     0.15,
            right_lane_offset_ms:            10.0 / 3.6,
            default_acceleration:            2.5,
            default_deceleration:            8.5,

            cornering_speed_factor:          0.5,
            cornering_brake_force_factor:    0.5,
            cornering_brake_distance_factor: 3.0,

            spline_height_offset_meters:     0.0,
            default_idle_engine_rpm:         800.0,
            default_max_engine_rpm:          3000.0,

            traffic_density:                 1.0,
            min_spawn_protection_time_ms:    4_000,
            max_spawn_protection_time_ms:    8_000,
            min_collision_stop_time_ms:      1_000,
            max_collision_stop_time_ms:      3_000,
            min_ai_safety_distance_squared:  20.0 * 20.0,
            max_ai_safety_distance_squared:  70.0 * 70.0,
            ignore_obstacles_after_ms:       10_000,

            obstacle_cone_half_angle_deg:    14.0,
            max_lookahead_meters:            1_000.0,

            min_spawn_distance_to_player:    100.0,
            max_spawn_distance_to_player:    400.0,
            spawn_safety_distance_to_player: 80.0,
            max_spawns_per_tick:             4,
        }
    }
}

impl AiParams {
    /// Check every range constraint the engine relies on.
    pub fn validate(&self) -> TrResult<()> {
        if !(0.0..=1.0).contains(&self.max_speed_variation_percent) {
            return Err(config_err("max_speed_variation_percent must be in the range 0..1"));
        }
        if self.max_speed_ms <= 0.0 {
            return Err(config_err("max_speed_ms must be positive"));
        }
        if self.default_acceleration <= 0.0 || self.default_deceleration <= 0.0 {
            return Err(config_err("default acceleration and deceleration must be positive"));
        }
        if self.traffic_density <= 0.0 {
            return Err(config_err("traffic_density must be positive"));
        }
        if self.cornering_speed_factor <= 0.0 || self.cornering_brake_force_factor <= 0.0 {
            return Err(config_err("cornering factors must be positive"));
        }
        if !(self.obstacle_cone_half_angle_deg > 0.0 && self.obstacle_cone_half_angle_deg < 180.0) {
            return Err(config_err("obstacle_cone_half_angle_deg must be in the range (0, 180)"));
        }
        if self.max_lookahead_meters <= 0.0 {
            return Err(config_err("max_lookahead_meters must be positive"));
        }
        check_range("spawn protection time", self.min_spawn_protection_time_ms, self.max_spawn_protection_time_ms)?;
        check_range("collision stop time", self.min_collision_stop_time_ms, self.max_collision_stop_time_ms)?;
        check_range("AI safety distance", self.min_ai_safety_distance_squared, self.max_ai_safety_distance_squared)?;
        check_range("spawn distance to player", self.min_spawn_distance_to_player, self.max_spawn_distance_to_player)?;

        if self.spawn_safety_distance_to_player > self.min_spawn_distance_to_player {
            warn!(
                safety = self.spawn_safety_distance_to_player,
                min_spawn = self.min_spawn_distance_to_player,
                "spawn safety distance exceeds minimum spawn distance; most spawn attempts will be rejected"
            );
        }
        Ok(())
    }

    /// Safety-distance-squared bounds scaled by inverse traffic density,
    /// rounded to whole square metres.
    pub fn scaled_safety_distance_squared(&self) -> (i64, i64) {
        let inv = 1.0 / self.traffic_density;
        (
            (self.min_ai_safety_distance_squared * inv).round() as i64,
            (self.max_ai_safety_distance_squared * inv).round() as i64,
        )
    }
}

fn config_err(msg: &str) -> TrError {
    TrError::Config(msg.to_string())
}

fn check_range<T: PartialOrd + std::fmt::Display>(what: &str, min: T, max: T) -> TrResult<()> {
    if min > max {
        return Err(TrError::Config(format!("{what}: min {min} exceeds max {max}")));
    }
    Ok(())
}
