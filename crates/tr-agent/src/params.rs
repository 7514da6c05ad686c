//! Per-car driving tunables.

use tr_core::AiParams;

/// Tunables one AI car drives with.
///
/// Every agent holds its own copy.  [`from_params`](Self::from_params) fills
/// it from the server-wide defaults; individual car models override fields
/// with struct-update syntax:
///
/// ```
/// use tr_agent::AiCarParams;
/// use tr_core::AiParams;
///
/// let truck = AiCarParams {
///     acceleration: 1.2,
///     ..AiCarParams::from_params(&AiParams::default())
/// };
/// assert_eq!(truck.acceleration, 1.2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AiCarParams {
    /// Cruise speed before random variation, m/s.
    pub max_speed_ms:                    f32,
    pub max_speed_variation_percent:     f32,
    /// Extra speed on a lane that has a lane to its left, m/s.
    pub right_lane_offset_ms:            f32,
    pub acceleration:                    f32,
    pub deceleration:                    f32,
    pub cornering_speed_factor:          f32,
    pub cornering_brake_force_factor:    f32,
    pub cornering_brake_distance_factor: f32,
    pub spline_height_offset_meters:     f32,
    pub idle_engine_rpm:                 f32,
    pub max_engine_rpm:                  f32,
}

impl AiCarParams {
    pub fn from_params(params: &AiParams) -> Self {
        Self {
            max_speed_ms:                    params.max_speed_ms,
            max_speed_variation_percent:     params.max_speed_variation_percent,
            right_lane_offset_ms:            params.right_lane_offset_ms,
            acceleration:                    params.default_acceleration,
            deceleration:                    params.default_deceleration,
            cornering_speed_factor:          params.cornering_speed_factor,
            cornering_brake_force_factor:    params.cornering_brake_force_factor,
            cornering_brake_distance_factor: params.cornering_brake_distance_factor,
            spline_height_offset_meters:     params.spline_height_offset_meters,
            idle_engine_rpm:                 params.default_idle_engine_rpm,
            max_engine_rpm:                  params.default_max_engine_rpm,
        }
    }
}

impl Default for AiCarParams {
    fn default() -> Self {
        Self::from_params(&AiParams::default())
    }
}
