//! The demo's road: a ring with one exit ramp.

use tr_core::StatusFlags;
use tr_spline::{JunctionSignals, SplineGraph, SplineGraphBuilder, SplineResult, Vec3};

pub const RING_RADIUS: f32 = 300.0;
const RING_POINTS:     usize = 120;
const EXIT_AT:         usize = 30;
const EXIT_POINTS:     usize = 12;
const EXIT_SPACING:    f32 = 15.0;

/// Point on the ring at `angle` radians, counter-clockwise in the xz-plane.
pub fn ring_position(angle: f32) -> Vec3 {
    Vec3::new(RING_RADIUS * angle.cos(), 0.0, RING_RADIUS * angle.sin())
}

/// Build the ring road.  One car in five leaves at the exit, indicating
/// right 80 m before it.
pub fn build_ring_road() -> SplineResult<SplineGraph> {
    let mut b = SplineGraphBuilder::with_capacity(RING_POINTS + EXIT_POINTS);

    let ring: Vec<Vec3> = (0..RING_POINTS)
        .map(|i| ring_position(i as f32 / RING_POINTS as f32 * std::f32::consts::TAU))
        .collect();
    let ring_ids = b.add_polyline(&ring, true);

    // Ramp peels off outward, starting one ring segment past the junction.
    let start = ring_ids[EXIT_AT];
    let origin = ring[EXIT_AT + 1];
    let outward = origin.normalize_or_zero();
    let exit: Vec<Vec3> = (0..EXIT_POINTS).map(|i| origin + outward * (5.0 + i as f32 * EXIT_SPACING)).collect();
    let exit_ids = b.add_polyline(&exit, false);

    let signals = JunctionSignals {
        indicate_distance_pre:   80.0,
        indicate_distance_post:  30.0,
        indicate_when_taken:     StatusFlags::INDICATE_RIGHT,
        indicate_when_not_taken: StatusFlags::NONE,
    };
    b.add_junction(start, exit_ids[0], 0.2, signals);

    b.build()
}
