//! Unit tests for tr-spline.
//!
//! All tests use small hand-built graphs.

#[cfg(test)]
mod helpers {
    use glam::Vec3;
    use tr_core::{SplinePointId, StatusFlags};

    use crate::{JunctionSignals, SplineGraph, SplineGraphBuilder};

    /// Straight line along +z with an exit branch:
    ///
    /// ```text
    ///   0:(0,0,0) → 1:(0,0,10) → 2:(0,0,20) → 3:(0,0,30)
    ///                    ╲
    ///                     4:(5,0,15) → 5:(5,0,25)
    /// ```
    ///
    /// Junction 0 starts at 1 and ends at 4, taken with `probability`.
    pub fn line_with_exit(probability: f32) -> (SplineGraph, [SplinePointId; 6]) {
        let mut b = SplineGraphBuilder::new();
        let main = b.add_polyline(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 10.0),
                Vec3::new(0.0, 0.0, 20.0),
                Vec3::new(0.0, 0.0, 30.0),
            ],
            false,
        );
        let exit = b.add_polyline(&[Vec3::new(5.0, 0.0, 15.0), Vec3::new(5.0, 0.0, 25.0)], false);
        b.add_junction(main[1], exit[0], probability, JunctionSignals {
            indicate_distance_pre:   20.0,
            indicate_distance_post:  5.0,
            indicate_when_taken:     StatusFlags::INDICATE_RIGHT,
            indicate_when_not_taken: StatusFlags::NONE,
        });
        let graph = b.build().unwrap();
        (graph, [main[0], main[1], main[2], main[3], exit[0], exit[1]])
    }

    /// Closed 10 m square in the xz-plane.
    pub fn square_ring() -> (SplineGraph, Vec<SplinePointId>) {
        let mut b = SplineGraphBuilder::new();
        let ids = b.add_polyline(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(0.0, 0.0, 10.0),
            ],
            true,
        );
        (b.build().unwrap(), ids)
    }
}

// ── Builder & graph structure ─────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use glam::Vec3;
    use tr_core::{JunctionId, SplinePointId};

    use crate::{JunctionBranch, JunctionSignals, SplineError, SplineGraphBuilder};

    #[test]
    fn empty_build() {
        let graph = SplineGraphBuilder::new().build().unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.junction_count(), 0);
        assert_eq!(graph.min_radius(), f32::INFINITY);
        assert_eq!(graph.nearest_point(Vec3::ZERO), None);
    }

    #[test]
    fn polyline_links_and_lengths() {
        let (graph, [p0, p1, p2, p3, ..]) = super::helpers::line_with_exit(0.0);
        assert_eq!(graph.next(p0), Some(p1));
        assert_eq!(graph.next(p3), None);
        assert_eq!(graph.previous(p2), Some(p1));
        assert_eq!(graph.previous(p0), None);
        assert!((graph.length(p0) - 10.0).abs() < 1e-5);
        assert_eq!(graph.length(p3), 0.0, "dead end has no segment");
        assert_eq!(graph.next_n(p0, 3), Some(p3));
        assert_eq!(graph.next_n(p0, 4), None);
        assert_eq!(graph.next_n(p2, 0), Some(p2));
    }

    #[test]
    fn closed_ring_wraps() {
        let (graph, ids) = super::helpers::square_ring();
        assert_eq!(graph.next(ids[3]), Some(ids[0]));
        assert_eq!(graph.previous(ids[0]), Some(ids[3]));
    }

    #[test]
    fn merge_keeps_first_predecessor() {
        let mut b = SplineGraphBuilder::new();
        let a = b.add_point(Vec3::new(0.0, 0.0, 0.0));
        let c = b.add_point(Vec3::new(5.0, 0.0, 0.0));
        let m = b.add_point(Vec3::new(0.0, 0.0, 10.0));
        b.connect(c, m);
        b.connect(a, m);
        let graph = b.build().unwrap();
        assert_eq!(graph.previous(m), Some(a));
    }

    #[test]
    fn left_lane() {
        let mut b = SplineGraphBuilder::new();
        let right = b.add_point(Vec3::ZERO);
        let left = b.add_point(Vec3::new(-3.5, 0.0, 0.0));
        b.set_left_lane(right, left);
        let graph = b.build().unwrap();
        assert_eq!(graph.left(right), Some(left));
        assert_eq!(graph.left(left), None);
    }

    #[test]
    fn zero_length_segment_rejected() {
        let mut b = SplineGraphBuilder::new();
        let a = b.add_point(Vec3::ONE);
        let c = b.add_point(Vec3::ONE);
        b.connect(a, c);
        assert!(matches!(b.build(), Err(SplineError::DegenerateSegment(p)) if p == a));
    }

    #[test]
    fn dangling_link_rejected() {
        let mut b = SplineGraphBuilder::new();
        let a = b.add_point(Vec3::ZERO);
        b.connect(a, SplinePointId(99));
        assert!(matches!(b.build(), Err(SplineError::UnknownPoint(SplinePointId(99)))));
    }

    #[test]
    fn dangling_junction_end_rejected() {
        let mut b = SplineGraphBuilder::new();
        let a = b.add_point(Vec3::ZERO);
        b.add_junction(a, SplinePointId(7), 0.5, JunctionSignals::default());
        assert!(matches!(b.build(), Err(SplineError::UnknownPoint(SplinePointId(7)))));
    }

    #[test]
    fn duplicate_junction_rejected() {
        let mut b = SplineGraphBuilder::new();
        let a = b.add_point(Vec3::ZERO);
        let x = b.add_point(Vec3::new(1.0, 0.0, 0.0));
        let y = b.add_point(Vec3::new(0.0, 0.0, 1.0));
        b.add_junction(a, x, 0.5, JunctionSignals::default());
        b.add_junction(a, y, 0.5, JunctionSignals::default());
        assert!(matches!(
            b.build(),
            Err(SplineError::DuplicateJunction { existing: JunctionId(0), .. })
        ));
    }

    #[test]
    fn weightless_junction_rejected() {
        let mut b = SplineGraphBuilder::new();
        let a = b.add_point(Vec3::ZERO);
        let x = b.add_point(Vec3::new(1.0, 0.0, 0.0));
        b.add_junction_branches(a, vec![JunctionBranch { end: x, weight: 0.0 }], 0.0, JunctionSignals::default());
        assert!(matches!(b.build(), Err(SplineError::EmptyJunction(_))));
    }

    #[test]
    fn junction_lookup_both_ways() {
        let (graph, [_, p1, _, _, e0, _]) = super::helpers::line_with_exit(0.5);
        let j = graph.junction_start(p1).unwrap();
        assert_eq!(graph.junction_end(e0), Some(j));
        assert_eq!(graph.junction(j).start, p1);
        assert!((graph.junction(j).probability_taken() - 0.5).abs() < 1e-6);
    }
}

// ── Radius, camber & spatial index ────────────────────────────────────────────

#[cfg(test)]
mod geometry {
    use glam::Vec3;

    use crate::{SplineError, SplineGraphBuilder};

    #[test]
    fn straight_line_has_no_curvature() {
        let (graph, ids) = super::helpers::line_with_exit(0.0);
        assert!(ids.iter().all(|&p| graph.radius(p).is_infinite()));
        assert_eq!(graph.min_radius(), f32::INFINITY);
    }

    #[test]
    fn square_corner_circumradius() {
        let (graph, ids) = super::helpers::square_ring();
        // Right isosceles triangle with 10 m legs: R = hypotenuse / 2.
        let expected = (200.0f32).sqrt() / 2.0;
        assert!((graph.radius(ids[1]) - expected).abs() < 1e-3);
        assert!((graph.min_radius() - expected).abs() < 1e-3);
    }

    #[test]
    fn explicit_radius_overrides() {
        let mut b = SplineGraphBuilder::new();
        let ids = b.add_polyline(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 20.0)], false);
        b.set_radius(ids[1], 60.0);
        let graph = b.build().unwrap();
        assert_eq!(graph.radius(ids[1]), 60.0);
        assert_eq!(graph.min_radius(), 60.0);
    }

    #[test]
    fn bad_explicit_radius_rejected() {
        for bad in [-5.0, f32::NAN, f32::INFINITY] {
            let mut b = SplineGraphBuilder::new();
            let ids = b.add_polyline(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 20.0)], false);
            b.set_radius(ids[1], bad);
            assert!(
                matches!(b.build(), Err(SplineError::InvalidRadius { point, .. }) if point == ids[1]),
                "radius {bad} accepted"
            );
        }
    }

    #[test]
    fn zero_explicit_radius_allowed() {
        let mut b = SplineGraphBuilder::new();
        let ids = b.add_polyline(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 20.0)], false);
        b.set_radius(ids[1], 0.0);
        let graph = b.build().unwrap();
        assert_eq!(graph.radius(ids[1]), 0.0);
    }

    #[test]
    fn camber_interpolates_toward_next() {
        let mut b = SplineGraphBuilder::new();
        let ids = b.add_polyline(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)], false);
        b.set_camber(ids[0], 0.0);
        b.set_camber(ids[1], 0.2);
        let graph = b.build().unwrap();
        assert!((graph.camber(ids[0], 0.5) - 0.1).abs() < 1e-6);
        assert!((graph.camber(ids[1], 0.5) - 0.2).abs() < 1e-6, "dead end keeps its own camber");
    }

    #[test]
    fn nearest_and_within() {
        let (graph, [p0, p1, p2, ..]) = super::helpers::line_with_exit(0.0);
        assert_eq!(graph.nearest_point(Vec3::new(0.5, 0.0, 11.0)), Some(p1));
        let mut near: Vec<_> = graph.points_within(Vec3::new(0.0, 0.0, 10.0), 10.5).collect();
        near.sort();
        // p0, p1, p2 on the main line plus the exit start at ~7.1 m.
        assert_eq!(near.len(), 4);
        assert!(near.contains(&p0) && near.contains(&p2));
    }
}

// ── Junction draw ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod junction {
    use tr_core::{JunctionId, SplinePointId, StatusFlags};

    use crate::{Junction, JunctionBranch, JunctionChoice, JunctionSignals};

    fn junction(stay: f32, weights: &[f32]) -> Junction {
        Junction {
            id:          JunctionId(0),
            start:       SplinePointId(0),
            branches:    weights
                .iter()
                .enumerate()
                .map(|(i, &w)| JunctionBranch { end: SplinePointId(i as u32 + 1), weight: w })
                .collect(),
            stay_weight: stay,
            signals:     JunctionSignals {
                indicate_when_taken: StatusFlags::INDICATE_LEFT,
                ..Default::default()
            },
        }
    }

    #[test]
    fn single_branch_split() {
        let j = junction(0.75, &[0.25]);
        assert_eq!(j.choose(0.5), JunctionChoice::Stay);
        assert_eq!(j.choose(0.8), JunctionChoice::Take(0));
        assert!((j.probability_taken() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn weighted_branches_in_order() {
        let j = junction(1.0, &[1.0, 2.0]);
        assert_eq!(j.choose(0.1), JunctionChoice::Stay);
        assert_eq!(j.choose(0.3), JunctionChoice::Take(0));
        assert_eq!(j.choose(0.6), JunctionChoice::Take(1));
        assert_eq!(j.choose(1.0), JunctionChoice::Take(1));
    }

    #[test]
    fn zero_weight_branch_never_taken() {
        let j = junction(0.0, &[0.0, 1.0]);
        assert_eq!(j.choose(0.0), JunctionChoice::Take(1));
        assert_eq!(j.choose(0.99), JunctionChoice::Take(1));
    }

    #[test]
    fn indicator_follows_choice() {
        let j = junction(0.5, &[0.5]);
        assert_eq!(j.indicator_for(JunctionChoice::Take(0)), StatusFlags::INDICATE_LEFT);
        assert_eq!(j.indicator_for(JunctionChoice::Stay), StatusFlags::NONE);
        assert_eq!(j.branch_end(JunctionChoice::Take(0)), Some(SplinePointId(1)));
        assert_eq!(j.branch_end(JunctionChoice::Stay), None);
    }
}

// ── Cursor ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cursor {
    use glam::Vec3;
    use tr_core::{AgentId, AgentRng, SplinePointId};

    use crate::{JunctionChoice, MapCursor};

    fn rng() -> AgentRng {
        AgentRng::new(11, AgentId(0))
    }

    #[test]
    fn certain_junction_is_taken() {
        let (graph, [p0, p1, _, _, e0, e1]) = super::helpers::line_with_exit(1.0);
        let mut rng = rng();
        let mut cursor = MapCursor::new();
        assert!(cursor.advance_to(&graph, p0, &mut rng));
        assert_eq!(cursor.next(&graph, p0, &mut rng), Some(p1));
        assert_eq!(cursor.next(&graph, p1, &mut rng), Some(e0));
        assert_eq!(cursor.previous(&graph, e0), Some(p1));
        assert_eq!(cursor.next_n(&graph, p0, 3, &mut rng), Some(e1));
    }

    #[test]
    fn impossible_junction_stays() {
        let (graph, [_, p1, p2, ..]) = super::helpers::line_with_exit(0.0);
        let mut rng = rng();
        let mut cursor = MapCursor::new();
        assert_eq!(cursor.next(&graph, p1, &mut rng), Some(p2));
        let j = graph.junction_start(p1).unwrap();
        assert!(!cursor.will_take_junction(&graph, j, &mut rng));
    }

    #[test]
    fn choice_is_stable_until_passed() {
        let (graph, [_, p1, ..]) = super::helpers::line_with_exit(0.5);
        let mut rng = rng();
        let mut cursor = MapCursor::new();
        let first = cursor.next(&graph, p1, &mut rng);
        for _ in 0..20 {
            assert_eq!(cursor.next(&graph, p1, &mut rng), first);
        }
        assert_eq!(cursor.pending_choices(), 1);
    }

    #[test]
    fn stay_choice_forgotten_after_start() {
        let (graph, [_, p1, p2, ..]) = super::helpers::line_with_exit(0.0);
        let mut rng = rng();
        let mut cursor = MapCursor::new();
        cursor.advance_to(&graph, p1, &mut rng);
        let j = graph.junction_start(p1).unwrap();
        assert_eq!(cursor.cached_choice(j), Some(JunctionChoice::Stay));
        cursor.advance_to(&graph, p2, &mut rng);
        assert_eq!(cursor.cached_choice(j), None);
    }

    #[test]
    fn taken_choice_forgotten_after_branch_end() {
        let (graph, [_, p1, _, _, e0, e1]) = super::helpers::line_with_exit(1.0);
        let mut rng = rng();
        let mut cursor = MapCursor::new();
        cursor.advance_to(&graph, p1, &mut rng);
        cursor.advance_to(&graph, e0, &mut rng);
        assert_eq!(cursor.pending_choices(), 1, "still needed to resolve previous(e0)");
        cursor.advance_to(&graph, e1, &mut rng);
        assert_eq!(cursor.pending_choices(), 0);
    }

    #[test]
    fn tangents_on_straight_line() {
        let (graph, [p0, p1, ..]) = super::helpers::line_with_exit(0.0);
        let mut rng = rng();
        let mut cursor = MapCursor::new();
        cursor.advance_to(&graph, p1, &mut rng);
        assert!((cursor.start_tangent() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
        assert!((cursor.end_tangent() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);

        cursor.advance_to(&graph, p0, &mut rng);
        assert!((cursor.start_tangent() - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn dead_end_has_no_segment() {
        let (graph, [.., p3, _, _]) = super::helpers::line_with_exit(0.0);
        let mut rng = rng();
        let mut cursor = MapCursor::new();
        assert!(!cursor.advance_to(&graph, p3, &mut rng));
        assert_eq!(cursor.current(), p3);
        assert_eq!(cursor.segment_length(&graph, p3, &mut rng), 0.0);
    }

    #[test]
    fn branch_segment_length() {
        let (graph, [_, p1, ..]) = super::helpers::line_with_exit(1.0);
        let mut rng = rng();
        let mut cursor = MapCursor::new();
        let len = cursor.segment_length(&graph, p1, &mut rng);
        assert!((len - 50.0f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn clear_resets() {
        let (graph, [_, p1, ..]) = super::helpers::line_with_exit(0.5);
        let mut rng = rng();
        let mut cursor = MapCursor::new();
        cursor.advance_to(&graph, p1, &mut rng);
        cursor.clear();
        assert_eq!(cursor.current(), SplinePointId::INVALID);
        assert_eq!(cursor.pending_choices(), 0);
        assert_eq!(cursor.start_tangent(), Vec3::ZERO);
    }
}

// ── Interpolation & physics ───────────────────────────────────────────────────

#[cfg(test)]
mod curves {
    use glam::Vec3;
    use proptest::prelude::*;

    use crate::catmull_rom::evaluate;
    use crate::physics::{braking_distance, max_cornering_speed};

    #[test]
    fn endpoints_are_exact() {
        let p0 = Vec3::new(1.0, 2.0, 3.0);
        let p1 = Vec3::new(4.0, 2.0, 9.0);
        let m = Vec3::new(1.0, 0.0, 1.0);
        assert_eq!(evaluate(p0, p1, m, m, 0.0).position, p0);
        assert_eq!(evaluate(p0, p1, m, m, 1.0).position, p1);
    }

    #[test]
    fn straight_segment_midpoint() {
        let m = Vec3::new(10.0, 0.0, 0.0);
        let s = evaluate(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), m, m, 0.5);
        assert!((s.position - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
        assert!((s.tangent - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn degenerate_tangent_is_zero() {
        let s = evaluate(Vec3::ONE, Vec3::ONE, Vec3::ZERO, Vec3::ZERO, 0.3);
        assert_eq!(s.tangent, Vec3::ZERO);
    }

    #[test]
    fn braking() {
        assert!((braking_distance(10.0, 5.0) - 10.0).abs() < 1e-6);
        assert_eq!(braking_distance(-3.0, 5.0), 0.0);
    }

    #[test]
    fn cornering() {
        assert!((max_cornering_speed(100.0, 0.5) - 490.5f32.sqrt()).abs() < 1e-4);
        assert!(max_cornering_speed(f32::INFINITY, 0.5).is_infinite());
    }

    proptest! {
        #[test]
        fn braking_is_non_negative_and_monotone(v in -50.0f32..100.0, dv in 0.0f32..10.0, a in 0.1f32..20.0) {
            let d = braking_distance(v, a);
            prop_assert!(d >= 0.0 && d.is_finite());
            prop_assert!(braking_distance(v + dv, a) >= d);
        }

        #[test]
        fn tangent_is_unit_or_zero(x in -100.0f32..100.0, z in -100.0f32..100.0, t in 0.0f32..=1.0) {
            let p1 = Vec3::new(x, 0.0, z);
            let s = evaluate(Vec3::ZERO, p1, p1 * 0.5, p1 * 0.5, t);
            let len = s.tangent.length();
            prop_assert!(len == 0.0 || (len - 1.0).abs() < 1e-3);
        }
    }
}
