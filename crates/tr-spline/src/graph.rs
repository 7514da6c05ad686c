//! The spline graph and its builder.
//!
//! # Data layout
//!
//! Points are stored structure-of-arrays, indexed by `SplinePointId`.  Links
//! use the `INVALID` sentinel for "none":
//!
//! ```text
//! point_next[p]            main-line successor
//! point_prev[p]            main-line predecessor (derived at build time)
//! point_left[p]            adjacent lane to the left, if any
//! point_junction_start[p]  junction whose start point is p
//! point_junction_end[p]    junction with a branch ending at p
//! ```
//!
//! `point_length[p]` is the straight-line distance to the main-line
//! successor (zero at a dead end), `point_radius[p]` the curve radius at `p`
//! (`f32::INFINITY` on straights and at line ends).
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over point positions answers nearest-point and
//! within-radius queries.  Used when spawning agents near players.

use glam::Vec3;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use tr_core::{JunctionId, SplinePointId};

use crate::error::{SplineError, SplineResult};
use crate::junction::{Junction, JunctionBranch, JunctionSignals};

/// Segments shorter than this are rejected by the builder.
const MIN_SEGMENT_LENGTH: f32 = 1e-3;

// ── R-tree point entry ────────────────────────────────────────────────────────

#[derive(Clone)]
struct PointEntry {
    point: [f32; 3],
    id:    SplinePointId,
}

impl RTreeObject for PointEntry {
    type Envelope = AABB<[f32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for PointEntry {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── SplineGraph ───────────────────────────────────────────────────────────────

/// Directed lane graph of spline points plus junctions and a spatial index.
///
/// All point fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`SplineGraphBuilder`].
pub struct SplineGraph {
    // ── Point data ────────────────────────────────────────────────────────
    pub point_pos:            Vec<Vec3>,
    pub point_next:           Vec<SplinePointId>,
    pub point_prev:           Vec<SplinePointId>,
    pub point_left:           Vec<SplinePointId>,
    pub point_length:         Vec<f32>,
    pub point_radius:         Vec<f32>,
    /// Road camber (bank angle, radians) at each point.
    pub point_camber:         Vec<f32>,
    pub point_junction_start: Vec<JunctionId>,
    pub point_junction_end:   Vec<JunctionId>,

    // ── Junctions ─────────────────────────────────────────────────────────
    pub junctions: Vec<Junction>,

    min_radius:  f32,
    spatial_idx: RTree<PointEntry>,
}

impl SplineGraph {
    /// A graph with no points.
    pub fn empty() -> Self {
        SplineGraph {
            point_pos:            Vec::new(),
            point_next:           Vec::new(),
            point_prev:           Vec::new(),
            point_left:           Vec::new(),
            point_length:         Vec::new(),
            point_radius:         Vec::new(),
            point_camber:         Vec::new(),
            point_junction_start: Vec::new(),
            point_junction_end:   Vec::new(),
            junctions:            Vec::new(),
            min_radius:           f32::INFINITY,
            spatial_idx:          RTree::new(),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn point_count(&self) -> usize {
        self.point_pos.len()
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, point: SplinePointId) -> bool {
        point.index() < self.point_pos.len()
    }

    // ── Point attributes ──────────────────────────────────────────────────

    #[inline]
    pub fn position(&self, point: SplinePointId) -> Vec3 {
        self.point_pos[point.index()]
    }

    /// Distance from `point` to its main-line successor.
    #[inline]
    pub fn length(&self, point: SplinePointId) -> f32 {
        self.point_length[point.index()]
    }

    #[inline]
    pub fn radius(&self, point: SplinePointId) -> f32 {
        self.point_radius[point.index()]
    }

    /// Camber at fraction `t` along the segment starting at `point`,
    /// interpolated toward the successor's camber.
    pub fn camber(&self, point: SplinePointId, t: f32) -> f32 {
        let c0 = self.point_camber[point.index()];
        match self.next(point) {
            Some(n) => {
                let c1 = self.point_camber[n.index()];
                c0 + (c1 - c0) * t.clamp(0.0, 1.0)
            }
            None => c0,
        }
    }

    /// Smallest finite curve radius in the graph; `f32::INFINITY` if the
    /// network has no curves.
    #[inline]
    pub fn min_radius(&self) -> f32 {
        self.min_radius
    }

    // ── Main-line links ───────────────────────────────────────────────────

    #[inline]
    pub fn next(&self, point: SplinePointId) -> Option<SplinePointId> {
        valid(self.point_next[point.index()])
    }

    #[inline]
    pub fn previous(&self, point: SplinePointId) -> Option<SplinePointId> {
        valid(self.point_prev[point.index()])
    }

    #[inline]
    pub fn left(&self, point: SplinePointId) -> Option<SplinePointId> {
        valid(self.point_left[point.index()])
    }

    /// Follow the main line `n` steps.  `next_n(p, 0) == Some(p)`.
    pub fn next_n(&self, point: SplinePointId, n: usize) -> Option<SplinePointId> {
        let mut p = point;
        for _ in 0..n {
            p = self.next(p)?;
        }
        Some(p)
    }

    // ── Junctions ─────────────────────────────────────────────────────────

    #[inline]
    pub fn junction(&self, id: JunctionId) -> &Junction {
        &self.junctions[id.index()]
    }

    /// Junction starting at `point`, if any.
    #[inline]
    pub fn junction_start(&self, point: SplinePointId) -> Option<JunctionId> {
        valid_junction(self.point_junction_start[point.index()])
    }

    /// Junction with a branch ending at `point`, if any.
    #[inline]
    pub fn junction_end(&self, point: SplinePointId) -> Option<JunctionId> {
        valid_junction(self.point_junction_end[point.index()])
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest spline point to `pos`.  `None` only for an empty graph.
    pub fn nearest_point(&self, pos: Vec3) -> Option<SplinePointId> {
        self.spatial_idx.nearest_neighbor(&pos.to_array()).map(|e| e.id)
    }

    /// All points within `radius` metres of `pos`, in no particular order.
    pub fn points_within(&self, pos: Vec3, radius: f32) -> impl Iterator<Item = SplinePointId> + '_ {
        self.spatial_idx
            .locate_within_distance(pos.to_array(), radius * radius)
            .map(|e| e.id)
    }
}

#[inline(always)]
fn valid(id: SplinePointId) -> Option<SplinePointId> {
    id.is_valid().then_some(id)
}

#[inline(always)]
fn valid_junction(id: JunctionId) -> Option<JunctionId> {
    id.is_valid().then_some(id)
}

/// Radius of the circle through `a`, `b`, `c`; infinite when collinear.
fn circumradius(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    let ab = b - a;
    let bc = c - b;
    let ca = a - c;
    let twice_area = ab.cross(c - a).length();
    if twice_area < 1e-6 {
        return f32::INFINITY;
    }
    ab.length() * bc.length() * ca.length() / (2.0 * twice_area)
}

// ── SplineGraphBuilder ────────────────────────────────────────────────────────

/// Construct a [`SplineGraph`] incrementally, then call [`build`](Self::build).
///
/// Links may be declared in any order.  `build()` derives predecessors,
/// segment lengths and curve radii, validates every reference, and bulk-loads
/// the R-tree.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use tr_core::StatusFlags;
/// use tr_spline::{JunctionSignals, SplineGraphBuilder};
///
/// let mut b = SplineGraphBuilder::new();
/// let main = b.add_polyline(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 20.0)], false);
/// let exit = b.add_point(Vec3::new(5.0, 0.0, 15.0));
/// b.add_junction(main[1], exit, 0.25, JunctionSignals {
///     indicate_when_taken: StatusFlags::INDICATE_RIGHT,
///     ..Default::default()
/// });
/// let graph = b.build().unwrap();
/// assert_eq!(graph.point_count(), 4);
/// assert_eq!(graph.junction_count(), 1);
/// ```
pub struct SplineGraphBuilder {
    points:    Vec<RawPoint>,
    junctions: Vec<RawJunction>,
    /// First unknown id passed to a setter; reported by `build()`.
    dangling:  Option<SplinePointId>,
}

struct RawPoint {
    pos:    Vec3,
    next:   SplinePointId,
    left:   SplinePointId,
    radius: Option<f32>,
    camber: f32,
}

struct RawJunction {
    start:       SplinePointId,
    branches:    Vec<JunctionBranch>,
    stay_weight: f32,
    signals:     JunctionSignals,
}

impl SplineGraphBuilder {
    pub fn new() -> Self {
        Self { points: Vec::new(), junctions: Vec::new(), dangling: None }
    }

    pub fn with_capacity(points: usize) -> Self {
        Self { points: Vec::with_capacity(points), junctions: Vec::new(), dangling: None }
    }

    pub fn point_count(&self) -> usize { self.points.len() }

    /// Add an unlinked point and return its id (sequential from 0).
    pub fn add_point(&mut self, pos: Vec3) -> SplinePointId {
        let id = SplinePointId(self.points.len() as u32);
        self.points.push(RawPoint {
            pos,
            next:   SplinePointId::INVALID,
            left:   SplinePointId::INVALID,
            radius: None,
            camber: 0.0,
        });
        id
    }

    /// Add points along `positions`, linking each to the one after it.  With
    /// `closed`, the last point links back to the first.
    pub fn add_polyline(&mut self, positions: &[Vec3], closed: bool) -> Vec<SplinePointId> {
        let ids: Vec<SplinePointId> = positions.iter().map(|&p| self.add_point(p)).collect();
        for pair in ids.windows(2) {
            self.connect(pair[0], pair[1]);
        }
        if closed && ids.len() > 1 {
            self.connect(ids[ids.len() - 1], ids[0]);
        }
        ids
    }

    /// Make `to` the main-line successor of `from`.
    pub fn connect(&mut self, from: SplinePointId, to: SplinePointId) {
        self.note_if_unknown(to);
        if let Some(p) = self.point_mut(from) {
            p.next = to;
        }
    }

    /// Declare `left` as the lane immediately left of `point`.
    pub fn set_left_lane(&mut self, point: SplinePointId, left: SplinePointId) {
        self.note_if_unknown(left);
        if let Some(p) = self.point_mut(point) {
            p.left = left;
        }
    }

    /// Override the derived curve radius at `point`.  `build()` rejects
    /// negative or non-finite values.
    pub fn set_radius(&mut self, point: SplinePointId, radius: f32) {
        if let Some(p) = self.point_mut(point) {
            p.radius = Some(radius);
        }
    }

    pub fn set_camber(&mut self, point: SplinePointId, camber: f32) {
        if let Some(p) = self.point_mut(point) {
            p.camber = camber;
        }
    }

    /// Single-branch junction: leave the main line at `start` for `end` with
    /// probability `probability`.
    pub fn add_junction(
        &mut self,
        start:       SplinePointId,
        end:         SplinePointId,
        probability: f32,
        signals:     JunctionSignals,
    ) -> JunctionId {
        let p = probability.clamp(0.0, 1.0);
        self.add_junction_branches(start, vec![JunctionBranch { end, weight: p }], 1.0 - p, signals)
    }

    /// Junction with any number of weighted branches.
    pub fn add_junction_branches(
        &mut self,
        start:       SplinePointId,
        branches:    Vec<JunctionBranch>,
        stay_weight: f32,
        signals:     JunctionSignals,
    ) -> JunctionId {
        let id = JunctionId(self.junctions.len() as u32);
        self.junctions.push(RawJunction { start, branches, stay_weight, signals });
        id
    }

    fn point_mut(&mut self, id: SplinePointId) -> Option<&mut RawPoint> {
        let found = self.points.get_mut(id.index());
        if found.is_none() && self.dangling.is_none() {
            self.dangling = Some(id);
        }
        found
    }

    fn note_if_unknown(&mut self, id: SplinePointId) {
        if id.index() >= self.points.len() && self.dangling.is_none() {
            self.dangling = Some(id);
        }
    }

    /// Consume the builder and produce a [`SplineGraph`].
    ///
    /// Time complexity: O(N log N) for the R-tree bulk load; everything else
    /// is linear in points plus junction branches.
    pub fn build(self) -> SplineResult<SplineGraph> {
        if let Some(id) = self.dangling {
            return Err(SplineError::UnknownPoint(id));
        }
        let n = self.points.len();
        let in_range = |id: SplinePointId| id.index() < n;

        let point_pos:  Vec<Vec3>          = self.points.iter().map(|p| p.pos).collect();
        let point_next: Vec<SplinePointId> = self.points.iter().map(|p| p.next).collect();
        let point_left: Vec<SplinePointId> = self.points.iter().map(|p| p.left).collect();
        let point_camber: Vec<f32>         = self.points.iter().map(|p| p.camber).collect();

        for (i, pos) in point_pos.iter().enumerate() {
            if !pos.is_finite() {
                return Err(SplineError::NonFinitePosition(SplinePointId(i as u32)));
            }
        }
        for (i, p) in self.points.iter().enumerate() {
            if let Some(radius) = p.radius.filter(|r| !r.is_finite() || *r < 0.0) {
                return Err(SplineError::InvalidRadius { point: SplinePointId(i as u32), radius });
            }
        }

        // Predecessors and segment lengths.  At a merge the lowest-numbered
        // predecessor wins.
        let mut point_prev   = vec![SplinePointId::INVALID; n];
        let mut point_length = vec![0.0f32; n];
        for (i, &next) in point_next.iter().enumerate() {
            if !next.is_valid() {
                continue;
            }
            let id = SplinePointId(i as u32);
            let len = point_pos[i].distance(point_pos[next.index()]);
            if len < MIN_SEGMENT_LENGTH {
                return Err(SplineError::DegenerateSegment(id));
            }
            point_length[i] = len;
            if !point_prev[next.index()].is_valid() {
                point_prev[next.index()] = id;
            }
        }

        // Junctions.
        let mut point_junction_start = vec![JunctionId::INVALID; n];
        let mut point_junction_end   = vec![JunctionId::INVALID; n];
        let mut junctions = Vec::with_capacity(self.junctions.len());
        for (j, raw) in self.junctions.into_iter().enumerate() {
            let id = JunctionId(j as u32);
            if !in_range(raw.start) {
                return Err(SplineError::UnknownPoint(raw.start));
            }
            let existing = point_junction_start[raw.start.index()];
            if existing.is_valid() {
                return Err(SplineError::DuplicateJunction { point: raw.start, existing });
            }
            if !raw.branches.iter().any(|b| b.weight > 0.0) && raw.stay_weight <= 0.0 {
                return Err(SplineError::EmptyJunction(raw.start));
            }
            for branch in &raw.branches {
                if !in_range(branch.end) {
                    return Err(SplineError::UnknownPoint(branch.end));
                }
                let gap = point_pos[raw.start.index()].distance(point_pos[branch.end.index()]);
                if gap < MIN_SEGMENT_LENGTH {
                    return Err(SplineError::DegenerateSegment(raw.start));
                }
                if !point_junction_end[branch.end.index()].is_valid() {
                    point_junction_end[branch.end.index()] = id;
                }
            }
            point_junction_start[raw.start.index()] = id;
            junctions.push(Junction {
                id,
                start:       raw.start,
                branches:    raw.branches,
                stay_weight: raw.stay_weight,
                signals:     raw.signals,
            });
        }

        // Curve radii: explicit, else through (prev, p, next), else straight.
        let point_radius: Vec<f32> = (0..n)
            .map(|i| {
                if let Some(r) = self.points[i].radius {
                    return r;
                }
                let prev = point_prev[i];
                let next = point_next[i];
                if prev.is_valid() && next.is_valid() {
                    circumradius(point_pos[prev.index()], point_pos[i], point_pos[next.index()])
                } else {
                    f32::INFINITY
                }
            })
            .collect();
        let min_radius = point_radius
            .iter()
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
            .fold(f32::INFINITY, f32::min);

        let entries: Vec<PointEntry> = point_pos
            .iter()
            .enumerate()
            .map(|(i, p)| PointEntry { point: p.to_array(), id: SplinePointId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Ok(SplineGraph {
            point_pos,
            point_next,
            point_prev,
            point_left,
            point_length,
            point_radius,
            point_camber,
            point_junction_start,
            point_junction_end,
            junctions,
            min_radius,
            spatial_idx,
        })
    }
}

impl Default for SplineGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
