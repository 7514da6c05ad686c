//! The AI car state machine.
//!
//! # Lifecycle
//!
//! ```text
//!  Uninitialized ──teleport──▶ Running ──update (dead end)──▶ Uninitialized
//!        ▲                        │
//!        └────────despawn─────────┘
//! ```
//!
//! `teleport` re-randomizes everything (speed, colour, safety distance,
//! spawn protection) and runs one immediate `update` so the agent has a
//! valid status before its first transmission.  An uninitialized agent
//! ignores `detect_obstacles` and `update` entirely.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use tracing::debug;

use tr_core::{AgentId, AgentRng, AiParams, JunctionId, ServerTime, SplinePointId, StatusFlags};
use tr_spline::{MapCursor, SplineGraph, catmull_rom};

use crate::context::{AgentSnapshot, TickContext};
use crate::error::{AgentError, AgentResult};
use crate::palette::{CAR_COLORS, Rgb};
use crate::params::AiCarParams;
use crate::status::{self, CENTRED_ANGLE, CarStatus};

/// Below this speed (20 km/h) hazard lights are on.
const HAZARD_SPEED: f32 = 20.0 / 3.6;

const WHEEL_DIAMETER: f32 = 0.65;

const AI_GEAR: u8 = 2;

/// Outcome of one [`AiState::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentUpdate {
    /// The agent is uninitialized; nothing happened.
    Idle,
    /// The agent moved and its status was rebuilt.
    Moved,
    /// The agent ran out of road at `at` and is now uninitialized.
    Despawned { at: SplinePointId },
}

pub struct AiState {
    pub(crate) id:    AgentId,
    pub(crate) car:   AiCarParams,
    pub(crate) rng:   AgentRng,
    pub(crate) cursor: MapCursor,
    pub(crate) status: CarStatus,

    pub(crate) initialized:   bool,
    pub(crate) current_point: SplinePointId,
    segment_length:           f32,
    segment_progress:         f32,
    last_tick:                ServerTime,

    // ── Kinematics ────────────────────────────────────────────────────────
    pub(crate) current_speed:     f32,
    pub(crate) target_speed:      f32,
    pub(crate) acceleration:      f32,
    pub(crate) initial_max_speed: f32,
    pub(crate) max_speed:         f32,

    // ── Obstacle handling ─────────────────────────────────────────────────
    pub(crate) safety_distance_squared:     f32,
    pub(crate) spawn_protection_ends:       ServerTime,
    pub(crate) stopped_for_obstacle:        bool,
    pub(crate) stopped_for_obstacle_since:  ServerTime,
    pub(crate) ignore_obstacles_until:      ServerTime,
    pub(crate) stopped_for_collision_until: ServerTime,
    pub(crate) obstacle_honk_start:         ServerTime,
    pub(crate) obstacle_honk_end:           ServerTime,

    // ── Indicators ────────────────────────────────────────────────────────
    pub(crate) indicator:          StatusFlags,
    pub(crate) next_junction:      Option<JunctionId>,
    junction_passed:               bool,
    end_indicator_distance:        f32,

    spawn_counter: u8,
    color:         Rgb,
}

impl AiState {
    /// A new, uninitialized agent.
    pub fn new(id: AgentId, car: AiCarParams, rng: AgentRng) -> Self {
        Self {
            id,
            car,
            rng,
            cursor: MapCursor::new(),
            status: CarStatus::default(),

            initialized:      false,
            current_point:    SplinePointId::INVALID,
            segment_length:   0.0,
            segment_progress: 0.0,
            last_tick:        ServerTime::ZERO,

            current_speed:     0.0,
            target_speed:      0.0,
            acceleration:      0.0,
            initial_max_speed: 0.0,
            max_speed:         0.0,

            safety_distance_squared:     20.0 * 20.0,
            spawn_protection_ends:       ServerTime::ZERO,
            stopped_for_obstacle:        false,
            stopped_for_obstacle_since:  ServerTime::ZERO,
            ignore_obstacles_until:      ServerTime::ZERO,
            stopped_for_collision_until: ServerTime::ZERO,
            obstacle_honk_start:         ServerTime::ZERO,
            obstacle_honk_end:           ServerTime::ZERO,

            indicator:              StatusFlags::NONE,
            next_junction:          None,
            junction_passed:        false,
            end_indicator_distance: 0.0,

            spawn_counter: 0,
            color:         CAR_COLORS[0],
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline] pub fn id(&self) -> AgentId { self.id }
    #[inline] pub fn is_initialized(&self) -> bool { self.initialized }
    #[inline] pub fn current_point(&self) -> SplinePointId { self.current_point }
    #[inline] pub fn segment_length(&self) -> f32 { self.segment_length }
    #[inline] pub fn segment_progress(&self) -> f32 { self.segment_progress }
    #[inline] pub fn current_speed(&self) -> f32 { self.current_speed }
    #[inline] pub fn target_speed(&self) -> f32 { self.target_speed }
    #[inline] pub fn acceleration(&self) -> f32 { self.acceleration }
    #[inline] pub fn initial_max_speed(&self) -> f32 { self.initial_max_speed }
    #[inline] pub fn max_speed(&self) -> f32 { self.max_speed }
    #[inline] pub fn safety_distance_squared(&self) -> f32 { self.safety_distance_squared }
    #[inline] pub fn spawn_protection_ends(&self) -> ServerTime { self.spawn_protection_ends }
    #[inline] pub fn ignore_obstacles_until(&self) -> ServerTime { self.ignore_obstacles_until }
    #[inline] pub fn is_stopped_for_obstacle(&self) -> bool { self.stopped_for_obstacle }
    #[inline] pub fn indicator(&self) -> StatusFlags { self.indicator }
    #[inline] pub fn spawn_counter(&self) -> u8 { self.spawn_counter }
    #[inline] pub fn color(&self) -> Rgb { self.color }
    #[inline] pub fn status(&self) -> &CarStatus { &self.status }
    #[inline] pub fn car(&self) -> &AiCarParams { &self.car }
    #[inline] pub fn cursor(&self) -> &MapCursor { &self.cursor }

    /// Replace this agent's car tunables; takes effect on the next teleport
    /// for speed, immediately for everything else.
    pub fn set_car(&mut self, car: AiCarParams) {
        self.car = car;
    }

    /// The view other agents get of this one.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            position:      self.status.position,
            current_speed: self.current_speed,
            target_speed:  self.target_speed,
            max_speed:     self.max_speed,
            initialized:   self.initialized,
        }
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    /// Place the agent at `point` with freshly randomized state and run one
    /// update so its status is immediately valid.
    ///
    /// Fails, leaving the agent uninitialized, if `point` is not in the graph
    /// or has no successor.
    pub fn teleport(&mut self, point: SplinePointId, ctx: &TickContext<'_>) -> AgentResult<()> {
        let graph = ctx.graph;
        if !graph.contains(point) {
            self.initialized = false;
            return Err(AgentError::UnknownPoint(point));
        }

        self.cursor.clear();
        self.current_point = point;
        if !self.cursor.advance_to(graph, point, &mut self.rng) {
            self.initialized = false;
            return Err(AgentError::NoSuccessor { agent: self.id, point });
        }
        self.segment_length = self.cursor.segment_length(graph, point, &mut self.rng);
        self.segment_progress = 0.0;

        self.set_random_speed(graph, point);
        self.set_random_color();

        let params = ctx.params;
        self.spawn_protection_ends = ctx.now
            + self.rng.between_i64(params.min_spawn_protection_time_ms, params.max_spawn_protection_time_ms);
        let (min_safety, max_safety) = params.scaled_safety_distance_squared();
        self.safety_distance_squared = self.rng.between_i64(min_safety, max_safety) as f32;

        self.acceleration = 0.0;
        self.stopped_for_obstacle = false;
        self.stopped_for_collision_until = ServerTime::ZERO;
        self.ignore_obstacles_until = ServerTime::ZERO;
        self.obstacle_honk_start = ServerTime::ZERO;
        self.obstacle_honk_end = ServerTime::ZERO;
        self.indicator = StatusFlags::NONE;
        self.next_junction = None;
        self.junction_passed = false;
        self.end_indicator_distance = 0.0;
        self.last_tick = ctx.now;
        self.spawn_counter = self.spawn_counter.wrapping_add(1);
        self.initialized = true;

        self.update(ctx);
        Ok(())
    }

    /// Mark the agent uninitialized.  Used by the coordinator to recycle it.
    pub fn despawn(&mut self) {
        self.initialized = false;
    }

    fn set_random_speed(&mut self, graph: &SplineGraph, point: SplinePointId) {
        let car = &self.car;
        let variation = car.max_speed_ms * car.max_speed_variation_percent;
        let lane_offset = if graph.left(point).is_some() { car.right_lane_offset_ms } else { 0.0 };
        let speed = car.max_speed_ms + lane_offset - variation / 2.0 + self.rng.unit_f32() * variation;

        self.initial_max_speed = speed;
        self.current_speed = speed;
        self.target_speed = speed;
        self.max_speed = speed;
    }

    fn set_random_color(&mut self) {
        let i = self.rng.index(CAR_COLORS.len()).unwrap_or(0);
        self.color = CAR_COLORS[i];
    }

    /// Hold the car still for a random collision-stop duration.
    pub fn stop_for_collision(&mut self, now: ServerTime, params: &AiParams) {
        self.stopped_for_collision_until =
            now + self.rng.between_i64(params.min_collision_stop_time_ms, params.max_collision_stop_time_ms);
    }

    // ── Movement ──────────────────────────────────────────────────────────

    /// Move `delta` metres along this agent's route.
    ///
    /// Crosses as many segment boundaries as needed; each new segment needs
    /// both a successor and a successor's successor.  Returns `false` if the
    /// route runs out, leaving the agent on the last point it reached.
    pub fn advance(&mut self, graph: &SplineGraph, delta: f32) -> bool {
        let mut progress = self.segment_progress + delta;

        while progress >= self.segment_length {
            progress -= self.segment_length;

            let left = self.current_point;
            let Some(next) = self.cursor.next(graph, left, &mut self.rng) else {
                return false;
            };
            let Some(next2) = self.cursor.next(graph, next, &mut self.rng) else {
                return false;
            };

            self.current_point = next;
            self.segment_length = graph.position(next).distance(graph.position(next2));
            self.cursor.advance_to(graph, next, &mut self.rng);

            if self.junction_passed {
                self.end_indicator_distance -= self.segment_length;
                if self.end_indicator_distance < 0.0 {
                    self.indicator = StatusFlags::NONE;
                    self.junction_passed = false;
                    self.end_indicator_distance = 0.0;
                }
            }

            if let Some(j) = self.next_junction {
                if graph.junction_start(left) == Some(j) {
                    self.junction_passed = true;
                    self.end_indicator_distance = graph.junction(j).signals.indicate_distance_post;
                    self.next_junction = None;
                }
            }
        }

        self.segment_progress = progress;
        true
    }

    /// Set the target speed and pick the acceleration that reaches it.
    pub(crate) fn set_target_speed(&mut self, speed: f32, deceleration: f32, acceleration: f32) {
        self.target_speed = speed;
        self.acceleration = if speed < self.current_speed {
            -deceleration
        } else if speed > self.current_speed {
            acceleration
        } else {
            0.0
        };
    }

    /// Integrate speed, move, and rebuild the status record.
    pub fn update(&mut self, ctx: &TickContext<'_>) -> AgentUpdate {
        if !self.initialized {
            return AgentUpdate::Idle;
        }
        let now = ctx.now;
        let graph = ctx.graph;

        let dt = now.since(self.last_tick).max(0) as f32 / 1000.0;
        self.last_tick = now;

        if self.acceleration != 0.0 {
            self.current_speed += self.acceleration * dt;
            if (self.acceleration < 0.0 && self.current_speed < self.target_speed)
                || (self.acceleration > 0.0 && self.current_speed > self.target_speed)
            {
                self.current_speed = self.target_speed;
                self.acceleration = 0.0;
            }
        }

        let next = if self.advance(graph, dt * self.current_speed) {
            self.cursor.next(graph, self.current_point, &mut self.rng)
        } else {
            None
        };
        let Some(next) = next else {
            debug!(agent = %self.id, point = %self.current_point, "reached spline end, despawning");
            self.initialized = false;
            return AgentUpdate::Despawned { at: self.current_point };
        };

        let t = self.segment_progress / self.segment_length;
        let smooth = catmull_rom::evaluate(
            graph.position(self.current_point),
            graph.position(next),
            self.cursor.start_tangent(),
            self.cursor.end_tangent(),
            t,
        );
        let tangent = smooth.tangent;
        let rotation = Vec3::new(
            tangent.z.atan2(tangent.x) - FRAC_PI_2,
            -(Vec2::new(tangent.z, tangent.x).length().atan2(tangent.y) - FRAC_PI_2),
            graph.camber(self.current_point, t),
        );

        let tyre = status::encode_tyre_angular_speed(
            status::tyre_angular_speed(self.current_speed, WHEEL_DIAMETER),
        );

        let flags = self.status_flags(now, ctx.rain_intensity);

        let s = &mut self.status;
        s.timestamp = now;
        s.position = smooth.position + Vec3::Y * self.car.spline_height_offset_meters;
        s.rotation = rotation;
        s.velocity = tangent * self.current_speed;
        s.steer_angle = CENTRED_ANGLE;
        s.wheel_angle = CENTRED_ANGLE;
        s.tyre_angular_speed = [tyre; 4];
        s.engine_rpm = status::engine_rpm(
            self.car.idle_engine_rpm,
            self.car.max_engine_rpm,
            self.current_speed,
            self.car.max_speed_ms,
        );
        s.gear = AI_GEAR;
        s.status_flags = flags;

        AgentUpdate::Moved
    }

    fn status_flags(&self, now: ServerTime, rain_intensity: f32) -> StatusFlags {
        let mut flags = StatusFlags::LIGHTS_ON | StatusFlags::HIGH_BEAMS_OFF;
        if now < self.stopped_for_collision_until || self.current_speed < HAZARD_SPEED {
            flags |= StatusFlags::HAZARDS_ON;
        }
        if self.current_speed == 0.0 || self.acceleration < 0.0 {
            flags |= StatusFlags::BRAKE_LIGHTS_ON;
        }
        if self.stopped_for_obstacle && now > self.obstacle_honk_start && now < self.obstacle_honk_end {
            flags |= StatusFlags::HORN;
        }
        flags | StatusFlags::wipers_for_rain(rain_intensity) | self.indicator
    }
}
