//! Speed decisions: spline look-ahead, player detection, obstacle handling.

use tracing::trace;

use tr_core::{AgentId, ServerTime};
use tr_spline::physics::{braking_distance, max_cornering_speed};

use crate::context::TickContext;
use crate::player::PlayerState;
use crate::state::AiState;

/// Anything nearer than this forces a stop, m.
const NEAR_OBSTACLE_DISTANCE: f32 = 10.0;

/// Added to twice the braking distance when deciding to follow, m.
const BRAKING_MARGIN: f32 = 20.0;

/// Slowest speed an agent follows at, 7 km/h.
const WALKING_SPEED: f32 = 7.0 / 3.6;

/// Players slower than this count as stationary, m/s.
const PLAYER_STATIONARY_EPSILON: f32 = 0.1;

/// Minimum look-ahead distance, m.
const MIN_LOOKAHEAD: f32 = 50.0;

const HONK_DELAY_MS: (i64, i64) = (3_000, 7_000);
const HONK_LENGTH_MS: (i64, i64) = (500, 1_500);
const IGNORE_OBSTACLES_FOR_MS: i64 = 10_000;

/// Result of walking the route ahead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lookahead {
    /// First agent found on the route ahead.
    pub closest_ai:          Option<AgentId>,
    /// Straight-line distance to `closest_ai`; `f32::MAX` if none.
    pub closest_ai_distance: f32,
    /// Tightest cornering speed that must be braked for now; `f32::MAX` if
    /// unconstrained.
    pub max_speed:           f32,
}

impl AiState {
    /// Walk the route ahead up to a speed-dependent horizon.
    ///
    /// Arms the turn indicator for the first signalling junction within its
    /// pre-indicate distance, finds the first occupied point, and collects
    /// the lowest cornering speed whose braking distance already exceeds the
    /// distance to that corner.
    pub fn lookahead(&mut self, ctx: &TickContext<'_>) -> Lookahead {
        let graph = ctx.graph;
        let car = &self.car;
        let brake_decel = car.deceleration * car.cornering_brake_force_factor;

        let worst_corner = max_cornering_speed(graph.min_radius(), car.cornering_speed_factor);
        let horizon = (braking_distance(self.current_speed - worst_corner, brake_decel)
            * car.cornering_brake_distance_factor)
            .max(MIN_LOOKAHEAD)
            .min(ctx.params.max_lookahead_meters);

        let mut result = Lookahead {
            closest_ai:          None,
            closest_ai_distance: f32::MAX,
            max_speed:           f32::MAX,
        };
        let mut junction_found = false;
        let mut travelled = 0.0f32;
        let mut point = self.current_point;

        while travelled < horizon {
            travelled += self.cursor.segment_length(graph, point, &mut self.rng);
            let Some(next) = self.cursor.next(graph, point, &mut self.rng) else {
                break;
            };
            point = next;

            if !junction_found {
                if let Some(j) = graph.junction_start(point) {
                    let junction = graph.junction(j);
                    if travelled < junction.signals.indicate_distance_pre {
                        let choice = self.cursor.choice(graph, j, &mut self.rng);
                        let indicator = junction.indicator_for(choice);
                        if !indicator.is_empty() {
                            self.indicator = indicator;
                            self.next_junction = Some(j);
                            junction_found = true;
                        }
                    }
                }
            }

            if result.closest_ai.is_none() {
                if let Some(other) = ctx.directory.occupant(point).filter(|&a| a != self.id) {
                    if let Some(peer) = ctx.peers.get(other.index()) {
                        result.closest_ai = Some(other);
                        result.closest_ai_distance = self.status.position.distance(peer.position);
                    }
                }
            }

            let corner_speed = max_cornering_speed(graph.radius(point), self.car.cornering_speed_factor);
            if corner_speed < self.current_speed {
                let distance = braking_distance(self.current_speed - corner_speed, brake_decel)
                    * self.car.cornering_brake_distance_factor;
                if distance > travelled {
                    result.max_speed = result.max_speed.min(corner_speed);
                }
            }
        }

        result
    }

    /// Bearing of `target` relative to this car's heading, degrees in
    /// `[0, 360)`.  Directly ahead reads 180.
    pub fn angle_to(&self, target: glam::Vec3) -> f32 {
        let here = self.status.position;
        let mut angle = (here.x - target.x).atan2(here.z - target.z).to_degrees();
        if angle < 0.0 {
            angle += 360.0;
        }
        (angle + self.status.heading_degrees()) % 360.0
    }

    /// Nearest player inside the forward cone and its distance.
    pub fn find_nearest_player_obstacle<'p>(
        &self,
        players:         &'p [PlayerState],
        cone_half_angle: f32,
    ) -> Option<(&'p PlayerState, f32)> {
        let here = self.status.position;
        let (low, high) = (180.0 - cone_half_angle, 180.0 + cone_half_angle);

        let mut best: Option<(&PlayerState, f32)> = None;
        for player in players {
            let d2 = player.position.distance_squared(here);
            if best.is_some_and(|(_, min)| d2 >= min) {
                continue;
            }
            let angle = self.angle_to(player.position);
            if angle > low && angle < high {
                best = Some((player, d2));
            }
        }
        best.map(|(p, d2)| (p, d2.sqrt()))
    }

    /// Choose this tick's target speed.
    ///
    /// Order of precedence: ignore-obstacles window, collision stop, spawn
    /// protection, then the nearer of player and agent obstacles, then the
    /// cornering limit from [`lookahead`](Self::lookahead).
    pub fn detect_obstacles(&mut self, ctx: &TickContext<'_>) {
        if !self.initialized {
            return;
        }
        let now = ctx.now;
        let (accel, decel) = (self.car.acceleration, self.car.deceleration);

        if now < self.ignore_obstacles_until {
            self.set_target_speed(self.max_speed, decel, accel);
            return;
        }
        if now < self.stopped_for_collision_until {
            self.set_target_speed(0.0, decel, accel);
            return;
        }
        if now < self.spawn_protection_ends {
            self.set_target_speed(self.max_speed, decel, accel);
            return;
        }

        let mut target = self.initial_max_speed;
        let mut has_obstacle = false;

        let ahead = self.lookahead(ctx);
        let player = self.find_nearest_player_obstacle(ctx.players, ctx.params.obstacle_cone_half_angle_deg);
        let player_distance = player.map_or(f32::MAX, |(_, d)| d);

        if player_distance < NEAR_OBSTACLE_DISTANCE || ahead.closest_ai_distance < NEAR_OBSTACLE_DISTANCE {
            target = 0.0;
            has_obstacle = true;
        } else if let Some((player, distance)) = player.filter(|_| player_distance < ahead.closest_ai_distance) {
            let mut player_speed = player.speed();
            if player_speed < PLAYER_STATIONARY_EPSILON {
                player_speed = 0.0;
            }
            if self.should_follow(player_speed, distance) {
                target = WALKING_SPEED.max(player_speed);
                has_obstacle = true;
            }
        } else if let Some(other) = ahead.closest_ai.and_then(|a| ctx.peers.get(a.index())) {
            if other.has_slowdown() {
                if self.should_follow(other.current_speed, ahead.closest_ai_distance) {
                    target = WALKING_SPEED.max(other.current_speed);
                    has_obstacle = true;
                }
            } else if ahead.closest_ai_distance.powi(2) < self.safety_distance_squared {
                // Clean air ahead: settle in behind.
                self.max_speed = WALKING_SPEED.max(other.current_speed);
                target = self.max_speed;
            }
        }

        target = target.min(ahead.max_speed);

        self.update_stopped_timer(now, ctx.params.ignore_obstacles_after_ms);

        let deceleration = if has_obstacle { decel } else { decel * self.car.cornering_brake_force_factor };
        self.set_target_speed(target, deceleration, accel);
    }

    /// `true` if something ahead moving at `their_speed` and `distance` away
    /// is slower and within braking reach.
    fn should_follow(&self, their_speed: f32, distance: f32) -> bool {
        (their_speed < self.current_speed || their_speed == 0.0)
            && distance
                < braking_distance(self.current_speed - their_speed, self.car.deceleration) * 2.0
                    + BRAKING_MARGIN
    }

    fn update_stopped_timer(&mut self, now: ServerTime, ignore_after_ms: i64) {
        if self.current_speed == 0.0 && !self.stopped_for_obstacle {
            self.stopped_for_obstacle = true;
            self.stopped_for_obstacle_since = now;
            self.obstacle_honk_start = now + self.rng.between_i64(HONK_DELAY_MS.0, HONK_DELAY_MS.1);
            self.obstacle_honk_end =
                self.obstacle_honk_start + self.rng.between_i64(HONK_LENGTH_MS.0, HONK_LENGTH_MS.1);
            trace!(agent = %self.id, "stopped for obstacle");
        } else if self.current_speed > 0.0 && self.stopped_for_obstacle {
            self.stopped_for_obstacle = false;
            trace!(agent = %self.id, "no longer stopped for obstacle");
        } else if self.stopped_for_obstacle && now.since(self.stopped_for_obstacle_since) > ignore_after_ms {
            self.ignore_obstacles_until = now + IGNORE_OBSTACLES_FOR_MS;
            trace!(agent = %self.id, until = %self.ignore_obstacles_until, "ignoring obstacles");
        }
    }
}
