//! ring_road — smallest end-to-end run of the rust_traffic engine.
//!
//! A 300 m radius ring road with one exit ramp.  A single synthetic player
//! laps the ring; AI traffic spawns ahead of them, follows, brakes for the
//! player, signals and takes the exit, and despawns where the ramp ends.
//! Every car status is encoded to the replication wire format each tick.
//!
//! `RUST_LOG=tr_agent=trace` shows individual agent transitions.

mod road;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tr_agent::{CarStatus, PlayerState, status::ENCODED_LEN};
use tr_core::{AgentId, AiParams, MonotonicClock, ServerTime, SessionId, SimConfig, SplinePointId};
use tr_sim::{TickStats, TrafficEvent, TrafficObserver, TrafficSimBuilder};

use road::build_ring_road;

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT:      usize = 24;
const SEED:             u64   = 42;
const TICK_INTERVAL_MS: u32   = 50;
const SIM_SECONDS:      u64   = 120;
const PLAYER_SPEED:     f32   = 15.0; // m/s
const RAIN_AT_SECS:     u64   = 60;

// ── Observer ──────────────────────────────────────────────────────────────────

/// Encodes every status the way a replication layer would and keeps totals.
#[derive(Default)]
struct ReplicationObserver {
    buf:           Vec<u8>,
    packets:       usize,
    encode_errors: usize,
    spawns:        usize,
    despawns:      usize,
    peak_active:   usize,
}

impl TrafficObserver for ReplicationObserver {
    fn on_tick_start(&mut self, _now: ServerTime) {
        self.buf.clear();
    }

    fn on_spawn(&mut self, _agent: AgentId, _at: SplinePointId) {
        self.spawns += 1;
    }

    fn on_despawn(&mut self, _agent: AgentId, _at: SplinePointId) {
        self.despawns += 1;
    }

    fn on_status(&mut self, _agent: AgentId, status: &CarStatus) {
        match status.encode_into(&mut self.buf) {
            Ok(()) => self.packets += 1,
            Err(_) => self.encode_errors += 1,
        }
    }

    fn on_tick_end(&mut self, stats: &TickStats) {
        self.peak_active = self.peak_active.max(stats.active);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== ring_road — rust_traffic ===");
    println!("Agents: {AGENT_COUNT}  |  Seconds: {SIM_SECONDS}  |  Seed: {SEED}");
    println!();

    // 1. Build the road.
    let graph = build_ring_road()?;
    println!(
        "Spline graph: {} points, {} junctions, tightest radius {:.1} m",
        graph.point_count(),
        graph.junction_count(),
        graph.min_radius()
    );
    let ring = road::RING_RADIUS;

    // 2. Configuration.
    let config = SimConfig { seed: SEED, tick_interval_ms: TICK_INTERVAL_MS, num_threads: None };
    let params = AiParams {
        min_spawn_distance_to_player:    100.0,
        max_spawn_distance_to_player:    300.0,
        spawn_safety_distance_to_player: 80.0,
        ..AiParams::default()
    };

    // 3. Build the coordinator.
    let mut sim = TrafficSimBuilder::new(config, params, graph, AGENT_COUNT).build()?;
    let events = sim.event_sender();

    // 4. Run, feeding the player's position once per simulated second.
    let ticks_per_sec = 1_000 / TICK_INTERVAL_MS as u64;
    let mut obs = ReplicationObserver::default();
    let wall = MonotonicClock::start();

    for second in 0..SIM_SECONDS {
        let angle = second as f32 * PLAYER_SPEED / ring;
        let (sin, cos) = angle.sin_cos();
        let player = PlayerState::new(
            SessionId(0),
            road::ring_position(angle),
            tr_spline::Vec3::new(-sin, 0.0, cos) * PLAYER_SPEED,
        );
        events.send(TrafficEvent::PlayerUpdated(player))?;
        if second == RAIN_AT_SECS {
            events.send(TrafficEvent::RainChanged(0.4))?;
        }

        sim.run_ticks(ticks_per_sec, &mut obs);
        if second % 10 == 9 {
            info!(
                time = %sim.clock.now,
                active = sim.active_count(),
                spawns = obs.spawns,
                despawns = obs.despawns,
                "progress"
            );
        }
    }
    let elapsed = wall.now();

    // 5. Summary.
    println!();
    println!("Simulation complete in {elapsed} wall time ({} ticks)", sim.clock.ticks);
    println!("  spawns        : {}", obs.spawns);
    println!("  despawns      : {}", obs.despawns);
    println!("  peak active   : {}", obs.peak_active);
    println!("  status packets: {} × {ENCODED_LEN} bytes", obs.packets);
    if obs.encode_errors > 0 {
        eprintln!("  encode errors : {}", obs.encode_errors);
    }
    println!();

    // 6. Final agent table.
    println!("{:<6} {:<7} {:<8} {:>9} {:>8}", "Agent", "Active", "Point", "Speed", "Flags");
    println!("{}", "-".repeat(42));
    for agent in sim.agents() {
        println!(
            "{:<6} {:<7} {:<8} {:>9.1} {:>#8x}",
            agent.id().0,
            if agent.is_initialized() { "yes" } else { "no" },
            agent.current_point().0,
            agent.current_speed() * 3.6,
            agent.status().status_flags.bits(),
        );
    }

    Ok(())
}
