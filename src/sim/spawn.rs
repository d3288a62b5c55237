//! Procedural placement of obstacles, coins and background decorations
//!
//! Each entity stream keeps its own "next spawn distance". A new entity
//! enters at the right edge once the most recently spawned one has scrolled
//! left past `ARENA_WIDTH - next_distance`, then the distance is re-drawn.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::avatar::Avatar;
use super::cycle::BackgroundPhase;
use super::state::{BirdAltitude, CactusSize, Coin, Decoration, Obstacle, ObstacleKind, RunState};
use crate::consts::*;

/// Uniform sample between two bounds given in either order
pub fn uniform(rng: &mut Pcg32, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi - lo <= f32::EPSILON {
        return lo;
    }
    rng.random_range(lo..hi)
}

/// How much faster than the start speed the run is going (never below 0.5)
pub fn speed_factor(speed: f32) -> f32 {
    (speed / GAME_SPEED_START).max(MIN_SPEED_FACTOR)
}

/// Scale a raw spacing draw by the current speed, with an absolute floor
pub fn obstacle_spacing(raw: f32, speed: f32) -> f32 {
    (raw / speed_factor(speed)).max(MIN_OBSTACLE_SPACING / 2.0)
}

pub fn next_obstacle_distance(rng: &mut Pcg32, speed: f32) -> f32 {
    let raw = uniform(rng, MIN_OBSTACLE_SPACING, MAX_OBSTACLE_SPACING);
    obstacle_spacing(raw, speed)
}

pub fn next_coin_distance(rng: &mut Pcg32) -> f32 {
    uniform(rng, MIN_COIN_SPACING, MAX_COIN_SPACING).max(MIN_COIN_SPACING * 0.8)
}

pub fn next_decoration_distance(rng: &mut Pcg32, phase: BackgroundPhase) -> f32 {
    match phase {
        BackgroundPhase::Day => uniform(rng, CLOUD_MIN_SPACING, CLOUD_MAX_SPACING),
        BackgroundPhase::Night => uniform(rng, STAR_MIN_SPACING, STAR_MAX_SPACING),
    }
}

/// Cactus 60% (small/large even split), bird 40% (low 60%, high 40%)
pub fn roll_obstacle_kind(rng: &mut Pcg32) -> ObstacleKind {
    if rng.random_bool(CACTUS_PROBABILITY) {
        let size = if rng.random_bool(SMALL_CACTUS_PROBABILITY) {
            CactusSize::Small
        } else {
            CactusSize::Large
        };
        ObstacleKind::Cactus { size }
    } else {
        let altitude = if rng.random_bool(LOW_BIRD_PROBABILITY) {
            BirdAltitude::Low
        } else {
            BirdAltitude::High
        };
        ObstacleKind::Bird { altitude }
    }
}

/// Vertical band a coin may be placed in: (reach line, clearance line).
///
/// The reach line sits just under the highest point a jump can touch; the
/// clearance line keeps the coin above the ground.
pub fn coin_height_band() -> (f32, f32) {
    let jump_reach = -JUMP_FORCE * COIN_JUMP_REACH_TICKS;
    let reach_y = GROUND_Y - jump_reach * 0.8 - COIN_SIZE;
    let clearance_y =
        GROUND_Y - COIN_GROUND_CLEARANCE - COIN_SIZE - Avatar::HEIGHT * 0.5;
    (reach_y, clearance_y.max(COIN_SIZE * 2.0))
}

/// Screen bounds a coin's top edge is clamped to
pub fn coin_y_bounds() -> (f32, f32) {
    (COIN_SIZE * 2.0, GROUND_Y - COIN_GROUND_CLEARANCE - COIN_SIZE)
}

pub fn roll_coin_y(rng: &mut Pcg32) -> f32 {
    let (reach_y, clearance_y) = coin_height_band();
    let (min_y, max_y) = coin_y_bounds();
    uniform(rng, clearance_y, reach_y).clamp(min_y, max_y)
}

fn is_due(last_x: Option<f32>, next_distance: f32) -> bool {
    match last_x {
        None => true,
        Some(x) => x < ARENA_WIDTH - next_distance,
    }
}

/// Spawn an obstacle if the stream is due. Returns the new obstacle's ID.
pub fn spawn_obstacle_if_due(state: &mut RunState) -> Option<u32> {
    let last_x = state.obstacles.last().map(|o| o.pos.x);
    if !is_due(last_x, state.next_obstacle_dist) {
        return None;
    }

    let kind = roll_obstacle_kind(state.rng_mut());
    let id = state.next_entity_id();
    state.obstacles.push(Obstacle::new(id, kind));

    let speed = state.speed;
    state.next_obstacle_dist = next_obstacle_distance(state.rng_mut(), speed);
    log::debug!(
        "Spawned {:?} (next in {:.0}px at speed {:.2})",
        kind,
        state.next_obstacle_dist,
        speed
    );
    Some(id)
}

/// Spawn a coin if the stream is due. Returns the new coin's ID.
pub fn spawn_coin_if_due(state: &mut RunState) -> Option<u32> {
    let last_x = state.coins.last().map(|c| c.pos.x);
    if !is_due(last_x, state.next_coin_dist) {
        return None;
    }

    let y = roll_coin_y(state.rng_mut());
    let id = state.next_entity_id();
    state.coins.push(Coin::new(id, Vec2::new(ARENA_WIDTH, y)));
    state.next_coin_dist = next_coin_distance(state.rng_mut());
    Some(id)
}

/// Spawn a decoration for the active background phase if due
pub fn spawn_decoration_if_due(state: &mut RunState) -> bool {
    let last_x = state.decorations.last().map(|d| d.pos().x);
    if !is_due(last_x, state.next_decoration_dist) {
        return false;
    }

    let decoration = match state.phase {
        BackgroundPhase::Day => {
            let y = state.uniform(40.0, ARENA_HEIGHT * 0.6);
            let w = state.uniform(50.0, 100.0);
            let h = state.uniform(20.0, 35.0);
            Decoration::Cloud {
                pos: Vec2::new(ARENA_WIDTH, y),
                w,
                h,
            }
        }
        BackgroundPhase::Night => {
            let y = state.uniform(20.0, ARENA_HEIGHT * 0.7);
            let size = state.uniform(1.5, 4.0);
            let twinkle = state.uniform(150.0, 255.0);
            Decoration::Star {
                pos: Vec2::new(ARENA_WIDTH, y),
                size,
                twinkle,
            }
        }
    };
    state.decorations.push(decoration);

    let phase = state.phase;
    state.next_decoration_dist = next_decoration_distance(state.rng_mut(), phase);
    true
}
