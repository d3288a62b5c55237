//! Run state and entity types
//!
//! Everything that exists for the duration of one run lives here. A fresh
//! `RunState` is built on every run start.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::avatar::{Avatar, Modifiers};
use super::collision::HitBox;
use super::cycle::BackgroundPhase;
use crate::Rect;
use crate::consts::*;

/// Cactus heights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CactusSize {
    Small,
    Large,
}

impl CactusSize {
    pub fn height(&self) -> f32 {
        match self {
            CactusSize::Small => CACTUS_HEIGHT_SMALL,
            CactusSize::Large => CACTUS_HEIGHT_LARGE,
        }
    }
}

/// Bird flight heights above the ground line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BirdAltitude {
    /// Skims just over a standing llama's head
    Low,
    /// Only reachable near the top of a jump
    High,
}

impl BirdAltitude {
    pub fn altitude(&self) -> f32 {
        match self {
            BirdAltitude::Low => BIRD_ALTITUDE_LOW,
            BirdAltitude::High => BIRD_ALTITUDE_HIGH,
        }
    }
}

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Cactus { size: CactusSize },
    Bird { altitude: BirdAltitude },
}

/// An obstacle entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    /// Build an obstacle of the given kind at the right edge of the arena
    pub fn new(id: u32, kind: ObstacleKind) -> Self {
        let (size, y) = match kind {
            ObstacleKind::Cactus { size } => {
                let h = size.height();
                (Vec2::new(CACTUS_WIDTH, h), GROUND_Y - h)
            }
            ObstacleKind::Bird { altitude } => (
                Vec2::new(BIRD_WIDTH, BIRD_HEIGHT),
                GROUND_Y - altitude.altitude() - BIRD_HEIGHT,
            ),
        };
        Self {
            id,
            kind,
            pos: Vec2::new(ARENA_WIDTH, y),
            size,
        }
    }

    /// Birds fly slightly faster than the ground scrolls
    pub fn speed_factor(&self) -> f32 {
        match self.kind {
            ObstacleKind::Cactus { .. } => 1.0,
            ObstacleKind::Bird { .. } => BIRD_SPEED_FACTOR,
        }
    }

    pub fn advance(&mut self, speed: f32, k: f32) {
        self.pos.x -= speed * self.speed_factor() * k;
    }

    pub fn is_offscreen(&self) -> bool {
        self.pos.x < -self.size.x
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn hitbox(&self) -> HitBox {
        self.rect().into()
    }

    /// Wing animation frame for birds
    pub fn wings_up(&self, time_ticks: u64) -> bool {
        matches!(self.kind, ObstacleKind::Bird { .. }) && time_ticks % 14 < 7
    }
}

/// A collectible coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
}

impl Coin {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            size: COIN_SIZE,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn advance(&mut self, speed: f32, k: f32) {
        self.pos.x -= speed * k;
    }

    pub fn is_offscreen(&self) -> bool {
        self.pos.x < -self.size
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn hitbox(&self) -> HitBox {
        self.rect().into()
    }
}

/// Background decoration (no collision)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decoration {
    Cloud { pos: Vec2, w: f32, h: f32 },
    Star { pos: Vec2, size: f32, twinkle: f32 },
}

impl Decoration {
    pub fn pos(&self) -> Vec2 {
        match self {
            Decoration::Cloud { pos, .. } | Decoration::Star { pos, .. } => *pos,
        }
    }

    /// Scroll speed as a fraction of game speed
    pub fn parallax(&self) -> f32 {
        match self {
            Decoration::Cloud { .. } => CLOUD_SPEED_FACTOR,
            Decoration::Star { .. } => STAR_SPEED_FACTOR,
        }
    }

    pub fn advance(&mut self, speed: f32, k: f32) {
        let dx = speed * self.parallax() * k;
        match self {
            Decoration::Cloud { pos, .. } | Decoration::Star { pos, .. } => pos.x -= dx,
        }
    }

    pub fn is_offscreen(&self) -> bool {
        match self {
            Decoration::Cloud { pos, w, .. } => pos.x < -w * 1.5,
            Decoration::Star { pos, size, .. } => pos.x < -size,
        }
    }
}

/// Complete state of one run (deterministic given seed and input timing)
#[derive(Debug, Clone)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Fractional score; displayed and recorded floored
    pub score: f64,
    /// Scroll speed in px per tick
    pub speed: f32,
    pub coins_collected: u32,
    pub avatar: Avatar,
    /// Active obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Active coins in spawn order
    pub coins: Vec<Coin>,
    /// Decorations of the current background phase
    pub decorations: Vec<Decoration>,
    pub phase: BackgroundPhase,
    pub next_obstacle_dist: f32,
    pub next_coin_dist: f32,
    pub next_decoration_dist: f32,
    /// Extra-life screen flash alpha (0-255)
    pub flash: f32,
    /// Set once an unabsorbed hit ends the run
    pub ended: bool,
    next_id: u32,
}

impl RunState {
    /// Create a new run with the given seed and carried-in modifiers
    pub fn new(seed: u64, modifiers: Modifiers) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            score: 0.0,
            speed: GAME_SPEED_START,
            coins_collected: 0,
            avatar: Avatar::new(modifiers),
            obstacles: Vec::new(),
            coins: Vec::new(),
            decorations: Vec::new(),
            phase: BackgroundPhase::Day,
            next_obstacle_dist: ARENA_WIDTH,
            next_coin_dist: ARENA_WIDTH * 0.8,
            next_decoration_dist: 0.0,
            flash: 0.0,
            ended: false,
            next_id: 1,
        };
        state.next_decoration_dist = state.uniform(ARENA_WIDTH * 0.5, ARENA_WIDTH);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Uniform sample between two bounds given in either order
    pub fn uniform(&mut self, a: f32, b: f32) -> f32 {
        super::spawn::uniform(&mut self.rng, a, b)
    }

    pub fn final_score(&self) -> u64 {
        self.score.floor() as u64
    }

    /// Ensure entities are sorted by ID (spawn order)
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
        self.coins.sort_by_key(|c| c.id);
    }
}
