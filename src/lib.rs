//! Llama Runner - An endless-runner arcade game
//!
//! Core modules:
//! - `sim`: Deterministic run simulation (avatar physics, spawning, collisions, scoring)
//! - `store`: Coin economy (cosmetic colors, single-use power-ups, ad removal)
//! - `profile`: Persisted player profile with self-healing load
//! - `session`: Screen state machine owning profile, run and collaborators
//! - `persistence`: Key/value storage abstraction
//! - `platform`: Browser/native platform abstraction
//! - `ui`: Button layout and pointer click semantics
//! - `snapshot`: Read-only per-frame draw state for the renderer

pub mod audio;
pub mod persistence;
pub mod platform;
pub mod profile;
pub mod session;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod store;
pub mod ui;

pub use profile::PlayerProfile;
pub use session::{Screen, Session};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed logical tick (one update per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 1000.0;
    pub const ARENA_HEIGHT: f32 = 400.0;
    pub const GROUND_Y_OFFSET: f32 = 50.0;
    pub const GROUND_Y: f32 = ARENA_HEIGHT - GROUND_Y_OFFSET;

    /// Avatar physics (per logical tick)
    pub const GRAVITY: f32 = 0.6;
    pub const JUMP_FORCE: f32 = -11.0;
    pub const LLAMA_BODY_WIDTH: f32 = 16.0;
    pub const LLAMA_BODY_HEIGHT: f32 = 22.0;
    pub const LLAMA_X_POS: f32 = 70.0;
    /// Proportion of the body used for neck/head/leg parts
    pub const LLAMA_PART_SCALE: f32 = 0.75;

    /// Speed and score progression (per logical tick)
    pub const GAME_SPEED_START: f32 = 6.0;
    pub const GAME_SPEED_INCREMENT: f32 = 0.0015;
    pub const SCORE_INCREMENT: f64 = 0.2;

    /// Obstacles
    pub const MIN_OBSTACLE_SPACING: f32 = 350.0;
    pub const MAX_OBSTACLE_SPACING: f32 = 750.0;
    pub const MIN_SPEED_FACTOR: f32 = 0.5;
    pub const CACTUS_PROBABILITY: f64 = 0.6;
    pub const SMALL_CACTUS_PROBABILITY: f64 = 0.5;
    pub const LOW_BIRD_PROBABILITY: f64 = 0.6;
    pub const CACTUS_WIDTH: f32 = 18.0;
    pub const CACTUS_HEIGHT_SMALL: f32 = 35.0;
    pub const CACTUS_HEIGHT_LARGE: f32 = 45.0;
    pub const BIRD_WIDTH: f32 = 30.0;
    pub const BIRD_HEIGHT: f32 = 18.0;
    pub const BIRD_ALTITUDE_LOW: f32 = 55.0;
    pub const BIRD_ALTITUDE_HIGH: f32 = 95.0;
    pub const BIRD_SPEED_FACTOR: f32 = 1.1;

    /// Coins
    pub const COIN_SIZE: f32 = 15.0;
    pub const MIN_COIN_SPACING: f32 = 200.0;
    pub const MAX_COIN_SPACING: f32 = 500.0;
    pub const COIN_GROUND_CLEARANCE: f32 = 30.0;
    /// Ticks of upward travel used to estimate jump reach
    pub const COIN_JUMP_REACH_TICKS: f32 = 15.0;
    pub const COIN_MAGNET_RANGE: f32 = 80.0;
    pub const COIN_MAGNET_STRENGTH: f32 = 0.1;
    pub const COIN_MAGNET_DURATION_SCORE: f64 = 300.0;

    /// Background decorations
    pub const CLOUD_MIN_SPACING: f32 = 200.0;
    pub const CLOUD_MAX_SPACING: f32 = 500.0;
    pub const CLOUD_SPEED_FACTOR: f32 = 0.3;
    pub const STAR_MIN_SPACING: f32 = 80.0;
    pub const STAR_MAX_SPACING: f32 = 300.0;
    pub const STAR_SPEED_FACTOR: f32 = 0.1;
    /// Ticks between star twinkle re-rolls
    pub const STAR_TWINKLE_TICKS: u64 = 10;
    pub const SCORE_PER_CYCLE_PHASE: f64 = 700.0;

    /// Extra-life screen flash
    pub const FLASH_START_ALPHA: f32 = 200.0;
    pub const FLASH_DECAY_PER_TICK: f32 = 5.0;

    /// Store prices
    pub const STORE_ITEM_SHIELD_COST: u64 = 50;
    pub const STORE_ITEM_EXTRA_LIFE_COST: u64 = 100;
    pub const STORE_ITEM_MAGNET_COST: u64 = 75;
    pub const STORE_ITEM_COLOR_COST: u64 = 150;
    pub const STORE_ITEM_NO_ADS_COST: u64 = 500;
}

/// Axis-aligned rectangle in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict interior test (edges excluded)
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.x && point.x < self.right() && point.y > self.y && point.y < self.bottom()
    }
}
