//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Explicit timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, by entity ID)
//! - No rendering, audio or storage dependencies

pub mod avatar;
pub mod collision;
pub mod cycle;
pub mod spawn;
pub mod state;
pub mod tick;

pub use avatar::{Avatar, AvatarPose, Modifiers};
pub use collision::HitBox;
pub use cycle::{BackgroundPhase, phase_for_score};
pub use state::{
    BirdAltitude, CactusSize, Coin, Decoration, Obstacle, ObstacleKind, RunState,
};
pub use tick::{GameEvent, decay_flash, tick};
