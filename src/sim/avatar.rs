//! The llama avatar: jump/duck state machine, gravity and hit-box

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::HitBox;
use super::state::Coin;
use crate::consts::*;

/// Movement pose of the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvatarPose {
    /// Standing or running on the ground
    Grounded,
    /// In the air after a jump
    Airborne,
    /// Crouched on the ground with a lower profile
    Ducking,
}

/// One-shot gameplay modifiers carried into a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Absorbs the next obstacle hit
    pub shield: bool,
    /// Absorbs the next obstacle hit, with a screen flash
    pub extra_life: bool,
    /// Pulls nearby coins in until the score threshold is reached
    pub magnet: bool,
}

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    /// Top-left of the body (x never changes during a run)
    pub pos: Vec2,
    /// Vertical velocity in px per tick (negative is up)
    pub vy: f32,
    pub grounded: bool,
    pub ducking: bool,
    pub modifiers: Modifiers,
}

impl Default for Avatar {
    fn default() -> Self {
        Self::new(Modifiers::default())
    }
}

impl Avatar {
    pub const WIDTH: f32 = LLAMA_BODY_WIDTH;
    pub const HEIGHT: f32 = LLAMA_BODY_HEIGHT;

    /// Spawn standing on the ground
    pub fn new(modifiers: Modifiers) -> Self {
        Self {
            pos: Vec2::new(LLAMA_X_POS, Self::ground_top()),
            vy: 0.0,
            grounded: true,
            ducking: false,
            modifiers,
        }
    }

    /// Body top when standing on the ground
    #[inline]
    pub fn ground_top() -> f32 {
        GROUND_Y - Self::HEIGHT
    }

    pub fn pose(&self) -> AvatarPose {
        if !self.grounded {
            AvatarPose::Airborne
        } else if self.ducking {
            AvatarPose::Ducking
        } else {
            AvatarPose::Grounded
        }
    }

    /// Start a jump. Returns false (and changes nothing) unless standing.
    pub fn jump(&mut self) -> bool {
        if self.grounded && !self.ducking {
            self.vy = JUMP_FORCE;
            self.grounded = false;
            true
        } else {
            false
        }
    }

    /// Crouch. Ignored while airborne.
    pub fn duck(&mut self) -> bool {
        if self.grounded {
            self.ducking = true;
            true
        } else {
            false
        }
    }

    pub fn stop_ducking(&mut self) {
        self.ducking = false;
    }

    /// Integrate gravity over `k` logical ticks
    pub fn step(&mut self, k: f32) {
        self.pos.y += self.vy * k;
        self.vy += GRAVITY * k;

        let ground = Self::ground_top();
        if self.pos.y >= ground {
            self.pos.y = ground;
            self.vy = 0.0;
            self.grounded = true;
        }
        if !self.grounded {
            self.ducking = false;
        }
    }

    /// Collision box for the current pose.
    ///
    /// Standing, the box spans the body plus the neck width horizontally and
    /// runs from the top of the head down to the hooves. Ducking, the head is
    /// lowered to the body line and the legs fold in.
    pub fn hitbox(&self) -> HitBox {
        let w = Self::WIDTH;
        let h = Self::HEIGHT;
        let s = LLAMA_PART_SCALE;

        let neck_w = w * 0.5 * s;
        let neck_offset_y = -h * 1.3 * s;
        let head_offset_y = neck_offset_y - h * 0.6 * s;

        let left = self.pos.x;
        let right = self.pos.x + w + neck_w;

        let (top, bottom) = if self.ducking {
            let duck_offset = h * 0.5;
            (self.pos.y + duck_offset * 0.2, self.pos.y + h + 5.0)
        } else {
            (self.pos.y + head_offset_y, self.pos.y + h + h * 0.8 * s)
        };

        HitBox::new(left, right, top, bottom)
    }

    /// Point that the magnet pulls coins toward (around the neck)
    pub fn magnet_anchor(&self) -> Vec2 {
        Vec2::new(self.pos.x + Self::WIDTH / 2.0, self.pos.y - Self::HEIGHT / 2.0)
    }

    /// Pull a coin toward the magnet anchor if it is in range.
    /// Returns true if the coin moved.
    pub fn attract(&self, coin: &mut Coin, k: f32) -> bool {
        if !self.modifiers.magnet {
            return false;
        }
        let anchor = self.magnet_anchor();
        let center = coin.center();
        if anchor.distance(center) >= COIN_MAGNET_RANGE {
            return false;
        }
        let fraction = (COIN_MAGNET_STRENGTH * k).min(1.0);
        coin.pos += (anchor - center) * fraction;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_spawns_grounded() {
        let avatar = Avatar::default();
        assert_eq!(avatar.pose(), AvatarPose::Grounded);
        assert!(approx(avatar.pos.y, GROUND_Y - LLAMA_BODY_HEIGHT));
        assert!(approx(avatar.pos.x, LLAMA_X_POS));
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut avatar = Avatar::default();
        assert!(avatar.jump());
        assert_eq!(avatar.pose(), AvatarPose::Airborne);
        assert!(approx(avatar.vy, JUMP_FORCE));

        avatar.step(1.0);
        let vy = avatar.vy;
        let y = avatar.pos.y;
        // Second jump mid-air is ignored
        assert!(!avatar.jump());
        assert!(approx(avatar.vy, vy));
        assert!(approx(avatar.pos.y, y));
    }

    #[test]
    fn test_cannot_jump_while_ducking() {
        let mut avatar = Avatar::default();
        assert!(avatar.duck());
        assert_eq!(avatar.pose(), AvatarPose::Ducking);
        assert!(!avatar.jump());
        assert!(avatar.grounded);

        avatar.stop_ducking();
        assert!(avatar.jump());
    }

    #[test]
    fn test_duck_ignored_airborne() {
        let mut avatar = Avatar::default();
        avatar.jump();
        avatar.step(1.0);
        assert!(!avatar.duck());
        assert!(!avatar.ducking);
        assert_eq!(avatar.pose(), AvatarPose::Airborne);
    }

    #[test]
    fn test_jump_arc_lands() {
        let mut avatar = Avatar::default();
        avatar.jump();
        let mut peak = avatar.pos.y;
        let mut ticks = 0;
        while !avatar.grounded {
            avatar.step(1.0);
            peak = peak.min(avatar.pos.y);
            assert!(avatar.pos.y <= Avatar::ground_top());
            ticks += 1;
            assert!(ticks < 200, "avatar never landed");
        }
        assert!(approx(avatar.pos.y, Avatar::ground_top()));
        assert_eq!(avatar.vy, 0.0);
        // 11 px/tick against 0.6 px/tick² rises roughly 100 px
        let rise = Avatar::ground_top() - peak;
        assert!(rise > 90.0 && rise < 115.0, "rise was {rise}");
    }

    #[test]
    fn test_standing_hitbox_matches_body_layout() {
        let avatar = Avatar::default();
        let hb = avatar.hitbox();
        let y = avatar.pos.y;
        assert!(approx(hb.left, 70.0));
        assert!(approx(hb.right, 70.0 + 16.0 + 6.0));
        assert!(approx(hb.top, y - 31.35));
        assert!(approx(hb.bottom, y + 35.2));
    }

    #[test]
    fn test_ducking_hitbox_is_lower() {
        let mut avatar = Avatar::default();
        let standing = avatar.hitbox();
        avatar.duck();
        let ducking = avatar.hitbox();
        let y = avatar.pos.y;

        assert!(approx(ducking.top, y + 2.2));
        assert!(approx(ducking.bottom, y + 27.0));
        assert!(ducking.top > standing.top);
        assert!(ducking.height() < standing.height());
        assert!(approx(ducking.left, standing.left));
        assert!(approx(ducking.right, standing.right));
    }

    #[test]
    fn test_magnet_pulls_only_in_range() {
        let mut avatar = Avatar::new(Modifiers {
            magnet: true,
            ..Default::default()
        });
        avatar.pos.y = Avatar::ground_top();
        let anchor = avatar.magnet_anchor();

        let mut near = Coin::new(1, Vec2::new(anchor.x + 40.0, anchor.y));
        let before = near.center();
        assert!(avatar.attract(&mut near, 1.0));
        let after = near.center();
        assert!(after.distance(anchor) < before.distance(anchor));
        // Moves 10% of the remaining gap per tick
        let expected = before + (anchor - before) * COIN_MAGNET_STRENGTH;
        assert!(after.distance(expected) < 1e-3);

        let mut far = Coin::new(2, Vec2::new(anchor.x + 300.0, anchor.y));
        let far_before = far.pos;
        assert!(!avatar.attract(&mut far, 1.0));
        assert_eq!(far.pos, far_before);
    }

    #[test]
    fn test_attract_requires_magnet() {
        let avatar = Avatar::default();
        let anchor = avatar.magnet_anchor();
        let mut coin = Coin::new(1, anchor);
        let before = coin.pos;
        assert!(!avatar.attract(&mut coin, 1.0));
        assert_eq!(coin.pos, before);
    }
}
