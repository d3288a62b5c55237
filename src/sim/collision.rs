//! Collision detection for the runner lane
//!
//! Everything collides as axis-aligned boxes. The avatar's box is computed
//! from its pose (see `Avatar::hitbox`), not from its drawn silhouette.

use serde::{Deserialize, Serialize};

use crate::Rect;

/// Axis-aligned box given by its four edges (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitBox {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl HitBox {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Strict overlap test: boxes that only share an edge do not collide
    #[inline]
    pub fn overlaps(&self, other: &HitBox) -> bool {
        self.right > other.left
            && self.left < other.right
            && self.bottom > other.top
            && self.top < other.bottom
    }
}

impl From<Rect> for HitBox {
    fn from(rect: Rect) -> Self {
        Self::new(rect.x, rect.right(), rect.y, rect.bottom())
    }
}

/// Indices of every box in `targets` overlapping `probe`, in slice order
pub fn overlapping_indices<'a, I>(probe: &HitBox, targets: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a HitBox>,
{
    targets
        .into_iter()
        .enumerate()
        .filter(|(_, target)| probe.overlaps(target))
        .map(|(i, _)| i)
        .collect()
}
