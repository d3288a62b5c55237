//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key names, canvas coordinates)
//! - Storage (LocalStorage on web)

use glam::Vec2;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::session::GameKey;

/// Map a DOM `KeyboardEvent.key` value to a game key
pub fn map_key(key: &str) -> Option<GameKey> {
    match key {
        " " | "Spacebar" | "ArrowUp" | "Up" => Some(GameKey::Jump),
        "ArrowDown" | "Down" => Some(GameKey::Duck),
        "Enter" => Some(GameKey::Confirm),
        _ => None,
    }
}

/// Convert a client-space pointer position into arena coordinates, given the
/// canvas bounding box (left, top, width, height) in client pixels
pub fn client_to_arena(client: Vec2, canvas: (f32, f32, f32, f32)) -> Vec2 {
    let (left, top, width, height) = canvas;
    if width <= 0.0 || height <= 0.0 {
        return client - Vec2::new(left, top);
    }
    Vec2::new(
        (client.x - left) * ARENA_WIDTH / width,
        (client.y - top) * ARENA_HEIGHT / height,
    )
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::persistence::{Storage, StorageError};

    /// Browser LocalStorage backend
    pub struct LocalStorage {
        inner: web_sys::Storage,
    }

    impl LocalStorage {
        pub fn open() -> Result<Self, StorageError> {
            let window = web_sys::window()
                .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
            let inner = window
                .local_storage()
                .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
                .ok_or_else(|| StorageError::Unavailable("LocalStorage disabled".to_string()))?;
            Ok(Self { inner })
        }
    }

    impl Storage for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key).map_err(|e| StorageError::Read {
                key: key.to_string(),
                details: format!("{e:?}"),
            })
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set_item(key, value).map_err(|e| StorageError::Write {
                key: key.to_string(),
                details: format!("{e:?}"),
            })
        }
    }
}
