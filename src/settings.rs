//! Game settings and preferences
//!
//! Persisted separately from the player profile, as one JSON object.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, keys, store_best_effort};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Silence all cues
    pub muted: bool,

    // === Visual Effects ===
    /// Red flash when the extra life is spent
    pub screen_flash: bool,

    // === Accessibility ===
    /// Reduced motion (suppresses flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            screen_flash: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Volume actually applied to cues
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    /// Effective screen flash (respects reduced_motion)
    pub fn effective_screen_flash(&self) -> bool {
        self.screen_flash && !self.reduced_motion
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Self {
        match storage.get(keys::SETTINGS) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    settings
                }
                Err(e) => {
                    log::warn!("Stored settings unreadable ({e}), using defaults");
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::error!("Error loading settings: {e}");
                Self::default()
            }
        }
    }

    /// Save settings (best-effort)
    pub fn save<S: Storage + ?Sized>(&self, storage: &mut S) -> bool {
        match serde_json::to_string(self) {
            Ok(json) => {
                let saved = store_best_effort(storage, keys::SETTINGS, &json);
                if saved {
                    log::info!("Settings saved");
                }
                saved
            }
            Err(e) => {
                log::error!("Failed to serialize settings: {e}");
                false
            }
        }
    }
}
