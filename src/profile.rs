//! Persistent player profile
//!
//! High score, coin balance, owned/equipped colors and the ad-removal flag
//! live in storage under separate keys. Armed power-ups ride along in memory
//! only and are consumed by the next run.
//!
//! Loading never fails: missing entries take defaults, malformed or
//! inconsistent entries are repaired and written back.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, StorageError, keys, store_best_effort};
use crate::store::{ArmedPowerUps, LlamaColor};

/// Individually persisted profile fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    HighScore,
    TotalCoins,
    PurchasedColors,
    EquippedColor,
    NoAds,
}

impl ProfileField {
    pub const ALL: [ProfileField; 5] = [
        ProfileField::HighScore,
        ProfileField::TotalCoins,
        ProfileField::PurchasedColors,
        ProfileField::EquippedColor,
        ProfileField::NoAds,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ProfileField::HighScore => keys::HIGH_SCORE,
            ProfileField::TotalCoins => keys::TOTAL_COINS,
            ProfileField::PurchasedColors => keys::PURCHASED_COLORS,
            ProfileField::EquippedColor => keys::EQUIPPED_COLOR,
            ProfileField::NoAds => keys::NO_ADS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub high_score: u64,
    pub total_coins: u64,
    /// Always contains `LlamaColor::Default`
    pub purchased_colors: BTreeSet<LlamaColor>,
    /// Always a member of `purchased_colors`
    pub equipped_color: LlamaColor,
    pub has_no_ads: bool,
    /// Bought for the next run, never persisted
    #[serde(skip)]
    pub armed: ArmedPowerUps,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            high_score: 0,
            total_coins: 0,
            purchased_colors: BTreeSet::from([LlamaColor::Default]),
            equipped_color: LlamaColor::Default,
            has_no_ads: false,
            armed: ArmedPowerUps::default(),
        }
    }
}

impl PlayerProfile {
    pub fn owns_color(&self, color: LlamaColor) -> bool {
        self.purchased_colors.contains(&color)
    }

    /// Load from storage, repairing and re-saving bad entries.
    ///
    /// A failing backend yields a fresh default profile.
    pub fn load<S: Storage + ?Sized>(storage: &mut S) -> Self {
        match Self::read(storage) {
            Ok((profile, repaired)) => {
                if !repaired.is_empty() {
                    log::info!("Repaired {} stored profile field(s)", repaired.len());
                    profile.save_fields(storage, &repaired);
                }
                log::info!(
                    "Loaded profile: high score {}, {} coins, {} color(s)",
                    profile.high_score,
                    profile.total_coins,
                    profile.purchased_colors.len()
                );
                profile
            }
            Err(e) => {
                log::error!("Error loading data from storage: {e}");
                Self::default()
            }
        }
    }

    /// Parse every field, collecting the ones that needed repair
    fn read<S: Storage + ?Sized>(storage: &S) -> Result<(Self, Vec<ProfileField>), StorageError> {
        let mut profile = Self::default();
        let mut repaired = Vec::new();

        if let Some(raw) = storage.get(keys::HIGH_SCORE)? {
            match parse_count(&raw) {
                Some(value) => profile.high_score = value,
                None => {
                    log::warn!("Ignoring malformed high score {raw:?}");
                    repaired.push(ProfileField::HighScore);
                }
            }
        }

        if let Some(raw) = storage.get(keys::TOTAL_COINS)? {
            match parse_count(&raw) {
                Some(value) => profile.total_coins = value,
                None => {
                    log::warn!("Ignoring malformed coin total {raw:?}");
                    repaired.push(ProfileField::TotalCoins);
                }
            }
        }

        if let Some(raw) = storage.get(keys::PURCHASED_COLORS)? {
            let (colors, healthy) = parse_colors(&raw);
            profile.purchased_colors = colors;
            if !healthy {
                repaired.push(ProfileField::PurchasedColors);
            }
        }

        if let Some(raw) = storage.get(keys::EQUIPPED_COLOR)? {
            match LlamaColor::from_id(&raw) {
                Some(color) if profile.owns_color(color) => profile.equipped_color = color,
                _ => {
                    log::warn!("Equipped color {raw:?} is not owned, reverting to default");
                    repaired.push(ProfileField::EquippedColor);
                }
            }
        }

        if let Some(raw) = storage.get(keys::NO_ADS)? {
            match serde_json::from_str::<bool>(&raw) {
                Ok(flag) => profile.has_no_ads = flag,
                Err(e) => {
                    log::warn!("Ignoring malformed ad-removal flag {raw:?}: {e}");
                    repaired.push(ProfileField::NoAds);
                }
            }
        }

        Ok((profile, repaired))
    }

    /// Stored representation of one field
    pub fn field_value(&self, field: ProfileField) -> String {
        match field {
            ProfileField::HighScore => self.high_score.to_string(),
            ProfileField::TotalCoins => self.total_coins.to_string(),
            ProfileField::PurchasedColors => {
                let ids: Vec<&str> = self.purchased_colors.iter().map(LlamaColor::id).collect();
                serde_json::json!(ids).to_string()
            }
            ProfileField::EquippedColor => self.equipped_color.id().to_string(),
            ProfileField::NoAds => serde_json::json!(self.has_no_ads).to_string(),
        }
    }

    /// Best-effort write of the given fields. Returns how many stuck.
    pub fn save_fields<S: Storage + ?Sized>(&self, storage: &mut S, fields: &[ProfileField]) -> usize {
        fields
            .iter()
            .filter(|field| store_best_effort(storage, field.key(), &self.field_value(**field)))
            .count()
    }

    /// Bank a finished run. Returns the fields that changed.
    pub fn record_run(&mut self, final_score: u64, coins: u32) -> Vec<ProfileField> {
        let mut changed = vec![ProfileField::TotalCoins];
        self.total_coins += u64::from(coins);
        if final_score > self.high_score {
            log::info!("New high score: {} (was {})", final_score, self.high_score);
            self.high_score = final_score;
            changed.push(ProfileField::HighScore);
        }
        changed
    }
}

/// Non-negative integer, tolerating a stored float by flooring it
fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<u64>() {
        return Some(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value.floor() as u64),
        _ => None,
    }
}

/// Owned color set from its JSON list. The flag is false if anything had to
/// be dropped or added.
fn parse_colors(raw: &str) -> (BTreeSet<LlamaColor>, bool) {
    let ids = match serde_json::from_str::<Vec<String>>(raw) {
        Ok(ids) => ids,
        Err(e) => {
            log::warn!("Purchased colors unreadable ({e}), resetting");
            return (BTreeSet::from([LlamaColor::Default]), false);
        }
    };

    let mut healthy = true;
    let mut colors = BTreeSet::new();
    for id in &ids {
        match LlamaColor::from_id(id) {
            Some(color) => {
                colors.insert(color);
            }
            None => {
                log::warn!("Dropping unknown color {id:?}");
                healthy = false;
            }
        }
    }
    if colors.insert(LlamaColor::Default) {
        healthy = false;
    }
    (colors, healthy)
}
