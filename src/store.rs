//! Coin store: catalog and purchase rules
//!
//! One rule covers every item: a purchase goes through iff the item is not
//! already owned/armed and the player can afford it. Successful purchases
//! report which profile fields changed so the caller can persist them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::profile::{PlayerProfile, ProfileField};

/// Cosmetic llama colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlamaColor {
    /// Beige, free and always owned
    Default,
    Red,
    Blue,
    Green,
    Purple,
}

impl LlamaColor {
    pub const ALL: [LlamaColor; 5] = [
        LlamaColor::Default,
        LlamaColor::Red,
        LlamaColor::Blue,
        LlamaColor::Green,
        LlamaColor::Purple,
    ];

    /// Persisted identifier
    pub fn id(&self) -> &'static str {
        match self {
            LlamaColor::Default => "default",
            LlamaColor::Red => "red",
            LlamaColor::Blue => "blue",
            LlamaColor::Green => "green",
            LlamaColor::Purple => "purple",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LlamaColor::Default => "Beige",
            LlamaColor::Red => "Red",
            LlamaColor::Blue => "Blue",
            LlamaColor::Green => "Green",
            LlamaColor::Purple => "Purple",
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            LlamaColor::Default => [222, 184, 135],
            LlamaColor::Red => [255, 80, 80],
            LlamaColor::Blue => [80, 120, 255],
            LlamaColor::Green => [80, 200, 80],
            LlamaColor::Purple => [180, 100, 255],
        }
    }

    pub fn cost(&self) -> u64 {
        match self {
            LlamaColor::Default => 0,
            _ => STORE_ITEM_COLOR_COST,
        }
    }
}

/// Single-use power-ups armed for the next run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUp {
    Shield,
    ExtraLife,
    Magnet,
}

impl PowerUp {
    pub const ALL: [PowerUp; 3] = [PowerUp::Shield, PowerUp::ExtraLife, PowerUp::Magnet];

    pub fn name(&self) -> &'static str {
        match self {
            PowerUp::Shield => "Shield",
            PowerUp::ExtraLife => "Extra Life",
            PowerUp::Magnet => "Coin Magnet",
        }
    }

    pub fn cost(&self) -> u64 {
        match self {
            PowerUp::Shield => STORE_ITEM_SHIELD_COST,
            PowerUp::ExtraLife => STORE_ITEM_EXTRA_LIFE_COST,
            PowerUp::Magnet => STORE_ITEM_MAGNET_COST,
        }
    }
}

/// Power-ups bought but not yet consumed by a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmedPowerUps {
    pub shield: bool,
    pub extra_life: bool,
    pub magnet: bool,
}

impl ArmedPowerUps {
    fn slot(&mut self, power_up: PowerUp) -> &mut bool {
        match power_up {
            PowerUp::Shield => &mut self.shield,
            PowerUp::ExtraLife => &mut self.extra_life,
            PowerUp::Magnet => &mut self.magnet,
        }
    }

    pub fn is_armed(&self, power_up: PowerUp) -> bool {
        match power_up {
            PowerUp::Shield => self.shield,
            PowerUp::ExtraLife => self.extra_life,
            PowerUp::Magnet => self.magnet,
        }
    }

    pub fn arm(&mut self, power_up: PowerUp) {
        *self.slot(power_up) = true;
    }

    /// Hand everything armed to the caller and disarm
    pub fn take(&mut self) -> ArmedPowerUps {
        std::mem::take(self)
    }
}

/// Anything that can be bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreItem {
    Color(LlamaColor),
    PowerUp(PowerUp),
    NoAds,
}

impl StoreItem {
    pub fn cost(&self) -> u64 {
        match self {
            StoreItem::Color(color) => color.cost(),
            StoreItem::PowerUp(power_up) => power_up.cost(),
            StoreItem::NoAds => STORE_ITEM_NO_ADS_COST,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StoreItem::Color(color) => color.name(),
            StoreItem::PowerUp(power_up) => power_up.name(),
            StoreItem::NoAds => "Remove Ads",
        }
    }

    /// Already owned (colors, ad removal) or armed (power-ups)
    pub fn is_held_by(&self, profile: &PlayerProfile) -> bool {
        match self {
            StoreItem::Color(color) => profile.owns_color(*color),
            StoreItem::PowerUp(power_up) => profile.armed.is_armed(*power_up),
            StoreItem::NoAds => profile.has_no_ads,
        }
    }

    pub fn can_purchase(&self, profile: &PlayerProfile) -> bool {
        !self.is_held_by(profile) && profile.total_coins >= self.cost()
    }
}

/// Reasons a store action is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("{} is already owned", .0.name())]
    AlreadyOwned(StoreItem),

    #[error("{} is already active for the next run", .0.name())]
    AlreadyArmed(PowerUp),

    #[error("Not enough coins: need {cost}, have {balance}")]
    InsufficientCoins { cost: u64, balance: u64 },

    #[error("{} is not owned", .0.name())]
    NotOwned(LlamaColor),

    #[error("The store is not open")]
    StoreClosed,
}

/// Outcome of a successful store action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub item: StoreItem,
    /// Coins deducted (zero for equips)
    pub spent: u64,
    /// Profile fields that must be persisted
    pub changed: Vec<ProfileField>,
}

/// Buy an item. On error the profile is untouched.
pub fn purchase(profile: &mut PlayerProfile, item: StoreItem) -> Result<Receipt, PurchaseError> {
    if item.is_held_by(profile) {
        return Err(match item {
            StoreItem::PowerUp(power_up) => PurchaseError::AlreadyArmed(power_up),
            other => PurchaseError::AlreadyOwned(other),
        });
    }

    let cost = item.cost();
    if profile.total_coins < cost {
        return Err(PurchaseError::InsufficientCoins {
            cost,
            balance: profile.total_coins,
        });
    }

    profile.total_coins -= cost;
    let changed = match item {
        StoreItem::Color(color) => {
            profile.purchased_colors.insert(color);
            profile.equipped_color = color;
            vec![
                ProfileField::TotalCoins,
                ProfileField::PurchasedColors,
                ProfileField::EquippedColor,
            ]
        }
        // Armed flags only live until the next run, so only the balance is saved
        StoreItem::PowerUp(power_up) => {
            profile.armed.arm(power_up);
            vec![ProfileField::TotalCoins]
        }
        StoreItem::NoAds => {
            profile.has_no_ads = true;
            vec![ProfileField::TotalCoins, ProfileField::NoAds]
        }
    };

    log::info!(
        "Purchased {} for {} coins ({} left)",
        item.name(),
        cost,
        profile.total_coins
    );

    Ok(Receipt {
        item,
        spent: cost,
        changed,
    })
}

/// Wear an owned color. Never costs coins.
pub fn equip(profile: &mut PlayerProfile, color: LlamaColor) -> Result<Receipt, PurchaseError> {
    if !profile.owns_color(color) {
        return Err(PurchaseError::NotOwned(color));
    }
    profile.equipped_color = color;
    log::info!("Equipped {} llama", color.name());
    Ok(Receipt {
        item: StoreItem::Color(color),
        spent: 0,
        changed: vec![ProfileField::EquippedColor],
    })
}

/// Color button behaviour: equip if owned, otherwise buy (which equips)
pub fn select_color(
    profile: &mut PlayerProfile,
    color: LlamaColor,
) -> Result<Receipt, PurchaseError> {
    if profile.owns_color(color) {
        equip(profile, color)
    } else {
        purchase(profile, StoreItem::Color(color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn profile_with_coins(coins: u64) -> PlayerProfile {
        PlayerProfile {
            total_coins: coins,
            ..Default::default()
        }
    }

    #[test]
    fn test_color_ids_round_trip() {
        for color in LlamaColor::ALL {
            assert_eq!(LlamaColor::from_id(color.id()), Some(color));
        }
        assert_eq!(LlamaColor::from_id("chartreuse"), None);
        assert_eq!(
            serde_json::to_string(&LlamaColor::Default).unwrap(),
            "\"default\""
        );
    }

    #[test]
    fn test_shield_rejected_when_short() {
        let mut profile = profile_with_coins(40);
        let before = profile.clone();
        let err = purchase(&mut profile, StoreItem::PowerUp(PowerUp::Shield)).unwrap_err();
        assert_eq!(
            err,
            PurchaseError::InsufficientCoins {
                cost: 50,
                balance: 40
            }
        );
        assert_eq!(profile, before);
        assert!(!profile.armed.shield);
    }

    #[test]
    fn test_extra_life_purchase_and_rearm_block() {
        let mut profile = profile_with_coins(100);
        let receipt = purchase(&mut profile, StoreItem::PowerUp(PowerUp::ExtraLife)).unwrap();
        assert_eq!(receipt.spent, 100);
        assert_eq!(receipt.changed, vec![ProfileField::TotalCoins]);
        assert_eq!(profile.total_coins, 0);
        assert!(profile.armed.extra_life);

        // Already armed: blocked even with coins
        profile.total_coins = 500;
        assert_eq!(
            purchase(&mut profile, StoreItem::PowerUp(PowerUp::ExtraLife)),
            Err(PurchaseError::AlreadyArmed(PowerUp::ExtraLife))
        );
        assert_eq!(profile.total_coins, 500);

        // Consumed by a run, then it can be bought again
        let armed = profile.armed.take();
        assert!(armed.extra_life);
        assert!(!profile.armed.extra_life);
        assert!(purchase(&mut profile, StoreItem::PowerUp(PowerUp::ExtraLife)).is_ok());
    }

    #[test]
    fn test_color_purchase_equips() {
        let mut profile = profile_with_coins(200);
        let receipt = select_color(&mut profile, LlamaColor::Red).unwrap();
        assert_eq!(receipt.spent, STORE_ITEM_COLOR_COST);
        assert!(receipt.changed.contains(&ProfileField::PurchasedColors));
        assert!(profile.owns_color(LlamaColor::Red));
        assert_eq!(profile.equipped_color, LlamaColor::Red);
        assert_eq!(profile.total_coins, 50);
    }

    #[test]
    fn test_equip_is_free() {
        let mut profile = profile_with_coins(200);
        purchase(&mut profile, StoreItem::Color(LlamaColor::Blue)).unwrap();
        let coins = profile.total_coins;

        let receipt = select_color(&mut profile, LlamaColor::Default).unwrap();
        assert_eq!(receipt.spent, 0);
        assert_eq!(profile.equipped_color, LlamaColor::Default);
        let receipt = select_color(&mut profile, LlamaColor::Blue).unwrap();
        assert_eq!(receipt.changed, vec![ProfileField::EquippedColor]);
        assert_eq!(profile.total_coins, coins);
    }

    #[test]
    fn test_equip_unowned_rejected() {
        let mut profile = profile_with_coins(1_000);
        assert_eq!(
            equip(&mut profile, LlamaColor::Purple),
            Err(PurchaseError::NotOwned(LlamaColor::Purple))
        );
        assert_eq!(profile.equipped_color, LlamaColor::Default);
    }

    #[test]
    fn test_owned_items_not_rebought() {
        let mut profile = profile_with_coins(1_000);
        assert_eq!(
            purchase(&mut profile, StoreItem::Color(LlamaColor::Default)),
            Err(PurchaseError::AlreadyOwned(StoreItem::Color(LlamaColor::Default)))
        );
        purchase(&mut profile, StoreItem::NoAds).unwrap();
        assert!(profile.has_no_ads);
        assert_eq!(profile.total_coins, 500);
        assert_eq!(
            purchase(&mut profile, StoreItem::NoAds),
            Err(PurchaseError::AlreadyOwned(StoreItem::NoAds))
        );
        assert_eq!(profile.total_coins, 500);
    }

    #[test]
    fn test_error_display() {
        let err = PurchaseError::InsufficientCoins {
            cost: 150,
            balance: 3,
        };
        assert_eq!(err.to_string(), "Not enough coins: need 150, have 3");
        assert_eq!(
            PurchaseError::AlreadyArmed(PowerUp::Magnet).to_string(),
            "Coin Magnet is already active for the next run"
        );
    }

    fn any_item() -> impl Strategy<Value = StoreItem> {
        prop_oneof![
            prop::sample::select(LlamaColor::ALL.to_vec()).prop_map(StoreItem::Color),
            prop::sample::select(PowerUp::ALL.to_vec()).prop_map(StoreItem::PowerUp),
            Just(StoreItem::NoAds),
        ]
    }

    proptest! {
        #[test]
        fn prop_unaffordable_purchase_changes_nothing(item in any_item(), coins in 0u64..1_000) {
            let mut profile = profile_with_coins(coins);
            let before = profile.clone();
            if coins < item.cost() || item.is_held_by(&profile) {
                prop_assert!(purchase(&mut profile, item).is_err());
                prop_assert_eq!(profile, before);
            } else {
                let receipt = purchase(&mut profile, item).unwrap();
                prop_assert_eq!(profile.total_coins, coins - receipt.spent);
                prop_assert!(item.is_held_by(&profile));
            }
        }

        #[test]
        fn prop_equip_never_spends(colors in prop::collection::vec(prop::sample::select(LlamaColor::ALL.to_vec()), 1..20)) {
            let mut profile = profile_with_coins(10_000);
            for color in LlamaColor::ALL {
                profile.purchased_colors.insert(color);
            }
            for color in colors {
                equip(&mut profile, color).unwrap();
                prop_assert_eq!(profile.total_coins, 10_000);
                prop_assert!(profile.owns_color(profile.equipped_color));
            }
        }
    }
}
