//! Buttons: layout, labels and pointer click semantics
//!
//! A click is a press over an enabled button followed by a release over the
//! same button. Releasing anywhere else cancels it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::profile::PlayerProfile;
use crate::session::Screen;
use crate::store::{LlamaColor, PowerUp, StoreItem};

/// Main menu / game over button size
const BUTTON_SIZE: Vec2 = Vec2::new(190.0, 55.0);
const STORE_PADDING: f32 = 40.0;
const STORE_GRID_TOP: f32 = 90.0;
const STORE_GAP: f32 = 15.0;
const POWER_UP_BUTTON_SIZE: Vec2 = Vec2::new(200.0, 50.0);
const COLOR_BUTTON_SIZE: Vec2 = Vec2::new(160.0, 45.0);
const GRID_COLUMNS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonId {
    Start,
    MenuStore,
    Restart,
    GameOverStore,
    Back,
    PowerUp(PowerUp),
    NoAds,
    Color(LlamaColor),
}

/// Top-left of cell `index` in a two-column grid
fn grid_cell(origin: Vec2, size: Vec2, index: usize) -> Vec2 {
    let col = (index % GRID_COLUMNS) as f32;
    let row = (index / GRID_COLUMNS) as f32;
    origin + Vec2::new(col * (size.x + STORE_GAP), row * (size.y + STORE_GAP))
}

fn grid_rows(count: usize) -> usize {
    count.div_ceil(GRID_COLUMNS)
}

impl ButtonId {
    pub fn rect(&self) -> Rect {
        let center_x = ARENA_WIDTH / 2.0;
        let center_y = ARENA_HEIGHT / 2.0;
        let game_over_y = ARENA_HEIGHT * 0.75;

        let (pos, size) = match self {
            ButtonId::Start => (
                Vec2::new(center_x - BUTTON_SIZE.x / 2.0, center_y - 50.0),
                BUTTON_SIZE,
            ),
            ButtonId::MenuStore => (
                Vec2::new(
                    center_x - BUTTON_SIZE.x / 2.0,
                    center_y - 50.0 + BUTTON_SIZE.y + STORE_GAP,
                ),
                BUTTON_SIZE,
            ),
            ButtonId::Restart => (
                Vec2::new(center_x - BUTTON_SIZE.x - 25.0, game_over_y),
                BUTTON_SIZE,
            ),
            ButtonId::GameOverStore => (Vec2::new(center_x + 25.0, game_over_y), BUTTON_SIZE),
            ButtonId::Back => (
                Vec2::new(STORE_PADDING, ARENA_HEIGHT - 50.0 - STORE_PADDING),
                Vec2::new(120.0, 40.0),
            ),
            ButtonId::PowerUp(power_up) => {
                let index = PowerUp::ALL
                    .iter()
                    .position(|p| p == power_up)
                    .unwrap_or_default();
                (
                    grid_cell(
                        Vec2::new(STORE_PADDING, STORE_GRID_TOP),
                        POWER_UP_BUTTON_SIZE,
                        index,
                    ),
                    POWER_UP_BUTTON_SIZE,
                )
            }
            ButtonId::NoAds => {
                let rows = grid_rows(PowerUp::ALL.len()) as f32;
                (
                    Vec2::new(
                        STORE_PADDING,
                        STORE_GRID_TOP + rows * (POWER_UP_BUTTON_SIZE.y + STORE_GAP),
                    ),
                    Vec2::new(POWER_UP_BUTTON_SIZE.x * 2.0 + STORE_GAP, POWER_UP_BUTTON_SIZE.y),
                )
            }
            ButtonId::Color(color) => {
                let index = LlamaColor::ALL
                    .iter()
                    .position(|c| c == color)
                    .unwrap_or_default();
                (
                    grid_cell(
                        Vec2::new(center_x + STORE_PADDING, STORE_GRID_TOP),
                        COLOR_BUTTON_SIZE,
                        index,
                    ),
                    COLOR_BUTTON_SIZE,
                )
            }
        };
        Rect::new(pos.x, pos.y, size.x, size.y)
    }

    /// Store item behind the button, if any
    pub fn store_item(&self) -> Option<StoreItem> {
        match self {
            ButtonId::PowerUp(power_up) => Some(StoreItem::PowerUp(*power_up)),
            ButtonId::NoAds => Some(StoreItem::NoAds),
            ButtonId::Color(color) => Some(StoreItem::Color(*color)),
            _ => None,
        }
    }

    /// Can the button be pressed right now
    pub fn is_enabled(&self, profile: &PlayerProfile) -> bool {
        match self {
            ButtonId::Color(color) => {
                profile.owns_color(*color) || profile.total_coins >= color.cost()
            }
            _ => match self.store_item() {
                Some(item) => item.can_purchase(profile),
                None => true,
            },
        }
    }

    /// Drawn with the "active" highlight (armed power-up, equipped color)
    pub fn is_highlighted(&self, profile: &PlayerProfile) -> bool {
        match self {
            ButtonId::PowerUp(power_up) => profile.armed.is_armed(*power_up),
            ButtonId::Color(color) => profile.equipped_color == *color,
            _ => false,
        }
    }

    pub fn label(&self, profile: &PlayerProfile) -> String {
        match self {
            ButtonId::Start => "Start Game".to_string(),
            ButtonId::MenuStore | ButtonId::GameOverStore => "Store".to_string(),
            ButtonId::Restart => "Restart".to_string(),
            ButtonId::Back => "Back".to_string(),
            ButtonId::PowerUp(power_up) => {
                if profile.armed.is_armed(*power_up) {
                    "ACTIVE (Next Run)".to_string()
                } else {
                    format!("{} - {}", power_up.name(), power_up.cost())
                }
            }
            ButtonId::NoAds => {
                if profile.has_no_ads {
                    "PURCHASED".to_string()
                } else {
                    format!("{} - {}", StoreItem::NoAds.name(), StoreItem::NoAds.cost())
                }
            }
            ButtonId::Color(color) => {
                if profile.equipped_color == *color {
                    "EQUIPPED".to_string()
                } else if profile.owns_color(*color) {
                    "Equip".to_string()
                } else {
                    color.cost().to_string()
                }
            }
        }
    }
}

/// Buttons shown on a screen, in hit-test order
pub fn buttons_for(screen: Screen) -> Vec<ButtonId> {
    match screen {
        Screen::Menu => vec![ButtonId::Start, ButtonId::MenuStore],
        Screen::Playing => Vec::new(),
        Screen::GameOver => vec![ButtonId::Restart, ButtonId::GameOverStore],
        Screen::Store { .. } => {
            let mut buttons = vec![ButtonId::Back];
            buttons.extend(PowerUp::ALL.into_iter().map(ButtonId::PowerUp));
            buttons.push(ButtonId::NoAds);
            buttons.extend(LlamaColor::ALL.into_iter().map(ButtonId::Color));
            buttons
        }
    }
}

/// First button on `screen` under `pos`
pub fn button_at(screen: Screen, pos: Vec2) -> Option<ButtonId> {
    buttons_for(screen)
        .into_iter()
        .find(|button| button.rect().contains(pos))
}

/// Pointer position and the button currently held down
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    pub pos: Vec2,
    pressed: Option<ButtonId>,
}

impl PointerState {
    pub fn pressed(&self) -> Option<ButtonId> {
        self.pressed
    }

    pub fn move_to(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    /// Arm the enabled button under `pos`, if any
    pub fn press(&mut self, screen: Screen, profile: &PlayerProfile, pos: Vec2) -> Option<ButtonId> {
        self.pos = pos;
        self.pressed = button_at(screen, pos).filter(|button| button.is_enabled(profile));
        self.pressed
    }

    /// Finish a press. Returns the armed button if released over it.
    pub fn release(&mut self, pos: Vec2) -> Option<ButtonId> {
        self.pos = pos;
        let armed = self.pressed.take()?;
        armed.rect().contains(pos).then_some(armed)
    }

    pub fn cancel(&mut self) {
        self.pressed = None;
    }

    pub fn hovered(&self, screen: Screen) -> Option<ButtonId> {
        button_at(screen, self.pos)
    }
}
