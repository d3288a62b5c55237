//! Read-only per-frame draw state
//!
//! The renderer never touches the session directly. Each frame it receives a
//! `FrameSnapshot` (as JSON on the web) with everything needed to draw.

use serde::Serialize;

use crate::Rect;
use crate::audio::AudioSink;
use crate::consts::*;
use crate::persistence::Storage;
use crate::session::{RunSummary, Session};
use crate::sim::{AvatarPose, BackgroundPhase, Decoration, ObstacleKind};
use crate::ui::{self, ButtonId};

/// Frames per leg swap while running
const STRIDE_TICKS: u64 = 12;

#[derive(Debug, Clone, Serialize)]
pub struct AvatarView {
    /// Body rectangle (head/neck/legs are drawn relative to it)
    pub body: Rect,
    pub pose: AvatarPose,
    pub color: [u8; 3],
    /// Which leg pair is forward
    pub stride: bool,
    pub shield: bool,
    pub extra_life: bool,
    pub magnet: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    pub kind: ObstacleKind,
    pub rect: Rect,
    pub wings_up: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HudView {
    /// `Score: N` for the run in progress (or just ended)
    pub score: String,
    /// `Coins: N` collected this run
    pub run_coins: String,
    /// `HI: N`
    pub high_score: String,
    /// `Total: N` banked coins
    pub total_coins: String,
    /// `Coins: N` balance shown in the store
    pub store_balance: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ButtonView {
    pub id: ButtonId,
    pub rect: Rect,
    pub label: String,
    pub enabled: bool,
    pub pressed: bool,
    pub hovered: bool,
    pub highlighted: bool,
    /// Color buttons show a swatch
    pub swatch: Option<[u8; 3]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub screen: &'static str,
    pub arena: [f32; 2],
    pub ground_y: f32,
    pub phase: BackgroundPhase,
    pub avatar: AvatarView,
    pub obstacles: Vec<ObstacleView>,
    pub coins: Vec<Rect>,
    pub decorations: Vec<Decoration>,
    pub hud: HudView,
    pub buttons: Vec<ButtonView>,
    /// Red overlay alpha (0-255), zero when flashes are disabled
    pub flash_alpha: f32,
    pub ads_enabled: bool,
    pub last_run: Option<RunSummary>,
}

impl FrameSnapshot {
    pub fn capture<S: Storage, A: AudioSink>(session: &Session<S, A>) -> Self {
        let run = session.run();
        let profile = session.profile();
        let screen = session.screen();
        let avatar = &run.avatar;

        let pointer = session.pointer();
        let hovered = pointer.hovered(screen);
        let buttons = ui::buttons_for(screen)
            .into_iter()
            .map(|id| ButtonView {
                id,
                rect: id.rect(),
                label: id.label(profile),
                enabled: id.is_enabled(profile),
                pressed: pointer.pressed() == Some(id),
                hovered: hovered == Some(id),
                highlighted: id.is_highlighted(profile),
                swatch: match id {
                    ButtonId::Color(color) => Some(color.rgb()),
                    _ => None,
                },
            })
            .collect();

        let flash_alpha = if session.settings().effective_screen_flash() {
            run.flash
        } else {
            0.0
        };

        Self {
            screen: screen.as_str(),
            arena: [ARENA_WIDTH, ARENA_HEIGHT],
            ground_y: GROUND_Y,
            phase: run.phase,
            avatar: AvatarView {
                body: Rect::new(avatar.pos.x, avatar.pos.y, LLAMA_BODY_WIDTH, LLAMA_BODY_HEIGHT),
                pose: avatar.pose(),
                color: profile.equipped_color.rgb(),
                stride: avatar.pose() == AvatarPose::Grounded
                    && run.time_ticks % STRIDE_TICKS < STRIDE_TICKS / 2,
                shield: avatar.modifiers.shield,
                extra_life: avatar.modifiers.extra_life,
                magnet: avatar.modifiers.magnet,
            },
            obstacles: run
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    kind: o.kind,
                    rect: o.rect(),
                    wings_up: o.wings_up(run.time_ticks),
                })
                .collect(),
            coins: run.coins.iter().map(|c| c.rect()).collect(),
            decorations: run.decorations.clone(),
            hud: HudView {
                score: format!("Score: {}", run.final_score()),
                run_coins: format!("Coins: {}", run.coins_collected),
                high_score: format!("HI: {}", profile.high_score),
                total_coins: format!("Total: {}", profile.total_coins),
                store_balance: format!("Coins: {}", profile.total_coins),
            },
            buttons,
            flash_alpha,
            ads_enabled: !profile.has_no_ads,
            last_run: session.last_run(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
