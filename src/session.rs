//! Screen state machine
//!
//! `Session` owns everything a running game needs: the player profile, the
//! current run, settings, the storage and audio backends and pointer state.
//! Hosts feed it frame deltas and input; it drives the fixed-step simulation
//! and persists profile changes as they happen.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::audio::{AudioSink, SoundCue};
use crate::consts::*;
use crate::persistence::Storage;
use crate::profile::{PlayerProfile, ProfileField};
use crate::settings::Settings;
use crate::sim::{GameEvent, Modifiers, RunState, decay_flash, tick};
use crate::snapshot::FrameSnapshot;
use crate::store::{self, LlamaColor, PurchaseError, Receipt, StoreItem};
use crate::ui::{ButtonId, PointerState};

/// Screen the store returns to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreOrigin {
    Menu,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    Store { origin: StoreOrigin },
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Menu => "menu",
            Screen::Playing => "playing",
            Screen::GameOver => "game_over",
            Screen::Store { .. } => "store",
        }
    }
}

/// Logical keys, independent of the physical key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKey {
    Jump,
    Duck,
    Confirm,
}

/// Result of the last finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub coins: u32,
    pub new_high_score: bool,
}

pub struct Session<S: Storage, A: AudioSink> {
    profile: PlayerProfile,
    settings: Settings,
    screen: Screen,
    run: RunState,
    storage: S,
    audio: A,
    pointer: PointerState,
    accumulator: f32,
    seeds: Pcg32,
    last_run: Option<RunSummary>,
}

impl<S: Storage, A: AudioSink> Session<S, A> {
    /// Load profile and settings from `storage` and show the menu
    pub fn new(mut storage: S, audio: A, seed: u64) -> Self {
        let profile = PlayerProfile::load(&mut storage);
        let settings = Settings::load(&storage);
        let mut seeds = Pcg32::seed_from_u64(seed);
        let run = RunState::new(seeds.random(), Modifiers::default());
        log::info!("Session ready (seed {seed})");

        Self {
            profile,
            settings,
            screen: Screen::Menu,
            run,
            storage,
            audio,
            pointer: PointerState::default(),
            accumulator: 0.0,
            seeds,
            last_run: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current run (or the last one while not playing)
    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn run_mut(&mut self) -> &mut RunState {
        &mut self.run
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn last_run(&self) -> Option<RunSummary> {
        self.last_run
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(self)
    }

    fn play(&mut self, cue: SoundCue) {
        self.audio.play(cue, self.settings.effective_volume());
    }

    /// Replace and persist settings
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save(&mut self.storage);
    }

    // === Transitions ===

    /// Start a fresh run from the menu or game over screen.
    ///
    /// Armed power-ups are handed to the new avatar and disarmed.
    pub fn start_run(&mut self) -> bool {
        if !matches!(self.screen, Screen::Menu | Screen::GameOver) {
            return false;
        }

        let armed = self.profile.armed.take();
        let modifiers = Modifiers {
            shield: armed.shield,
            extra_life: armed.extra_life,
            magnet: armed.magnet,
        };
        let seed = self.seeds.random();
        self.run = RunState::new(seed, modifiers);
        self.accumulator = 0.0;
        self.pointer.cancel();
        self.screen = Screen::Playing;
        log::info!("Run started (seed {seed}, modifiers {modifiers:?})");
        true
    }

    pub fn enter_store(&mut self) -> bool {
        let origin = match self.screen {
            Screen::Menu => StoreOrigin::Menu,
            Screen::GameOver => StoreOrigin::GameOver,
            _ => return false,
        };
        self.screen = Screen::Store { origin };
        self.pointer.cancel();
        log::info!("Entered store from {origin:?}");
        true
    }

    pub fn exit_store(&mut self) -> bool {
        let Screen::Store { origin } = self.screen else {
            return false;
        };
        self.screen = match origin {
            StoreOrigin::Menu => Screen::Menu,
            StoreOrigin::GameOver => Screen::GameOver,
        };
        self.pointer.cancel();
        log::info!("Left store for {}", self.screen.as_str());
        true
    }

    fn finish_run(&mut self, final_score: u64, coins: u32) {
        self.play(SoundCue::GameOver);
        let changed = self.profile.record_run(final_score, coins);
        self.profile.save_fields(&mut self.storage, &changed);
        self.last_run = Some(RunSummary {
            score: final_score,
            coins,
            new_high_score: changed.contains(&ProfileField::HighScore),
        });
        self.pointer.cancel();
        self.screen = Screen::GameOver;
        log::info!(
            "Game over: score {final_score}, {coins} coin(s), {} total",
            self.profile.total_coins
        );
    }

    // === Store ===

    /// Buy an item and persist what changed
    pub fn purchase(&mut self, item: StoreItem) -> Result<Receipt, PurchaseError> {
        self.require_store()?;
        let receipt = store::purchase(&mut self.profile, item)?;
        self.play(SoundCue::Purchase);
        self.profile.save_fields(&mut self.storage, &receipt.changed);
        Ok(receipt)
    }

    /// Equip if owned, otherwise buy (which equips)
    pub fn select_color(&mut self, color: LlamaColor) -> Result<Receipt, PurchaseError> {
        self.require_store()?;
        let receipt = store::select_color(&mut self.profile, color)?;
        if receipt.spent > 0 {
            self.play(SoundCue::Purchase);
        }
        self.profile.save_fields(&mut self.storage, &receipt.changed);
        Ok(receipt)
    }

    fn require_store(&self) -> Result<(), PurchaseError> {
        match self.screen {
            Screen::Store { .. } => Ok(()),
            _ => Err(PurchaseError::StoreClosed),
        }
    }

    /// Perform a button's action (after a completed click)
    pub fn activate(&mut self, button: ButtonId) {
        self.play(SoundCue::ButtonClick);
        let result = match button {
            ButtonId::Start | ButtonId::Restart => {
                self.start_run();
                Ok(())
            }
            ButtonId::MenuStore | ButtonId::GameOverStore => {
                self.enter_store();
                Ok(())
            }
            ButtonId::Back => {
                self.exit_store();
                Ok(())
            }
            ButtonId::Color(color) => self.select_color(color).map(|_| ()),
            ButtonId::PowerUp(power_up) => self.purchase(StoreItem::PowerUp(power_up)).map(|_| ()),
            ButtonId::NoAds => self.purchase(StoreItem::NoAds).map(|_| ()),
        };
        if let Err(e) = result {
            log::debug!("Store action refused: {e}");
        }
    }

    // === Input ===

    pub fn key_down(&mut self, key: GameKey) {
        match self.screen {
            Screen::Playing => match key {
                GameKey::Jump => {
                    if self.run.avatar.jump() {
                        self.play(SoundCue::Jump);
                    }
                }
                GameKey::Duck => {
                    self.run.avatar.duck();
                }
                GameKey::Confirm => {}
            },
            Screen::Menu | Screen::GameOver => {
                if matches!(key, GameKey::Jump | GameKey::Confirm) {
                    self.play(SoundCue::ButtonClick);
                    self.start_run();
                }
            }
            Screen::Store { .. } => {}
        }
    }

    pub fn key_up(&mut self, key: GameKey) {
        if self.screen == Screen::Playing && key == GameKey::Duck {
            self.run.avatar.stop_ducking();
        }
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        self.pointer.move_to(pos);
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        // Any gesture may unlock browser audio
        self.audio.resume();
        self.pointer.press(self.screen, &self.profile, pos);
    }

    pub fn pointer_up(&mut self, pos: Vec2) {
        if let Some(button) = self.pointer.release(pos) {
            self.activate(button);
        }
    }

    // === Frame driver ===

    /// Advance by one host frame of `frame_dt` seconds.
    ///
    /// Runs whole logical ticks only; the remainder carries to the next
    /// frame. Returns the simulation events of this frame.
    pub fn update(&mut self, frame_dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;

            if self.screen != Screen::Playing {
                // Flash keeps fading behind the menus
                decay_flash(&mut self.run, 1.0);
                continue;
            }

            let tick_events = tick(&mut self.run, SIM_DT);
            for event in &tick_events {
                self.handle_event(*event);
            }
            events.extend(tick_events);
        }

        if substeps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            log::debug!("Dropping {:.3}s of backlog", self.accumulator);
            self.accumulator = 0.0;
        }
        events
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::CoinCollected { .. } => self.play(SoundCue::Coin),
            GameEvent::ShieldAbsorbed { .. } | GameEvent::ExtraLifeAbsorbed { .. } => {
                self.play(SoundCue::PowerUp)
            }
            GameEvent::RunEnded { final_score, coins } => self.finish_run(final_score, coins),
            GameEvent::MagnetExpired | GameEvent::PhaseChanged(_) => {}
        }
    }
}
