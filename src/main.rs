//! Llama Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop. The web
//! build hands a JSON frame snapshot to `window.llamaRunnerDraw` every
//! animation frame; the native build runs a headless autopilot session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use llama_runner::Session;
    use llama_runner::audio::WebAudio;
    use llama_runner::consts::*;
    use llama_runner::persistence::{MemoryStorage, Storage};
    use llama_runner::platform::{LocalStorage, client_to_arena, map_key};

    // Renderer hook supplied by the page
    #[wasm_bindgen(inline_js = "
        export function draw_frame(json) {
            const draw = window.llamaRunnerDraw;
            if (typeof draw === 'function') {
                draw(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn draw_frame(json: &str);
    }

    type WebSession = Session<Box<dyn Storage>, WebAudio>;

    /// Game instance holding all state
    struct Game {
        session: WebSession,
        canvas: HtmlCanvasElement,
        last_time: f64,
    }

    impl Game {
        fn to_arena(&self, client_x: i32, client_y: i32) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            client_to_arena(
                Vec2::new(client_x as f32, client_y as f32),
                (
                    rect.left() as f32,
                    rect.top() as f32,
                    rect.width() as f32,
                    rect.height() as f32,
                ),
            )
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;

            self.session.update(dt);
            match self.session.snapshot().to_json() {
                Ok(json) => draw_frame(&json),
                Err(e) => log::error!("Failed to serialize frame: {e}"),
            }
        }
    }

    fn open_storage() -> Box<dyn Storage> {
        match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::error!("{e}; progress will not be saved");
                Box::new(MemoryStorage::new())
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Llama Runner starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document - cannot start");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element - cannot start");
            return;
        };
        canvas.set_width(ARENA_WIDTH as u32);
        canvas.set_height(ARENA_HEIGHT as u32);

        let seed = js_sys::Date::now() as u64;
        let session = Session::new(open_storage(), WebAudio::new(), seed);
        let game = Rc::new(RefCell::new(Game {
            session,
            canvas: canvas.clone(),
            last_time: 0.0,
        }));

        setup_input_handlers(&canvas, game.clone());
        request_animation_frame(game);

        log::info!("Llama Runner running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = map_key(&event.key()) {
                    event.prevent_default();
                    if !event.repeat() {
                        game.borrow_mut().session.key_down(key);
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = map_key(&event.key()) {
                    game.borrow_mut().session.key_up(key);
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse
        for (name, kind) in [("mousemove", 0), ("mousedown", 1), ("mouseup", 2)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.to_arena(event.client_x(), event.client_y());
                match kind {
                    0 => g.session.pointer_move(pos),
                    1 => g.session.pointer_down(pos),
                    _ => g.session.pointer_up(pos),
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start/end act as press/release
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let pos = g.to_arena(touch.client_x(), touch.client_y());
                    g.session.pointer_down(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.changed_touches().get(0) {
                    let mut g = game.borrow_mut();
                    let pos = g.to_arena(touch.client_x(), touch.client_y());
                    g.session.pointer_up(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use llama_runner::audio::{CueRecorder, SoundCue};
    use llama_runner::consts::*;
    use llama_runner::persistence::MemoryStorage;
    use llama_runner::session::GameKey;
    use llama_runner::sim::ObstacleKind;
    use llama_runner::store::{PowerUp, StoreItem};
    use llama_runner::{Screen, Session};

    /// Give up on a run after this many frames (90 s)
    const MAX_FRAMES_PER_RUN: u32 = 60 * 90;

    type DemoSession = Session<MemoryStorage, CueRecorder>;

    /// Jump cacti, stay grounded under birds
    fn autopilot(session: &mut DemoSession) {
        let run = session.run();
        let front = run.avatar.pos.x + LLAMA_BODY_WIDTH;
        let lookahead = run.speed * 7.0;
        let threat = run
            .obstacles
            .iter()
            .find(|o| o.rect().right() > run.avatar.pos.x && o.pos.x - front < lookahead)
            .map(|o| o.kind);

        match threat {
            Some(ObstacleKind::Cactus { .. }) => session.key_down(GameKey::Jump),
            // Birds only clip an airborne llama, so don't jump into them
            Some(ObstacleKind::Bird { .. }) | None => {}
        }
    }

    pub fn run(seed: u64, runs: u32) {
        let mut session = Session::new(MemoryStorage::new(), CueRecorder::default(), seed);

        for n in 1..=runs {
            if session.profile().total_coins >= STORE_ITEM_SHIELD_COST {
                session.enter_store();
                if let Err(e) = session.purchase(StoreItem::PowerUp(PowerUp::Shield)) {
                    log::warn!("Could not buy a shield: {e}");
                }
                session.exit_store();
            }

            session.start_run();
            let mut frames = 0;
            while session.screen() == Screen::Playing && frames < MAX_FRAMES_PER_RUN {
                autopilot(&mut session);
                session.update(SIM_DT);
                frames += 1;
            }

            let run = session.run();
            println!(
                "Run {n}: score {}, coins {}, speed {:.2}, {}",
                run.final_score(),
                run.coins_collected,
                run.speed,
                if run.ended { "crashed" } else { "timed out" }
            );
        }

        let profile = session.profile();
        let audio = session.audio();
        println!(
            "High score {}, banked coins {}, cues: {} jump / {} coin / {} power-up",
            profile.high_score,
            profile.total_coins,
            audio.count(SoundCue::Jump),
            audio.count(SoundCue::Coin),
            audio.count(SoundCue::PowerUp),
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Llama Runner (native) starting...");
    log::info!("Rendering needs the web build - running a headless autopilot session");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let runs = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
    headless::run(seed, runs);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
