//! The Thirsty Crow entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent};

    use thirsty_crow::audio::AudioManager;
    use thirsty_crow::consts::*;
    use thirsty_crow::input::{InputState, Intent};
    use thirsty_crow::sim::{GamePhase, GameState, steer, tick};
    use thirsty_crow::timer::Stopwatch;
    use thirsty_crow::{Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        input: InputState,
        stopwatch: Stopwatch,
        audio: AudioManager,
        settings: Settings,
        accumulator: f32,
        last_time: f64,
        /// Autopilot flies the crow
        idle_mode: bool,
        /// Audio was muted by losing focus, not by the player
        muted_by_blur: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, settings: Settings, tuning: Tuning) -> Self {
            Self {
                state: GameState::with_tuning(seed, tuning),
                input: InputState::new(),
                stopwatch: Stopwatch::new(),
                audio: AudioManager::new(&settings),
                settings,
                accumulator: 0.0,
                last_time: 0.0,
                idle_mode: false,
                muted_by_blur: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let now = js_sys::Date::now();
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = if self.idle_mode {
                    self.advance_demo(now);
                    let mut input = steer(&self.state);
                    input.restart = self.input.to_tick_input().restart;
                    input
                } else {
                    self.input.to_tick_input()
                };
                tick(&mut self.state, &input, SIM_DT, now);
                self.input.end_tick();
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            for event in self.state.drain_events() {
                log::debug!("{:?}", event);
                self.audio.handle_event(&event);
            }
            self.stopwatch.update(&self.state, now);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Idle mode skips the title and tutorial screens
        fn advance_demo(&mut self, now: f64) {
            match self.state.phase() {
                GamePhase::Intro => self.state.start_game(now),
                GamePhase::Tutorial => self.state.complete_tutorial(),
                GamePhase::Playing | GamePhase::Success => {}
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let phase = self.state.phase();

            show(document, "intro-screen", phase == GamePhase::Intro);
            show(document, "tutorial-screen", phase == GamePhase::Tutorial);
            show(document, "success-screen", phase == GamePhase::Success);
            show(document, "hud", phase.allows_flight());

            // Water level
            let percent = (self.state.water_level() * 100.0).round();
            set_text(document, "water-level", &format!("{}%", percent));
            if let Some(el) = document.get_element_by_id("water-fill") {
                let _ = el.set_attribute("style", &format!("height: {}%", percent));
            }

            set_text(document, "timer", &self.stopwatch.formatted());

            // Held stone
            match self.state.held_stone() {
                Some(stone) => {
                    show(document, "held-stone", true);
                    set_text(
                        document,
                        "held-stone-value",
                        &stone.size.value().to_string(),
                    );
                    if let Some(el) = document.get_element_by_id("held-stone") {
                        let _ = el.set_attribute("data-size", stone.size.as_str());
                    }
                }
                None => show(document, "held-stone", false),
            }

            // Narration
            let story = self
                .state
                .story_text()
                .filter(|_| self.settings.narration);
            show(document, "story", story.is_some());
            if let Some(text) = story {
                set_text(document, "story-text", text);
            }

            if phase == GamePhase::Success {
                set_text(document, "final-score", &self.state.score().to_string());
                set_text(document, "final-time", &self.stopwatch.formatted());
            }

            show(document, "fps", self.settings.show_fps);
            if self.settings.show_fps {
                set_text(document, "fps", &format!("{} FPS", self.fps));
            }
            show(document, "idle-badge", self.idle_mode);
        }
    }

    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    /// Resolve after `ms` milliseconds
    async fn sleep_ms(ms: i32) {
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            if let Some(window) = web_sys::window() {
                if let Err(e) =
                    window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                {
                    log::warn!("setTimeout failed: {:?}", e);
                }
            }
        });
        if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
            log::warn!("Loading delay interrupted: {:?}", e);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("The Thirsty Crow starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let tuning = Tuning::load();

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, settings, tuning)));
        log::info!("Game initialized with seed: {}", seed);

        // Loading screen
        sleep_ms(LOADING_DELAY_MS).await;
        show(&document, "loading", false);

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_focus_handlers(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("The Thirsty Crow running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.audio.on_user_gesture();

                if event.code() == "KeyI" {
                    g.idle_mode = !g.idle_mode;
                    g.input.release_all();
                    log::info!("Idle mode: {}", g.idle_mode);
                    return;
                }
                if let Some(intent) = Intent::from_key_code(&event.code()) {
                    // Keep Space/arrows from scrolling the page
                    event.prevent_default();
                    g.input.press(intent);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(intent) = Intent::from_key_code(&event.code()) {
                    game.borrow_mut().input.release(intent);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Any click counts as a gesture for audio
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().audio.on_user_gesture();
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }

    fn on_click(document: &Document, id: &str, handler: impl FnMut(web_sys::MouseEvent) + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(handler);
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("#{} not found", id);
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        {
            let game = game.clone();
            on_click(&document, "start-btn", move |_| {
                game.borrow_mut().state.start_game(js_sys::Date::now());
            });
        }
        {
            let game = game.clone();
            on_click(&document, "tutorial-done-btn", move |_| {
                game.borrow_mut().state.complete_tutorial();
            });
        }
        {
            let game = game.clone();
            on_click(&document, "story-close-btn", move |_| {
                let mut g = game.borrow_mut();
                if let Some(id) = g.state.current_story() {
                    g.state.mark_story_as_shown(id);
                }
                g.state.set_current_story(None);
            });
        }
        {
            let game = game.clone();
            on_click(&document, "mute-btn", move |_| {
                let mut g = game.borrow_mut();
                let muted = !g.audio.is_muted();
                g.audio.set_muted(muted);
                g.muted_by_blur = false;
            });
        }
        on_click(&document, "restart-btn", move |_| {
            let mut g = game.borrow_mut();
            if g.state.phase() == GamePhase::Success {
                g.state.reset_game();
                g.accumulator = 0.0;
                g.input.release_all();
            }
        });
    }

    fn setup_focus_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().input.release_all();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.input.release_all();
                if g.settings.mute_on_blur && !g.audio.is_muted() {
                    g.audio.set_muted(true);
                    g.muted_by_blur = true;
                    log::info!("Audio muted (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window focus
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.muted_by_blur {
                    g.audio.set_muted(false);
                    g.muted_by_blur = false;
                }
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use thirsty_crow::consts::SIM_DT;
    use thirsty_crow::sim::{GamePhase, GameState, steer, tick};
    use thirsty_crow::timer::{elapsed_ms, format_time};
    use thirsty_crow::Tuning;

    env_logger::init();
    log::info!("The Thirsty Crow (native) starting...");
    log::info!("Native mode runs a headless autopilot game - build for wasm32 to play in the browser");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or_else(rand::random);

    let mut state = GameState::with_tuning(seed, Tuning::load());
    let mut now = 0.0;
    state.start_game(now);
    state.complete_tutorial();

    // Ten simulated minutes
    let max_ticks = 60 * 600;
    let mut ticks = 0;
    while state.phase() == GamePhase::Playing && ticks < max_ticks {
        let input = steer(&state);
        now += SIM_DT as f64 * 1000.0;
        tick(&mut state, &input, SIM_DT, now);
        for event in state.drain_events() {
            log::debug!("{:?}", event);
        }
        ticks += 1;
    }

    if state.phase() == GamePhase::Success {
        let elapsed = elapsed_ms(&state, now);
        println!(
            "Seed {}: pitcher full in {} with {} stones, score {}",
            seed,
            format_time(elapsed),
            state.stones_dropped(),
            state.score()
        );
    } else {
        println!(
            "Seed {}: gave up after {}, water at {:.0}%",
            seed,
            format_time(now),
            state.water_level() * 100.0
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
