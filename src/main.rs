//! Drive Away entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use drive_away::assets::{self, AssetCache, AssetManifest};
    use drive_away::consts::*;
    use drive_away::platform::{FrameThrottle, KeyState};
    use drive_away::renderer::{DrawList, RenderState, build_frame};
    use drive_away::sim::{GameEvent, GameState, Viewport, tick};
    use drive_away::{Error, Result, Settings};

    /// Executed frames between FPS log lines
    const FPS_LOG_INTERVAL: u64 = 150;

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        viewport: Viewport,
        settings: Settings,
        keys: KeyState,
        throttle: FrameThrottle,
        render_state: Option<RenderState>,
        draw_list: DrawList,
        assets: AssetCache,
    }

    impl Game {
        fn new(seed: u64, settings: Settings, width: f32, height: f32) -> Self {
            let viewport = Viewport::new(width, height, settings.tuning.lanes);
            Self {
                state: GameState::new(seed, settings.tuning.clone(), &viewport),
                viewport,
                keys: KeyState::new(settings.key_bindings.clone()),
                settings,
                throttle: FrameThrottle::new(TARGET_FPS),
                render_state: None,
                draw_list: DrawList::new(),
                assets: AssetCache::new(),
            }
        }

        /// One animation-frame callback
        fn frame(&mut self, time: f64) {
            if !self.throttle.should_run(time) {
                return;
            }
            self.update();
            self.render();
        }

        fn update(&mut self) {
            let input = self.keys.tick_input();
            tick(&mut self.state, &input, &self.viewport, FRAME_DT);

            let mut reset = false;
            for event in self.state.drain_events() {
                match event {
                    GameEvent::Collision { slot } => {
                        log::debug!("Collision with enemy slot {}", slot);
                        reset |= self.settings.reset_on_collision;
                    }
                    GameEvent::CollisionArmed | GameEvent::Reset => {}
                }
            }
            if reset {
                self.state.reset_game(&self.viewport);
            }

            if self.settings.show_fps && self.state.frame_count % FPS_LOG_INTERVAL == 0 {
                log::info!("FPS: {}", self.throttle.fps());
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            build_frame(&self.state, &self.viewport, &self.assets, &mut self.draw_list);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.draw_list) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.viewport.resize(width as f32, height as f32);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
            log::info!("Resized to {}x{}", width, height);
        }
    }

    /// Reset the running game to its initial entity and timer state
    #[wasm_bindgen]
    pub fn reset_game() {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                let mut g = game.borrow_mut();
                let viewport = g.viewport;
                g.state.reset_game(&viewport);
            }
        });
    }

    fn window_size(window: &web_sys::Window) -> (u32, u32) {
        let dim = |v: std::result::Result<JsValue, JsValue>| {
            v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0).max(1.0) as u32
        };
        (dim(window.inner_width()), dim(window.inner_height()))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Drive Away starting...");

        if let Err(e) = start().await {
            log::error!("Startup failed: {}", e);
        }
    }

    async fn start() -> Result<()> {
        let window = web_sys::window().ok_or_else(|| Error::Platform("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| Error::Platform("no document".into()))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| Error::Platform("no canvas".into()))?
            .dyn_into()
            .map_err(|_| Error::Platform("#canvas is not a canvas".into()))?;

        // Canvas fills the window
        let (width, height) = window_size(&window);
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load(&canvas);
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let game = Rc::new(RefCell::new(Game::new(
            seed,
            settings,
            width as f32,
            height as f32,
        )));
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| Error::Platform(format!("surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::Platform(format!("adapter: {}", e)))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(game.clone());
        setup_resize_handler(&canvas, game.clone());

        // Start gate: the loop only begins once every sprite is in
        let cache = assets::load_all(&AssetManifest::default()).await?;
        {
            let mut g = game.borrow_mut();
            if let Some(ref mut render_state) = g.render_state {
                render_state.upload_cache(&cache);
            }
            g.assets = cache;
            g.state.start();
        }

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        request_animation_frame(game);

        log::info!("Drive Away running!");
        Ok(())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if game.borrow_mut().keys.key_down(&event.key()) {
                    // Keep arrow keys from scrolling the page
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().keys.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur: key-ups won't arrive
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().keys.release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = window_size(&window);
            canvas.set_width(width);
            canvas.set_height(height);
            game.borrow_mut().resize(width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
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
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Drive Away (native) starting...");
    log::info!("Native mode runs a headless session - run with `trunk serve` for the web version");

    let settings = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => match drive_away::Settings::from_json(&json) {
                Ok(settings) => settings,
                Err(e) => {
                    log::error!("{}: {}", path, e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                log::error!("Failed to read {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => drive_away::Settings::default(),
    };

    headless::run(&settings, 900);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Browserless session: fake 60Hz callbacks, scripted key presses, full
/// update and scene build per executed frame
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use drive_away::Settings;
    use drive_away::assets::{AssetCache, SpriteImage, SpriteKey};
    use drive_away::consts::*;
    use drive_away::platform::{FrameThrottle, KeyState};
    use drive_away::renderer::{DrawList, build_frame};
    use drive_away::sim::{GameEvent, GameState, Viewport, tick};

    const WIDTH: f32 = 1280.0;
    const HEIGHT: f32 = 720.0;
    const CALLBACK_MS: f64 = 1000.0 / 60.0;
    /// Executed frames per scripted input step
    const SCRIPT_STEP: u64 = 45;

    #[derive(Debug, Default)]
    struct Stats {
        callbacks: u64,
        collisions: u64,
        resets: u64,
        sprites_drawn: u64,
        lane_changes: u64,
    }

    pub fn run(settings: &Settings, frames: u64) {
        let seed = settings.seed.unwrap_or(1);
        let viewport = Viewport::new(WIDTH, HEIGHT, settings.tuning.lanes);
        let mut state = GameState::new(seed, settings.tuning.clone(), &viewport);
        let mut keys = KeyState::new(settings.key_bindings.clone());
        let mut throttle = FrameThrottle::new(TARGET_FPS);
        let mut draw_list = DrawList::new();

        if !state.crowded_slots.is_empty() {
            log::info!("Spawn crowding at slots {:?}", state.crowded_slots);
        }

        let mut assets = AssetCache::new();
        for key in SpriteKey::ALL {
            assets.insert(key, SpriteImage::solid(1, 1, [255; 4]));
        }
        state.start();

        let left = settings.key_bindings.left.first().cloned().unwrap_or_default();
        let right = settings.key_bindings.right.first().cloned().unwrap_or_default();

        let mut stats = Stats::default();
        let mut last_lane = state.player.lane;

        while state.frame_count < frames {
            stats.callbacks += 1;
            if !throttle.should_run(stats.callbacks as f64 * CALLBACK_MS) {
                continue;
            }

            // Hold left, release, hold right, release
            match (state.frame_count / SCRIPT_STEP) % 4 {
                0 => {
                    keys.key_down(&left);
                }
                2 => {
                    keys.key_down(&right);
                }
                _ => keys.release_all(),
            }

            tick(&mut state, &keys.tick_input(), &viewport, FRAME_DT);

            let mut reset = false;
            for event in state.drain_events() {
                match event {
                    GameEvent::Collision { .. } => {
                        stats.collisions += 1;
                        reset |= settings.reset_on_collision;
                    }
                    GameEvent::Reset => stats.resets += 1,
                    GameEvent::CollisionArmed => {}
                }
            }
            if reset {
                state.reset_game(&viewport);
            }

            if state.player.lane != last_lane {
                stats.lane_changes += 1;
                last_lane = state.player.lane;
            }

            build_frame(&state, &viewport, &assets, &mut draw_list);
            stats.sprites_drawn += draw_list.sprites().count() as u64;
        }

        log::info!(
            "Ran {} frames from {} callbacks (seed {})",
            state.frame_count,
            stats.callbacks,
            seed
        );
        log::info!(
            "Collisions: {}, resets: {}, lane changes: {}, sprites drawn: {}",
            stats.collisions,
            stats.resets,
            stats.lane_changes,
            stats.sprites_drawn
        );
        log::info!("Measured FPS: {}", throttle.fps());
    }
}
