//! Arcade Engine entry point
//!
//! Native: headless autopilot demo of every variant with text frames and a
//! JSON leaderboard. Web: DOM text host driven by requestAnimationFrame.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use arcade_engine::platform::input::{InputBinder, InputEvent, InputGuard, InputQueue, intent_for_key};
    use arcade_engine::renderer::{RenderFrame, Renderer, TextRenderer};
    use arcade_engine::sim::{GameStatus, Variant};
    use arcade_engine::{EngineError, Game, HighScores, LoadState, Result, Settings};

    /// Writes text frames into a `<pre>` element
    struct DomRenderer {
        element: web_sys::Element,
        text: TextRenderer,
    }

    impl DomRenderer {
        fn new(id: &str) -> Result<Self> {
            let element = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(id))
                .ok_or_else(|| EngineError::Renderer(format!("#{} not found", id)))?;
            Ok(Self {
                element,
                text: TextRenderer::new(31, 24),
            })
        }
    }

    impl Renderer for DomRenderer {
        fn render(&mut self, frame: &RenderFrame<'_>) -> Result<()> {
            self.text.render(frame)?;
            self.element.set_text_content(Some(self.text.last_frame()));
            Ok(())
        }
    }

    /// Window keyboard listeners, removed when the guard drops
    struct KeyboardBinder;

    impl InputBinder for KeyboardBinder {
        fn bind(&mut self, queue: InputQueue) -> Result<InputGuard> {
            let window = web_sys::window().ok_or_else(|| EngineError::Input("no window".into()))?;
            let mut guard = InputGuard::new();

            for (event, pressed) in [("keydown", true), ("keyup", false)] {
                let queue = queue.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |e: web_sys::KeyboardEvent| {
                    let Some(intent) = intent_for_key(&e.key()) else {
                        return;
                    };
                    e.prevent_default();
                    if pressed && e.repeat() {
                        return;
                    }
                    queue.borrow_mut().push_back(if pressed {
                        InputEvent::Pressed(intent)
                    } else {
                        InputEvent::Released(intent)
                    });
                });
                window
                    .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
                    .map_err(|_| EngineError::Input(format!("could not attach {}", event)))?;

                let target = window.clone();
                guard.on_release(move || {
                    let _ = target
                        .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
                });
            }
            Ok(guard)
        }
    }

    type WebGame = Game<DomRenderer, HighScores>;

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {}", e).into());
        }

        log::info!("Arcade Engine starting...");

        let variant = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("game"))
            .and_then(|el| el.get_attribute("data-variant"))
            .and_then(|name| name.parse::<Variant>().ok())
            .unwrap_or(Variant::LaneRunner);

        let game: WebGame = Game::new(variant, Settings::load(), DomRenderer::new("game"), HighScores::load())
            .with_input(KeyboardBinder);
        if game.load_state() == LoadState::NotLoaded {
            log::warn!("No #game element, running without a display");
        }

        let game = Rc::new(RefCell::new(game));
        if let Err(e) = game.borrow_mut().start() {
            log::error!("Failed to start: {}", e);
        }
        setup_restart_key(game.clone());
        request_animation_frame(game);

        log::info!("{} running!", variant.as_str());
    }

    /// `r` restarts once a run is over
    fn setup_restart_key(game: Rc<RefCell<WebGame>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |e: web_sys::KeyboardEvent| {
            if e.key() != "r" && e.key() != "R" {
                return;
            }
            let mut g = game.borrow_mut();
            if g.status() == GameStatus::Playing {
                return;
            }
            g.reset();
            match g.start() {
                Ok(()) => log::info!("Restarted {}", g.variant().as_str()),
                Err(e) => log::error!("Failed to restart: {}", e),
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        // Lives as long as the page
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<WebGame>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<WebGame>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::path::{Path, PathBuf};

    use glam::Vec2;

    use arcade_engine::platform::input::{InputEvent, InputQueue, Intent};
    use arcade_engine::renderer::TextRenderer;
    use arcade_engine::sim::{EntityClass, GameStatus, Session, Variant};
    use arcade_engine::{Game, HighScores, Result, Settings};

    const FRAME_MS: f64 = 16.0;
    /// Simulated seconds per variant before the demo gives up
    const MAX_RUN_SECS: f64 = 90.0;
    /// Print a text frame this often (simulated seconds)
    const PRINT_EVERY_SECS: f64 = 15.0;
    const SCORES_FILE: &str = "arcade-engine-scores.json";

    pub fn run(settings_path: Option<PathBuf>) -> Result<()> {
        let settings = match &settings_path {
            Some(path) => Settings::load_from(path)?,
            None => Settings::default(),
        };
        log::info!("Settings: {:?}", settings.sanitized());

        let mut scores = HighScores::load_from(SCORES_FILE)?;
        for variant in Variant::ALL {
            scores = run_variant(variant, &settings, scores)?;
        }

        println!("\nLeaderboard ({})", Path::new(SCORES_FILE).display());
        for variant in Variant::ALL {
            let best = scores.best_for(variant).map(|s| s.to_string());
            println!("  {:<12} {}", variant.as_str(), best.as_deref().unwrap_or("-"));
        }
        Ok(())
    }

    fn run_variant(variant: Variant, settings: &Settings, scores: HighScores) -> Result<HighScores> {
        let mut game = Game::new(variant, settings.clone(), Ok(TextRenderer::new(31, 18)), scores);
        game.start()?;
        let queue = game.input_queue();

        println!("\n=== {} ===", variant.as_str());
        let mut now = 0.0;
        let mut next_print = 0.0;
        while game.status() == GameStatus::Playing && now < MAX_RUN_SECS * 1000.0 {
            autopilot(game.session(), &queue);
            game.frame(now);
            if now >= next_print {
                if let Some(renderer) = game.renderer() {
                    print!("{}", renderer.last_frame());
                }
                next_print += PRINT_EVERY_SECS * 1000.0;
            }
            now += FRAME_MS;
        }

        let stats = *game.stats();
        match game.last_result() {
            Some(result) => println!(
                "{} over after {:.1}s: raw {} x{:.3} = {}",
                variant.as_str(),
                game.session().elapsed,
                result.raw_score,
                result.multiplier,
                result.final_score
            ),
            None => println!(
                "{} still alive after {:.0}s with {} points",
                variant.as_str(),
                MAX_RUN_SECS,
                game.score()
            ),
        }
        println!("  {:?}", stats);
        Ok(game.into_sink())
    }

    /// Simple reactive policy per movement style
    fn autopilot(session: &Session, queue: &InputQueue) {
        let mut q = queue.borrow_mut();
        match session.variant {
            Variant::Runner | Variant::LaneRunner => {
                let (Some(lane), Some(lanes)) = (session.player.lane, session.rules.lanes()) else {
                    return;
                };
                let threat = |l: u8| {
                    session.entities.iter().any(|e| {
                        e.class() == EntityClass::Obstacle
                            && e.lane == Some(l)
                            && e.pos.z > session.player.pos.z
                            && e.pos.z < session.player.pos.z + 6.0
                    })
                };
                if !threat(lane) {
                    return;
                }
                let left = lane.checked_sub(1);
                let right = (lane + 1 < lanes).then_some(lane + 1);
                match [left, right].into_iter().flatten().find(|l| !threat(*l)) {
                    Some(target) => {
                        let intent = if target < lane {
                            Intent::MoveLeft
                        } else {
                            Intent::MoveRight
                        };
                        q.push_back(InputEvent::Pressed(intent));
                        q.push_back(InputEvent::Released(intent));
                    }
                    None => q.push_back(InputEvent::Pressed(Intent::Jump)),
                }
            }
            Variant::Shooter => {
                let target = session
                    .entities
                    .iter()
                    .filter(|e| e.class() == EntityClass::Obstacle)
                    .min_by(|a, b| a.pos.z.total_cmp(&b.pos.z));
                if let Some(enemy) = target {
                    q.push_back(InputEvent::PointerAt(Vec2::new(enemy.pos.x, session.player.pos.z)));
                }
                q.push_back(InputEvent::Pressed(Intent::Fire));
            }
            Variant::Collector => {
                let here = Vec2::new(session.player.pos.x, session.player.pos.z);
                let target = session
                    .entities
                    .iter()
                    .filter(|e| e.class() == EntityClass::Collectible)
                    .map(|e| Vec2::new(e.pos.x, e.pos.z))
                    .min_by(|a, b| a.distance_squared(here).total_cmp(&b.distance_squared(here)));
                if let Some(target) = target {
                    q.push_back(InputEvent::PointerAt(target));
                }
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arcade Engine (native) starting...");

    let settings_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    if let Err(e) = demo::run(settings_path) {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
