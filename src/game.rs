//! Per-frame scheduler
//!
//! `Game` owns one `Session` plus the host capabilities around it: a
//! renderer, a score sink and an input binder. Each `frame(now)` turns the
//! host timestamp into a clamped delta, runs one simulation step while
//! playing, and always renders afterwards.

use crate::error::Result;
use crate::highscores::{ScoreRecord, ScoreSink};
use crate::platform::input::{InputBinder, InputGuard, InputQueue, InputState, NoInput, new_queue};
use crate::platform::time::{FrameClock, now_ms, seed_from_clock};
use crate::renderer::{RenderFrame, Renderer};
use crate::settings::Settings;
use crate::sim::{GameStatus, ScoringResult, Session, SessionStats, Spawner, TickReport, Variant, tick};

/// Whether the game came up with a working renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loaded,
    /// Renderer failed to initialise; frames never simulate
    NotLoaded,
}

pub struct Game<R: Renderer, S: ScoreSink> {
    settings: Settings,
    session: Session,
    renderer: Option<R>,
    sink: S,
    binder: Box<dyn InputBinder>,
    queue: InputQueue,
    input: InputState,
    guard: Option<InputGuard>,
    clock: FrameClock,
    last_report: TickReport,
    last_result: Option<ScoringResult>,
}

impl<R: Renderer, S: ScoreSink> Game<R, S> {
    /// Build a game around a renderer that may have failed to initialise
    pub fn new(variant: Variant, settings: Settings, renderer: Result<R>, sink: S) -> Self {
        let settings = settings.sanitized();
        let seed = settings.seed.unwrap_or_else(seed_from_clock);
        let renderer = match renderer {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                log::error!("{} renderer failed to initialise: {}", variant.as_str(), e);
                None
            }
        };
        Self {
            session: Session::new(variant, &settings, seed),
            clock: FrameClock::new(settings.max_frame_dt()),
            settings,
            renderer,
            sink,
            binder: Box::new(NoInput),
            queue: new_queue(),
            input: InputState::default(),
            guard: None,
            last_report: TickReport::default(),
            last_result: None,
        }
    }

    /// Use a host input binder (listeners attach on `start`)
    pub fn with_input(mut self, binder: impl InputBinder + 'static) -> Self {
        self.binder = Box::new(binder);
        self
    }

    /// Replace the spawn plan (scripted replays)
    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.session = self.session.with_spawner(spawner);
        self
    }

    pub fn load_state(&self) -> LoadState {
        if self.renderer.is_some() {
            LoadState::Loaded
        } else {
            LoadState::NotLoaded
        }
    }

    /// `Waiting -> Playing`, attaching input listeners for the run
    pub fn start(&mut self) -> Result<()> {
        if self.session.status == GameStatus::Waiting && self.settings.seed.is_none() {
            self.session.reseed(seed_from_clock())?;
        }
        self.session.start()?;

        // On failure the session goes back to Waiting; nothing stays attached
        let guard = match self.binder.bind(self.queue.clone()) {
            Ok(guard) => guard,
            Err(e) => {
                self.session.reset();
                return Err(e);
            }
        };
        self.guard = Some(guard);
        self.input.clear();
        self.queue.borrow_mut().clear();
        self.clock.reset();
        self.last_result = None;
        Ok(())
    }

    /// Host callback with a timestamp in milliseconds
    pub fn frame(&mut self, now_ms: f64) {
        let dt = self.clock.delta(now_ms);
        self.update(dt);
    }

    /// Advance by `dt` seconds (clamped) and render
    pub fn update(&mut self, dt: f32) {
        if self.renderer.is_none() {
            return;
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.settings.max_frame_dt())
        } else {
            dt
        };

        if self.session.is_playing() {
            self.input.drain(&self.queue);
            let input = self.input.take_tick_input(&self.session.rules);
            match tick(&mut self.session, &input, dt) {
                Ok(report) => {
                    if report.ended {
                        self.finish();
                    }
                    self.last_report = report;
                }
                Err(e) => {
                    log::warn!("Skipped tick: {}", e);
                    self.session.quarantine_malformed();
                }
            }
        }

        if let Some(renderer) = self.renderer.as_mut() {
            if let Err(e) = renderer.render(&RenderFrame::from_session(&self.session)) {
                log::warn!("Render error: {}", e);
            }
        }
    }

    /// Hand the result to the sink and release listeners
    fn finish(&mut self) {
        self.guard = None;
        let Some(result) = self.session.result() else {
            return;
        };
        self.last_result = Some(result);
        let record = ScoreRecord::new(self.session.variant, &result, now_ms());
        if let Err(e) = self.sink.submit(&record) {
            log::warn!("Failed to persist score: {}", e);
        }
    }

    /// Any state -> `Waiting`
    pub fn reset(&mut self) {
        self.guard = None;
        self.session.reset();
        self.input.clear();
        self.queue.borrow_mut().clear();
        self.clock.reset();
        self.last_report = TickReport::default();
    }

    /// Raw score of the current run
    pub fn score(&self) -> u64 {
        self.session.score()
    }

    pub fn status(&self) -> GameStatus {
        self.session.status
    }

    pub fn health(&self) -> u8 {
        self.session.health()
    }

    pub fn variant(&self) -> Variant {
        self.session.variant
    }

    /// Result of the most recent finished run (survives `reset`)
    pub fn last_result(&self) -> Option<ScoringResult> {
        self.last_result
    }

    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    pub fn stats(&self) -> &SessionStats {
        &self.session.stats
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Queue that host listeners (or an autopilot) push events onto
    pub fn input_queue(&self) -> InputQueue {
        self.queue.clone()
    }

    pub fn listening(&self) -> bool {
        self.guard.is_some()
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Tear down the game, keeping the sink (e.g. to reuse a leaderboard)
    pub fn into_sink(self) -> S {
        self.sink
    }
}
