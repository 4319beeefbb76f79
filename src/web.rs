//! Browser bindings
//!
//! The JS host owns the canvas, input listeners and the
//! `requestAnimationFrame` loop. It calls `WebGame::frame` once per animation
//! frame and draws from `snapshot()`.

use wasm_bindgen::prelude::*;

use crate::highscores::{Leaderboard, ScoreEntry};
use crate::persistence::{FallbackStore, LocalStore, MemoryStore, ScoreStore, record_score, remote};
use crate::platform::FrameClock;
use crate::settings::Settings;
use crate::sim::{TickInput, WorldState, tick};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Kwmerio wasm module loaded");
}

/// One game instance driven by the JS host
#[wasm_bindgen]
pub struct WebGame {
    state: WorldState,
    clock: FrameClock,
    input: TickInput,
    settings: Settings,
    /// LocalStorage, or process memory when storage is blocked
    store: FallbackStore<LocalStore, MemoryStore>,
    leaderboard: Leaderboard,
    /// Score of the current run already submitted
    submitted: bool,
}

#[wasm_bindgen]
impl WebGame {
    /// New game. A seed of 0 picks one from `Math.random`.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WebGame {
        let seed = if seed == 0 {
            (js_sys::Math::random() * u32::MAX as f64) as u64
        } else {
            seed
        };
        let store = FallbackStore::new(LocalStore::new(), MemoryStore::new());
        let leaderboard = store.load().unwrap_or_else(|e| {
            log::warn!("Could not load high scores: {e}");
            Leaderboard::new()
        });
        log::info!("Game initialized with seed: {}", seed);
        WebGame {
            state: WorldState::new(seed),
            clock: FrameClock::new(),
            input: TickInput::default(),
            settings: Settings::load(),
            store,
            leaderboard,
            submitted: false,
        }
    }

    /// Advance the simulation to the host timestamp (ms)
    pub fn frame(&mut self, now_ms: f64) {
        let dt = self.clock.advance(now_ms);
        let was_over = self.state.is_game_over();
        tick(&mut self.state, &self.input, dt);

        // One-shot inputs are consumed by the tick that saw them
        self.input = TickInput::default();

        if was_over && !self.state.is_game_over() {
            self.submitted = false;
        }
    }

    /// Jump (or restart after game over), queued for the next frame
    pub fn jump(&mut self) {
        if self.state.is_game_over() {
            self.input.restart = true;
        } else {
            self.input.jump = true;
        }
    }

    pub fn restart(&mut self) {
        self.input.restart = true;
    }

    /// Tab hidden: don't let the gap count as one huge frame
    pub fn pause_clock(&mut self) {
        self.clock.reset();
    }

    /// World state as JSON for the renderer
    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.state)?)
    }

    /// Events from the last frame as JSON (sound effects, screen shake)
    pub fn events(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.state.events)?)
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn phase(&self) -> u8 {
        self.state.phase()
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Rank this run's score would get, if it qualifies
    pub fn potential_rank(&self) -> Option<u32> {
        let score = self.state.final_score()?;
        self.leaderboard.potential_rank(score).map(|r| r as u32)
    }

    /// Record the finished run under `name`. Returns the rank achieved.
    ///
    /// Only the first call per run counts.
    pub fn save_score(&mut self, name: &str) -> Option<u32> {
        let score = self.state.final_score()?;
        if self.submitted {
            return None;
        }
        self.submitted = true;

        self.settings.remember_name(name);
        self.settings.save();

        let (board, rank) = record_score(&self.store, name, score);
        self.leaderboard = board;
        if rank.is_some() {
            if let Some(url) = self.settings.leaderboard_url.clone() {
                remote::post_in_background(url, ScoreEntry::new(name, score));
            }
        }
        rank.map(|r| r as u32)
    }

    /// Local leaderboard as JSON
    pub fn leaderboard(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.leaderboard)?)
    }

    /// Name to pre-fill on the game-over screen
    pub fn player_name(&self) -> String {
        self.settings.display_name()
    }

    /// Remote leaderboard URL (empty string clears it)
    pub fn set_leaderboard_url(&mut self, url: &str) {
        let url = url.trim();
        self.settings.leaderboard_url = (!url.is_empty()).then(|| url.to_string());
        self.settings.save();
    }

    pub fn settings(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.settings)?)
    }
}

/// Remote leaderboard as JSON, or the local one if the server is unreachable
#[wasm_bindgen]
pub async fn fetch_leaderboard(url: Option<String>) -> Result<String, JsError> {
    let board = remote::load_best_available(url.as_deref()).await;
    Ok(serde_json::to_string(&board)?)
}
