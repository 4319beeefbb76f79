//! Kwmerio - an auto-running side-scroller
//!
//! Core modules:
//! - `sim`: Simulation core (physics, collisions, level streaming, game state)
//! - `platform`: Host frame clock
//! - `persistence`: Leaderboard storage backends
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::{Leaderboard, ScoreEntry};
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Fixed simulation constants (not tunable)
pub mod consts {
    /// Reference frame rate the physics constants are expressed in
    pub const REFERENCE_HZ: f32 = 60.0;
    /// Duration of one reference frame in milliseconds
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / REFERENCE_HZ;
    /// Game time between passive score points, in reference frames (1000 ms)
    pub const FRAMES_PER_SCORE_POINT: f64 = 60.0;
    /// Largest dt scale the host clock will hand to the simulation
    pub const MAX_DT_SCALE: f32 = 4.0;

    /// Highest difficulty phase
    pub const MAX_PHASE: u8 = 5;
    /// Score needed per phase step
    pub const SCORE_PER_PHASE: u64 = 1000;

    /// Single jump + one air jump
    pub const MAX_JUMPS: u8 = 2;

    /// Upper bound on chunks generated in one tick
    pub const MAX_CHUNKS_PER_TICK: u32 = 64;
}
