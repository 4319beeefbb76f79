//! Data-driven game balance
//!
//! Every number the simulation is tuned against. `Default` holds the shipped
//! values; a JSON file can override any subset of them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors from loading a tuning file
#[derive(Debug)]
pub enum TuningError {
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "tuning parse error: {e}"),
            TuningError::Invalid(what) => write!(f, "invalid tuning: {what}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(e) => Some(e),
            TuningError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

/// Game balance values. Velocities are in pixels per reference frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics ===
    pub gravity: f32,
    pub jump_force: f32,
    pub terminal_velocity: f32,
    pub stomp_bounce: f32,
    /// Autorun speed at phase 1
    pub base_speed: f32,

    // === Viewport / camera ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Player is held this far from the left edge (fraction of viewport)
    pub camera_anchor: f32,
    /// Extra distance past the right edge that must be generated
    pub render_lookahead: f32,
    /// Entities this far behind the camera are evicted
    pub eviction_margin: f32,
    /// Falling this far below the viewport is a pit death
    pub pit_margin: f32,
    /// Player this far behind the camera has been overtaken
    pub overtake_margin: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    pub player_start_x: f32,
    pub player_start_y: f32,

    // === Level ===
    pub ground_y: f32,
    pub ground_height: f32,
    pub first_chunk_x: f32,
    pub min_chunk_width: f32,
    pub max_chunk_width: f32,
    /// Chunk width floor that guarantees the frontier advances
    pub chunk_width_floor: f32,
    pub min_gap: f32,
    pub max_gap: f32,
    /// No pits are generated before this x
    pub safe_start_x: f32,
    pub landing_tolerance: f32,

    // === Decorations ===
    pub hazard_width: f32,
    pub hazard_height: f32,
    pub hazard_inset: f32,
    pub enemy_base_speed: f32,
    pub block_size: f32,
    pub block_chance: f32,
    pub extra_platform_chance: f32,
    pub extra_platform_width: f32,
    pub extra_platform_height: f32,
    pub item_size: f32,
    pub cloud_chance: f32,

    // === Cosmetic ===
    pub popup_frames: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.6,
            jump_force: -11.0,
            terminal_velocity: 15.0,
            stomp_bounce: -8.0,
            base_speed: 4.0,

            viewport_width: 800.0,
            viewport_height: 600.0,
            camera_anchor: 0.3,
            render_lookahead: 200.0,
            eviction_margin: 200.0,
            pit_margin: 100.0,
            overtake_margin: 50.0,

            player_width: 40.0,
            player_height: 45.0,
            player_start_x: 100.0,
            player_start_y: 300.0,

            ground_y: 550.0,
            ground_height: 90.0,
            first_chunk_x: 500.0,
            min_chunk_width: 300.0,
            max_chunk_width: 600.0,
            chunk_width_floor: 100.0,
            min_gap: 80.0,
            max_gap: 140.0,
            safe_start_x: 800.0,
            landing_tolerance: 5.0,

            hazard_width: 40.0,
            hazard_height: 20.0,
            hazard_inset: 5.0,
            enemy_base_speed: 1.5,
            block_size: 40.0,
            block_chance: 0.5,
            extra_platform_chance: 0.5,
            extra_platform_width: 100.0,
            extra_platform_height: 20.0,
            item_size: 30.0,
            cloud_chance: 0.5,

            popup_frames: 30.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning file and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let all = [
            self.gravity,
            self.jump_force,
            self.terminal_velocity,
            self.stomp_bounce,
            self.base_speed,
            self.viewport_width,
            self.viewport_height,
            self.camera_anchor,
            self.render_lookahead,
            self.eviction_margin,
            self.pit_margin,
            self.overtake_margin,
            self.player_width,
            self.player_height,
            self.player_start_x,
            self.player_start_y,
            self.ground_y,
            self.ground_height,
            self.first_chunk_x,
            self.min_chunk_width,
            self.max_chunk_width,
            self.chunk_width_floor,
            self.min_gap,
            self.max_gap,
            self.safe_start_x,
            self.landing_tolerance,
            self.hazard_width,
            self.hazard_height,
            self.hazard_inset,
            self.enemy_base_speed,
            self.block_size,
            self.block_chance,
            self.extra_platform_chance,
            self.extra_platform_width,
            self.extra_platform_height,
            self.item_size,
            self.cloud_chance,
            self.popup_frames,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(TuningError::Invalid("all values must be finite"));
        }
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return Err(TuningError::Invalid("viewport must have positive size"));
        }
        if self.player_width <= 0.0 || self.player_height <= 0.0 {
            return Err(TuningError::Invalid("player must have positive size"));
        }
        if self.chunk_width_floor <= 0.0 {
            return Err(TuningError::Invalid("chunk width floor must be positive"));
        }
        if self.min_chunk_width > self.max_chunk_width || self.min_gap > self.max_gap {
            return Err(TuningError::Invalid("range minimum exceeds maximum"));
        }
        if self.min_gap < 0.0 {
            return Err(TuningError::Invalid("gap cannot be negative"));
        }
        if self.terminal_velocity <= 0.0 || self.gravity < 0.0 {
            return Err(TuningError::Invalid("gravity and terminal velocity must point down"));
        }
        if self.hazard_inset * 2.0 >= self.hazard_width.min(self.hazard_height) {
            return Err(TuningError::Invalid("hazard inset swallows the hazard"));
        }
        Ok(())
    }
}
