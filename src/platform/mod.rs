//! Platform abstraction layer
//!
//! Turns host wall-clock timestamps into the simulation's frame scale.

use crate::consts::{MAX_DT_SCALE, REFERENCE_FRAME_MS};

/// Converts successive frame timestamps into `dt` scales
/// (1.0 == one 60 Hz reference frame).
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last_ms: None }
    }

    /// Record a frame timestamp and return the dt scale since the last one.
    ///
    /// The first frame, a clock that went backwards, or a non-finite stamp
    /// yield 0. Long stalls (tab switch) are capped at `MAX_DT_SCALE`.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        if !now_ms.is_finite() {
            return 0.0;
        }
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0.0;
        };
        let elapsed = now_ms - last;
        if elapsed <= 0.0 {
            return 0.0;
        }
        ((elapsed / REFERENCE_FRAME_MS as f64) as f32).min(MAX_DT_SCALE)
    }

    /// Forget the last timestamp (after a pause or restart)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
