//! Score-driven difficulty phases

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_PHASE, SCORE_PER_PHASE};

/// Generation and speed parameters for one phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// 1..=5
    pub phase: u8,
    /// Autorun speed (pixels per reference frame)
    pub speed: f32,
    /// Hazard probability per chunk
    pub obstacle_freq: f32,
    /// Pit probability per chunk
    pub pit_freq: f32,
}

impl Difficulty {
    /// Phase 1 parameters
    pub fn initial(base_speed: f32) -> Self {
        Self::for_phase(1, base_speed)
    }

    pub fn for_phase(phase: u8, base_speed: f32) -> Self {
        let phase = phase.clamp(1, MAX_PHASE);
        let step = (phase - 1) as f32;
        Self {
            phase,
            speed: base_speed * (1.0 + step * 0.1),
            obstacle_freq: 0.1 + step * 0.1,
            pit_freq: 0.1 + step * 0.05,
        }
    }

    /// Raise the phase to match `score`. Never lowers it.
    ///
    /// Returns true if the phase changed.
    pub fn advance(&mut self, score: u64, base_speed: f32) -> bool {
        let target = phase_for_score(score);
        if target > self.phase {
            *self = Self::for_phase(target, base_speed);
            true
        } else {
            false
        }
    }
}

/// Phase reached at a given score
pub fn phase_for_score(score: u64) -> u8 {
    let steps = (score / SCORE_PER_PHASE).min((MAX_PHASE - 1) as u64);
    1 + steps as u8
}

/// Parameters for a score, ignoring run history
pub fn compute_difficulty(score: u64, base_speed: f32) -> Difficulty {
    Difficulty::for_phase(phase_for_score(score), base_speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_thresholds() {
        assert_eq!(phase_for_score(0), 1);
        assert_eq!(phase_for_score(999), 1);
        assert_eq!(phase_for_score(1000), 2);
        assert_eq!(phase_for_score(4000), 5);
        assert_eq!(phase_for_score(u64::MAX), 5);
    }

    #[test]
    fn test_phase_parameters() {
        let d = compute_difficulty(2500, 4.0);
        assert_eq!(d.phase, 3);
        assert!((d.speed - 4.8).abs() < 1e-5);
        assert!((d.obstacle_freq - 0.3).abs() < 1e-6);
        assert!((d.pit_freq - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_advance_is_idempotent_and_monotonic() {
        let mut d = Difficulty::initial(4.0);
        assert!(!d.advance(10, 4.0));
        assert_eq!(d, Difficulty::initial(4.0));

        assert!(d.advance(1200, 4.0));
        assert_eq!(d.phase, 2);
        assert!(!d.advance(1200, 4.0));

        // A lower score never lowers the phase
        assert!(!d.advance(0, 4.0));
        assert_eq!(d.phase, 2);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn phase_non_decreasing(mut scores in proptest::collection::vec(0u64..10_000, 1..50)) {
                scores.sort_unstable();
                let mut d = Difficulty::initial(4.0);
                let mut last = d.phase;
                for score in scores {
                    d.advance(score, 4.0);
                    prop_assert!(d.phase >= last);
                    prop_assert!((1..=MAX_PHASE).contains(&d.phase));
                    last = d.phase;
                }
            }
        }
    }
}
