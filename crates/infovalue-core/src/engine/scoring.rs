use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Win/lose counts accumulated over one trial's guessing attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessTally {
    pub wins: u64,
    pub loses: u64,
}

impl GuessTally {
    pub fn record(&mut self, correct: bool) {
        if correct {
            self.wins += 1;
        } else {
            self.loses += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.wins + self.loses
    }
}

/// Reward weights applied to the win and lose rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardWeights {
    pub alpha: f64,
    pub beta: f64,
}

impl RewardWeights {
    pub const fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// `alpha * wins / n + beta * loses / n`. Both weights apply additively; the caller
    /// picks their signs. Does not check `tally.total() == trial_count`.
    pub fn score(&self, tally: &GuessTally, trial_count: u64) -> Result<f64, EngineError> {
        if trial_count == 0 {
            return Err(EngineError::invalid(
                "trial_count",
                "profit is undefined over zero guessing attempts",
            ));
        }
        let n = trial_count as f64;
        Ok(self.alpha * (tally.wins as f64 / n) + self.beta * (tally.loses as f64 / n))
    }
}
