use std::cmp::Ordering;

use crate::error::EngineError;
use crate::model::message::Message;
use crate::model::state::State;
use crate::rng::RandomSource;

/// Policy used to pick a guess out of a message. Fixed for a whole experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuessStrategy {
    /// Uniform pick among the message entries.
    RandomFromMessage,
    /// Highest probability; ties go to the lowest id.
    MostProbable,
    /// Uniform pick among the top `percent` of entries by probability.
    RandomFromTopPercentile { percent: f64 },
}

impl GuessStrategy {
    pub fn guess<R: RandomSource + ?Sized>(
        &self,
        message: &Message,
        rng: &mut R,
    ) -> Result<State, EngineError> {
        if message.is_empty() {
            return Err(EngineError::invariant("cannot guess from an empty message"));
        }

        match *self {
            GuessStrategy::RandomFromMessage => Ok(random_from(message.states(), rng)),
            GuessStrategy::MostProbable => Ok(most_probable(message.states())),
            GuessStrategy::RandomFromTopPercentile { percent } => {
                let ranked = ranked_by_probability(message.states());
                let keep = top_count(ranked.len(), percent);
                Ok(random_from(&ranked[..keep], rng))
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GuessStrategy::RandomFromMessage => "random_from_message",
            GuessStrategy::MostProbable => "most_probable",
            GuessStrategy::RandomFromTopPercentile { .. } => "random_from_top_percentile",
        }
    }
}

fn random_from<R: RandomSource + ?Sized>(states: &[State], rng: &mut R) -> State {
    states[rng.next_index(states.len())]
}

fn most_probable(states: &[State]) -> State {
    let mut best = states[0];
    for state in &states[1..] {
        if by_rank(state, &best) == Ordering::Less {
            best = *state;
        }
    }
    best
}

/// Descending probability, then ascending id.
fn by_rank(a: &State, b: &State) -> Ordering {
    b.probability
        .total_cmp(&a.probability)
        .then_with(|| a.id.cmp(&b.id))
}

fn ranked_by_probability(states: &[State]) -> Vec<State> {
    let mut ranked = states.to_vec();
    ranked.sort_by(by_rank);
    ranked
}

/// `ceil(len * percent / 100)`, clamped to `1..=len`.
pub(crate) fn top_count(len: usize, percent: f64) -> usize {
    let raw = (len as f64 * percent / 100.0).ceil() as usize;
    raw.clamp(1, len)
}
