//! Messages: partial disclosures of the actual state.

use std::collections::HashSet;

use crate::error::EngineError;
use crate::model::space::StateSpace;
use crate::model::state::{State, StateId};
use crate::rng::RandomSource;
use rand::seq::SliceRandom;
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// A set of candidate states a party considers possible.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    states: Vec<State>,
}

impl Message {
    pub fn new(states: Vec<State>) -> Self {
        Self { states }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.states.iter().any(|state| state.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.iter().map(|state| state.id)
    }

    /// States present in both messages, one copy per id, in `self`'s order.
    pub fn intersect(&self, other: &Message) -> Message {
        let lookup: HashSet<StateId> = other.ids().collect();
        let mut seen = HashSet::with_capacity(self.states.len().min(lookup.len()));
        let states = self
            .states
            .iter()
            .filter(|state| lookup.contains(&state.id) && seen.insert(state.id))
            .copied()
            .collect();
        Message { states }
    }
}

/// How a party's message is built around the actual state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePolicy {
    /// Exactly `size` states: the actual one plus `size - 1` distinct decoys.
    Fixed { size: usize },
    /// The actual state plus each decoy independently with probability `threshold`.
    Threshold { threshold: f64 },
}

impl MessagePolicy {
    pub fn is_variable_length(&self) -> bool {
        matches!(self, MessagePolicy::Threshold { .. })
    }

    /// Expected message length over a space of `n` states.
    pub fn expected_len(&self, n: usize) -> f64 {
        match *self {
            MessagePolicy::Fixed { size } => size as f64,
            MessagePolicy::Threshold { threshold } => {
                1.0 + threshold * n.saturating_sub(1) as f64
            }
        }
    }

    pub(crate) fn validate(&self, field: &str, states_amount: usize) -> Result<(), EngineError> {
        match *self {
            MessagePolicy::Fixed { size } => {
                if size == 0 {
                    return Err(EngineError::invalid(field, "message size must be at least 1"));
                }
                if size > states_amount {
                    return Err(EngineError::invalid(
                        field,
                        format!("message size {size} exceeds state space size {states_amount}"),
                    ));
                }
            }
            MessagePolicy::Threshold { threshold } => {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(EngineError::invalid(
                        field,
                        format!("threshold {threshold} must lie in [0, 1]"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Builds messages for the guesser and the observer.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageGenerator;

impl MessageGenerator {
    pub fn generate<R: RandomSource + ?Sized>(
        space: &StateSpace,
        actual: State,
        policy: MessagePolicy,
        rng: &mut R,
    ) -> Result<Message, EngineError> {
        match policy {
            MessagePolicy::Fixed { size } => Self::fixed(space, actual, size, rng),
            MessagePolicy::Threshold { threshold } => {
                Ok(Self::threshold(space, actual, threshold, rng))
            }
        }
    }

    /// Actual state plus `size - 1` decoys drawn without replacement, fairly shuffled.
    pub fn fixed<R: RandomSource + ?Sized>(
        space: &StateSpace,
        actual: State,
        size: usize,
        rng: &mut R,
    ) -> Result<Message, EngineError> {
        if size == 0 || size > space.len() {
            return Err(EngineError::invalid(
                "message_size",
                format!("size {size} outside 1..={}", space.len()),
            ));
        }

        let decoys: Vec<State> = space
            .states()
            .iter()
            .filter(|state| state.id != actual.id)
            .copied()
            .collect();

        let mut states: Vec<State> = index::sample(rng, decoys.len(), size - 1)
            .iter()
            .map(|pick| decoys[pick])
            .collect();
        states.push(actual);
        states.shuffle(rng);

        Ok(Message::new(states))
    }

    /// Actual state first, then each decoy kept when its draw falls below `threshold`.
    pub fn threshold<R: RandomSource + ?Sized>(
        space: &StateSpace,
        actual: State,
        threshold: f64,
        rng: &mut R,
    ) -> Message {
        let mut states = Vec::with_capacity(space.len());
        states.push(actual);
        for state in space.states() {
            if state.id != actual.id && rng.next_unit() < threshold {
                states.push(*state);
            }
        }
        Message::new(states)
    }
}
