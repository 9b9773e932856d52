use crate::error::EngineError;
use crate::model::state::{State, StateId};
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

/// How probability mass is spread over a state space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    /// Every state carries `1/n`; the actual state is drawn by plain index.
    Uniform,
    /// Mass proportional to rank; the actual state is drawn by inverse CDF.
    Weighted,
}

/// Ordered set of possible states for one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    states: Vec<State>,
    distribution: Distribution,
}

impl StateSpace {
    pub fn generate(distribution: Distribution, n: usize) -> Result<Self, EngineError> {
        match distribution {
            Distribution::Uniform => Self::uniform(n),
            Distribution::Weighted => Self::weighted(n),
        }
    }

    /// `n` states with equal mass `1/n`.
    pub fn uniform(n: usize) -> Result<Self, EngineError> {
        ensure_non_empty(n)?;
        let mass = 1.0 / n as f64;
        let states = (1..=n)
            .map(|rank| Ok(State::new(state_id(rank)?, mass)))
            .collect::<Result<Vec<_>, EngineError>>()?;
        Ok(Self {
            states,
            distribution: Distribution::Uniform,
        })
    }

    /// Triangular distribution: state `i` gets `i / (n(n+1)/2)`.
    pub fn weighted(n: usize) -> Result<Self, EngineError> {
        ensure_non_empty(n)?;
        let total = (n as f64) * (n as f64 + 1.0) / 2.0;
        let states = (1..=n)
            .map(|rank| Ok(State::new(state_id(rank)?, rank as f64 / total)))
            .collect::<Result<Vec<_>, EngineError>>()?;
        Ok(Self {
            states,
            distribution: Distribution::Weighted,
        })
    }

    /// Weighted space with explicit (not necessarily normalised) masses, ids assigned from 1.
    pub fn with_probabilities(
        probabilities: impl IntoIterator<Item = f64>,
    ) -> Result<Self, EngineError> {
        let states = probabilities
            .into_iter()
            .enumerate()
            .map(|(index, probability)| {
                if !probability.is_finite() || probability < 0.0 {
                    return Err(EngineError::invalid(
                        "probability",
                        format!("state {} has invalid mass {probability}", index + 1),
                    ));
                }
                Ok(State::new(state_id(index + 1)?, probability))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        ensure_non_empty(states.len())?;
        Ok(Self {
            states,
            distribution: Distribution::Weighted,
        })
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

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    pub fn total_probability(&self) -> f64 {
        self.states.iter().map(|state| state.probability).sum()
    }

    /// Draw the actual state for a trial, consistent with the space's distribution.
    pub fn sample_actual<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<State, EngineError> {
        match self.distribution {
            Distribution::Uniform => Ok(self.states[rng.next_index(self.states.len())]),
            Distribution::Weighted => self.sample_weighted(rng),
        }
    }

    fn sample_weighted<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<State, EngineError> {
        let total = self.total_probability();
        if total <= 0.0 {
            return Err(EngineError::invariant(
                "weighted sampling over a state space with zero total mass",
            ));
        }

        let target = rng.next_unit() * total;
        let mut cumulative = 0.0;
        for state in &self.states {
            cumulative += state.probability;
            if target < cumulative {
                return Ok(*state);
            }
        }

        Err(EngineError::invariant(format!(
            "weighted sampler exhausted {} states (target {target}, cumulative {cumulative})",
            self.states.len()
        )))
    }
}

fn ensure_non_empty(n: usize) -> Result<(), EngineError> {
    if n == 0 {
        return Err(EngineError::invalid(
            "states_amount",
            "state space needs at least one state",
        ));
    }
    Ok(())
}

fn state_id(rank: usize) -> Result<StateId, EngineError> {
    u32::try_from(rank)
        .ok()
        .and_then(StateId::new)
        .ok_or_else(|| EngineError::invalid("states_amount", format!("state rank {rank} out of range")))
}
