use core::fmt;
use serde::{Deserialize, Serialize};

use crate::engine::scoring::RewardWeights;
use crate::engine::strategy::GuessStrategy;
use crate::error::EngineError;
use crate::model::message::MessagePolicy;
use crate::model::space::Distribution;

/// The four experiment models. Each fixes a distribution and a guess strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ModelVariant {
    UniformRandom = 1,
    WeightedRandom = 2,
    WeightedMostProbable = 3,
    WeightedTopPercentile = 4,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 4] = [
        ModelVariant::UniformRandom,
        ModelVariant::WeightedRandom,
        ModelVariant::WeightedMostProbable,
        ModelVariant::WeightedTopPercentile,
    ];

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(ModelVariant::UniformRandom),
            2 => Some(ModelVariant::WeightedRandom),
            3 => Some(ModelVariant::WeightedMostProbable),
            4 => Some(ModelVariant::WeightedTopPercentile),
            _ => None,
        }
    }

    pub const fn number(self) -> u8 {
        self as u8
    }

    pub const fn distribution(self) -> Distribution {
        match self {
            ModelVariant::UniformRandom => Distribution::Uniform,
            ModelVariant::WeightedRandom
            | ModelVariant::WeightedMostProbable
            | ModelVariant::WeightedTopPercentile => Distribution::Weighted,
        }
    }

    /// `states_percent` is only consulted by the top-percentile model.
    pub fn strategy(self, states_percent: f64) -> GuessStrategy {
        match self {
            ModelVariant::UniformRandom | ModelVariant::WeightedRandom => {
                GuessStrategy::RandomFromMessage
            }
            ModelVariant::WeightedMostProbable => GuessStrategy::MostProbable,
            ModelVariant::WeightedTopPercentile => GuessStrategy::RandomFromTopPercentile {
                percent: states_percent,
            },
        }
    }
}

impl TryFrom<u8> for ModelVariant {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ModelVariant::from_number(value).ok_or_else(|| format!("unknown model number {value}"))
    }
}

impl From<ModelVariant> for u8 {
    fn from(value: ModelVariant) -> Self {
        value.number()
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model {}", self.number())
    }
}

/// Immutable input to one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub model: ModelVariant,
    pub weights: RewardWeights,
    pub states_amount: usize,
    pub guessing_amount: usize,
    pub experiments_amount: usize,
    pub guesser_message: MessagePolicy,
    pub observer_message: MessagePolicy,
    pub states_percent: f64,
}

impl ModelParameters {
    /// Fails loudly on any field outside its domain; nothing is clamped.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.weights.alpha.is_finite() {
            return Err(EngineError::invalid("alpha", "reward weight must be finite"));
        }
        if !self.weights.beta.is_finite() {
            return Err(EngineError::invalid("beta", "reward weight must be finite"));
        }
        if self.states_amount == 0 {
            return Err(EngineError::invalid(
                "states_amount",
                "state space needs at least one state",
            ));
        }
        if u32::try_from(self.states_amount).is_err() {
            return Err(EngineError::invalid(
                "states_amount",
                format!("{} states exceed the id range", self.states_amount),
            ));
        }
        if self.guessing_amount == 0 {
            return Err(EngineError::invalid(
                "guessing_amount",
                "at least one guessing attempt per trial is required",
            ));
        }
        if self.experiments_amount == 0 {
            return Err(EngineError::invalid(
                "experiments_amount",
                "at least one trial per experiment is required",
            ));
        }
        self.guesser_message
            .validate("guesser_message", self.states_amount)?;
        self.observer_message
            .validate("observer_message", self.states_amount)?;
        if self.model == ModelVariant::WeightedTopPercentile
            && !(self.states_percent > 0.0 && self.states_percent <= 100.0)
        {
            return Err(EngineError::invalid(
                "states_percent",
                format!("percent {} must lie in (0, 100]", self.states_percent),
            ));
        }
        Ok(())
    }

    pub fn distribution(&self) -> Distribution {
        self.model.distribution()
    }

    pub fn strategy(&self) -> GuessStrategy {
        self.model.strategy(self.states_percent)
    }

    pub fn uses_variable_length_messages(&self) -> bool {
        self.guesser_message.is_variable_length() || self.observer_message.is_variable_length()
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            model: ModelVariant::UniformRandom,
            weights: RewardWeights::new(2.0, 1.0),
            states_amount: 100,
            guessing_amount: 100,
            experiments_amount: 100,
            guesser_message: MessagePolicy::Fixed { size: 20 },
            observer_message: MessagePolicy::Fixed { size: 20 },
            states_percent: 25.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_table_matches_models() {
        use Distribution::*;
        let expected = [
            (ModelVariant::UniformRandom, Uniform, "random_from_message"),
            (ModelVariant::WeightedRandom, Weighted, "random_from_message"),
            (ModelVariant::WeightedMostProbable, Weighted, "most_probable"),
            (
                ModelVariant::WeightedTopPercentile,
                Weighted,
                "random_from_top_percentile",
            ),
        ];
        for (model, distribution, strategy) in expected {
            assert_eq!(model.distribution(), distribution);
            assert_eq!(model.strategy(25.0).label(), strategy);
        }
    }

    #[test]
    fn model_numbers_round_trip() {
        for model in ModelVariant::ALL {
            assert_eq!(ModelVariant::from_number(model.number()), Some(model));
        }
        assert!(ModelVariant::from_number(0).is_none());
        assert!(ModelVariant::try_from(5u8).is_err());
    }

    #[test]
    fn defaults_are_valid() {
        ModelParameters::default().validate().expect("defaults valid");
    }

    #[test]
    fn rejects_guesser_message_larger_than_space() {
        let params = ModelParameters {
            states_amount: 10,
            guesser_message: MessagePolicy::Fixed { size: 11 },
            ..ModelParameters::default()
        };
        let err = params.validate().expect_err("contradictory sizes");
        assert_eq!(err.field(), Some("guesser_message"));
    }

    #[test]
    fn rejects_zero_counts() {
        let params = ModelParameters {
            guessing_amount: 0,
            ..ModelParameters::default()
        };
        assert_eq!(params.validate().unwrap_err().field(), Some("guessing_amount"));

        let params = ModelParameters {
            experiments_amount: 0,
            ..ModelParameters::default()
        };
        assert_eq!(
            params.validate().unwrap_err().field(),
            Some("experiments_amount")
        );

        let params = ModelParameters {
            states_amount: 0,
            guesser_message: MessagePolicy::Fixed { size: 1 },
            observer_message: MessagePolicy::Fixed { size: 1 },
            ..ModelParameters::default()
        };
        assert_eq!(params.validate().unwrap_err().field(), Some("states_amount"));
    }

    #[test]
    fn percent_only_checked_for_top_percentile_model() {
        let params = ModelParameters {
            states_percent: 0.0,
            ..ModelParameters::default()
        };
        assert!(params.validate().is_ok());

        let params = ModelParameters {
            model: ModelVariant::WeightedTopPercentile,
            states_percent: 0.0,
            ..ModelParameters::default()
        };
        assert_eq!(params.validate().unwrap_err().field(), Some("states_percent"));

        let params = ModelParameters {
            model: ModelVariant::WeightedTopPercentile,
            states_percent: 100.5,
            ..ModelParameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_weights() {
        let params = ModelParameters {
            weights: RewardWeights::new(f64::INFINITY, 1.0),
            ..ModelParameters::default()
        };
        assert_eq!(params.validate().unwrap_err().field(), Some("alpha"));
    }
}
