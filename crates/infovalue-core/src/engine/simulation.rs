use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

use crate::engine::params::ModelParameters;
use crate::engine::scoring::GuessTally;
use crate::engine::strategy::GuessStrategy;
use crate::error::EngineError;
use crate::model::message::MessageGenerator;
use crate::model::space::StateSpace;
use crate::model::state::State;
use crate::rng::RandomSource;

/// Averaged outcome of one experiment. The only value that leaves the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub model_number: u8,
    pub alpha: f64,
    pub beta: f64,
    pub states_amount: usize,
    pub guessing_amount: usize,
    pub experiments_amount: usize,
    pub average_guesser_message_len: f64,
    pub average_observer_message_len: f64,
    pub average_prior_profit: f64,
    pub average_posterior_profit: f64,
    pub average_information_value: f64,
}

/// Scalars produced by a single trial (one actual-state draw).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub actual: State,
    pub prior: GuessTally,
    pub posterior: GuessTally,
    pub prior_profit: f64,
    pub posterior_profit: f64,
    pub information_value: f64,
    pub guesser_message_len: f64,
    pub observer_message_len: f64,
}

/// Experiment result together with the trial-level values it was averaged from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    pub result: ExperimentResult,
    pub trials: Vec<TrialOutcome>,
}

/// Runs trials for one validated parameter set over a fixed state space.
#[derive(Debug, Clone)]
pub struct SimulationEngine<'a> {
    params: &'a ModelParameters,
    space: StateSpace,
    strategy: GuessStrategy,
}

impl<'a> SimulationEngine<'a> {
    pub fn new(params: &'a ModelParameters) -> Result<Self, EngineError> {
        params.validate()?;
        let space = StateSpace::generate(params.distribution(), params.states_amount)?;
        Ok(Self {
            params,
            space,
            strategy: params.strategy(),
        })
    }

    pub fn space(&self) -> &StateSpace {
        &self.space
    }

    pub fn strategy(&self) -> GuessStrategy {
        self.strategy
    }

    pub fn run<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<ExperimentResult, EngineError> {
        self.run_detailed(rng).map(|report| report.result)
    }

    pub fn run_detailed<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<ExperimentReport, EngineError> {
        let params = self.params;
        let mut trials = Vec::with_capacity(params.experiments_amount);
        for trial_index in 0..params.experiments_amount {
            let outcome = self.run_trial(rng)?;
            if tracing::enabled!(Level::TRACE) {
                event!(
                    target: "infovalue_core::trial",
                    Level::TRACE,
                    model = params.model.number(),
                    trial = trial_index,
                    actual = outcome.actual.id.get(),
                    prior_wins = outcome.prior.wins,
                    posterior_wins = outcome.posterior.wins,
                    prior_profit = outcome.prior_profit,
                    posterior_profit = outcome.posterior_profit
                );
            }
            trials.push(outcome);
        }

        let result = ExperimentResult {
            model_number: params.model.number(),
            alpha: params.weights.alpha,
            beta: params.weights.beta,
            states_amount: params.states_amount,
            guessing_amount: params.guessing_amount,
            experiments_amount: params.experiments_amount,
            average_guesser_message_len: mean(trials.iter().map(|t| t.guesser_message_len)),
            average_observer_message_len: mean(trials.iter().map(|t| t.observer_message_len)),
            average_prior_profit: mean(trials.iter().map(|t| t.prior_profit)),
            average_posterior_profit: mean(trials.iter().map(|t| t.posterior_profit)),
            average_information_value: mean(trials.iter().map(|t| t.information_value)),
        };

        event!(
            target: "infovalue_core::experiment",
            Level::DEBUG,
            model = result.model_number,
            strategy = self.strategy.label(),
            states = result.states_amount,
            trials = result.experiments_amount,
            guesses = result.guessing_amount,
            prior_profit = result.average_prior_profit,
            posterior_profit = result.average_posterior_profit,
            information_value = result.average_information_value,
            "experiment finished"
        );

        Ok(ExperimentReport { result, trials })
    }

    /// Draw an actual state, then run the configured number of guessing attempts.
    pub fn run_trial<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<TrialOutcome, EngineError> {
        let actual = self.space.sample_actual(rng)?;
        self.run_trial_for(actual, rng)
    }

    pub fn run_trial_for<R: RandomSource + ?Sized>(
        &self,
        actual: State,
        rng: &mut R,
    ) -> Result<TrialOutcome, EngineError> {
        let params = self.params;
        let mut prior = GuessTally::default();
        let mut posterior = GuessTally::default();
        let mut guesser_total = 0usize;
        let mut observer_total = 0usize;

        for _ in 0..params.guessing_amount {
            let guesser =
                MessageGenerator::generate(&self.space, actual, params.guesser_message, rng)?;
            let observer =
                MessageGenerator::generate(&self.space, actual, params.observer_message, rng)?;
            let intersection = guesser.intersect(&observer);
            guesser_total += guesser.len();
            observer_total += observer.len();

            let prior_guess = self.strategy.guess(&guesser, rng)?;
            prior.record(prior_guess.id == actual.id);

            let posterior_guess = self.strategy.guess(&intersection, rng)?;
            posterior.record(posterior_guess.id == actual.id);
        }

        let attempts = params.guessing_amount as u64;
        let prior_profit = params.weights.score(&prior, attempts)?;
        let posterior_profit = params.weights.score(&posterior, attempts)?;

        Ok(TrialOutcome {
            actual,
            prior,
            posterior,
            prior_profit,
            posterior_profit,
            information_value: posterior_profit - prior_profit,
            guesser_message_len: guesser_total as f64 / params.guessing_amount as f64,
            observer_message_len: observer_total as f64 / params.guessing_amount as f64,
        })
    }
}

/// Validate `params` and run one experiment with the supplied randomness.
pub fn run_experiment<R: RandomSource + ?Sized>(
    params: &ModelParameters,
    rng: &mut R,
) -> Result<ExperimentResult, EngineError> {
    SimulationEngine::new(params)?.run(rng)
}

pub fn run_experiment_detailed<R: RandomSource + ?Sized>(
    params: &ModelParameters,
    rng: &mut R,
) -> Result<ExperimentReport, EngineError> {
    SimulationEngine::new(params)?.run_detailed(rng)
}

pub fn run_experiment_with_seed(
    params: &ModelParameters,
    seed: u64,
) -> Result<ExperimentResult, EngineError> {
    let mut rng = StdRng::seed_from_u64(seed);
    run_experiment(params, &mut rng)
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = values.len();
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}
