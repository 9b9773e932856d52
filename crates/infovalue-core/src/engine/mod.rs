//! Experiment orchestration.
//!
//! - `params`: the immutable parameter set and the model dispatch table.
//! - `strategy`: the guessing policies applied to messages.
//! - `scoring`: win/lose tallies and the profit formula.
//! - `simulation`: trial and experiment loops producing an [`ExperimentResult`].

pub mod params;
pub mod scoring;
pub mod simulation;
pub mod strategy;

pub use params::{ModelParameters, ModelVariant};
pub use scoring::{GuessTally, RewardWeights};
pub use simulation::{
    ExperimentReport, ExperimentResult, SimulationEngine, TrialOutcome, run_experiment,
    run_experiment_detailed, run_experiment_with_seed,
};
pub use strategy::GuessStrategy;
