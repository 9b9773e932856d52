use infovalue_core::engine::{
    GuessStrategy, ModelParameters, ModelVariant, RewardWeights, SimulationEngine,
    run_experiment, run_experiment_detailed, run_experiment_with_seed,
};
use infovalue_core::model::{Message, MessageGenerator, MessagePolicy, StateSpace};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn params(model: ModelVariant) -> ModelParameters {
    ModelParameters {
        model,
        ..ModelParameters::default()
    }
}

#[test]
fn single_state_message_forces_correct_guesses() {
    let params = ModelParameters {
        states_amount: 4,
        guessing_amount: 1_000,
        experiments_amount: 1,
        guesser_message: MessagePolicy::Fixed { size: 1 },
        observer_message: MessagePolicy::Fixed { size: 3 },
        ..params(ModelVariant::UniformRandom)
    };
    let mut rng = StdRng::seed_from_u64(20240101);
    let report = run_experiment_detailed(&params, &mut rng).expect("experiment runs");

    for trial in &report.trials {
        assert_eq!(trial.prior_profit, 2.0);
        assert_eq!(trial.posterior_profit, 2.0);
        assert_eq!(trial.information_value, 0.0);
    }
    assert_eq!(report.result.average_prior_profit, 2.0);
    assert_eq!(report.result.average_posterior_profit, 2.0);
    assert_eq!(report.result.average_information_value, 0.0);
}

#[test]
fn full_disclosure_carries_no_information_value() {
    let params = ModelParameters {
        states_amount: 100,
        guessing_amount: 1_000,
        experiments_amount: 50,
        guesser_message: MessagePolicy::Fixed { size: 100 },
        observer_message: MessagePolicy::Fixed { size: 100 },
        ..params(ModelVariant::UniformRandom)
    };
    let result = run_experiment_with_seed(&params, 7).expect("experiment runs");

    let expected = 2.0 / 100.0 + 1.0 * 99.0 / 100.0;
    assert!(
        (result.average_prior_profit - expected).abs() < 0.005,
        "prior {}",
        result.average_prior_profit
    );
    assert!(
        (result.average_posterior_profit - expected).abs() < 0.005,
        "posterior {}",
        result.average_posterior_profit
    );
    assert!(result.average_information_value.abs() < 0.005);
    assert_eq!(result.average_guesser_message_len, 100.0);
}

#[test]
fn most_probable_full_disclosure_wins_at_sampling_rate() {
    let params = ModelParameters {
        weights: RewardWeights::new(1.0, 0.0),
        states_amount: 8,
        guessing_amount: 10,
        experiments_amount: 2_000,
        guesser_message: MessagePolicy::Fixed { size: 8 },
        observer_message: MessagePolicy::Fixed { size: 8 },
        ..params(ModelVariant::WeightedMostProbable)
    };
    let result = run_experiment_with_seed(&params, 11).expect("experiment runs");

    // The guess is always state 8; it wins exactly when state 8 was drawn.
    let expected = 8.0 / 36.0;
    assert!(
        (result.average_prior_profit - expected).abs() < 0.04,
        "win rate {}",
        result.average_prior_profit
    );
    assert_eq!(result.average_prior_profit, result.average_posterior_profit);
    assert_eq!(result.average_information_value, 0.0);
}

#[test]
fn most_probable_finds_dominant_actual_state() {
    let space = StateSpace::weighted(12).unwrap();
    let actual = space.states()[11];
    let mut rng = StdRng::seed_from_u64(3);
    for size in 1..=12 {
        let message = MessageGenerator::fixed(&space, actual, size, &mut rng).unwrap();
        let guess = GuessStrategy::MostProbable.guess(&message, &mut rng).unwrap();
        assert_eq!(guess.id, actual.id);
    }
}

#[test]
fn full_percentile_model_matches_random_model() {
    let base = ModelParameters {
        states_amount: 20,
        guessing_amount: 200,
        experiments_amount: 200,
        guesser_message: MessagePolicy::Fixed { size: 6 },
        observer_message: MessagePolicy::Fixed { size: 6 },
        states_percent: 100.0,
        ..params(ModelVariant::WeightedRandom)
    };
    let random = run_experiment_with_seed(&base, 5).unwrap();
    let top = run_experiment_with_seed(
        &ModelParameters {
            model: ModelVariant::WeightedTopPercentile,
            ..base.clone()
        },
        6,
    )
    .unwrap();

    assert!((random.average_prior_profit - top.average_prior_profit).abs() < 0.02);
    assert!((random.average_posterior_profit - top.average_posterior_profit).abs() < 0.03);
}

#[test]
fn narrower_percentile_beats_random_on_weighted_space() {
    let base = ModelParameters {
        states_amount: 50,
        guessing_amount: 100,
        experiments_amount: 200,
        states_percent: 10.0,
        ..params(ModelVariant::WeightedRandom)
    };
    let random = run_experiment_with_seed(&base, 21).unwrap();
    let top = run_experiment_with_seed(
        &ModelParameters {
            model: ModelVariant::WeightedTopPercentile,
            ..base.clone()
        },
        21,
    )
    .unwrap();
    assert!(top.average_prior_profit > random.average_prior_profit);
}

#[test]
fn observer_message_adds_value_with_default_parameters() {
    let result = run_experiment_with_seed(&params(ModelVariant::UniformRandom), 2024).unwrap();
    assert!(result.average_information_value > 0.1, "{result:?}");
    assert!(result.average_posterior_profit > result.average_prior_profit);
}

#[test]
fn threshold_messages_report_average_lengths() {
    let params = ModelParameters {
        states_amount: 41,
        guessing_amount: 200,
        experiments_amount: 50,
        guesser_message: MessagePolicy::Threshold { threshold: 0.25 },
        observer_message: MessagePolicy::Threshold { threshold: 0.5 },
        ..params(ModelVariant::WeightedRandom)
    };
    assert!(params.uses_variable_length_messages());
    let mut rng = StdRng::seed_from_u64(8);
    let result = run_experiment(&params, &mut rng).unwrap();
    assert!((result.average_guesser_message_len - 11.0).abs() < 0.3);
    assert!((result.average_observer_message_len - 21.0).abs() < 0.3);
}

#[test]
fn zero_threshold_observer_pins_the_posterior() {
    let params = ModelParameters {
        guesser_message: MessagePolicy::Fixed { size: 10 },
        observer_message: MessagePolicy::Threshold { threshold: 0.0 },
        ..params(ModelVariant::UniformRandom)
    };
    let result = run_experiment_with_seed(&params, 9).unwrap();
    assert_eq!(result.average_posterior_profit, 2.0);
    assert_eq!(result.average_observer_message_len, 1.0);
}

#[test]
fn intersection_of_generated_messages_keeps_actual() {
    let params = params(ModelVariant::WeightedRandom);
    let engine = SimulationEngine::new(&params).unwrap();
    let mut rng = StdRng::seed_from_u64(12);
    for _ in 0..100 {
        let actual = engine.space().sample_actual(&mut rng).unwrap();
        let a = MessageGenerator::generate(engine.space(), actual, params.guesser_message, &mut rng)
            .unwrap();
        let b = MessageGenerator::generate(engine.space(), actual, params.observer_message, &mut rng)
            .unwrap();
        let both: Message = a.intersect(&b);
        assert!(both.contains(actual.id));
        assert!(both.len() <= a.len().min(b.len()));
    }
}

#[test]
fn result_serializes_with_model_number() {
    let result = run_experiment_with_seed(
        &ModelParameters {
            guessing_amount: 5,
            experiments_amount: 2,
            ..params(ModelVariant::WeightedMostProbable)
        },
        1,
    )
    .unwrap();
    let value = serde_json::to_value(&result).expect("serializes");
    assert_eq!(value["model_number"], 3);
    assert_eq!(value["experiments_amount"], 2);
    assert!(value["average_information_value"].is_number());
}
