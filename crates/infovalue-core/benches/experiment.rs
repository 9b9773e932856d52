use criterion::{black_box, criterion_group, criterion_main, Criterion};
use infovalue_core::engine::{ModelParameters, ModelVariant, run_experiment_with_seed};
use infovalue_core::model::MessagePolicy;

fn bench_model(model: ModelVariant, guesser: MessagePolicy) {
    let params = ModelParameters {
        model,
        guessing_amount: 50,
        experiments_amount: 20,
        guesser_message: guesser,
        ..ModelParameters::default()
    };
    let _ = black_box(run_experiment_with_seed(&params, 1040));
}

fn experiment_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("experiment");
    for model in ModelVariant::ALL {
        group.bench_function(format!("fixed_model_{}", model.number()), |b| {
            b.iter(|| bench_model(model, MessagePolicy::Fixed { size: 20 }))
        });
    }
    group.bench_function("threshold_model_1", |b| {
        b.iter(|| {
            bench_model(
                ModelVariant::UniformRandom,
                MessagePolicy::Threshold { threshold: 0.2 },
            )
        })
    });
    group.finish();
}

criterion_group!(benches, experiment_bench);
criterion_main!(benches);
