use std::path::PathBuf;

use clap::Parser;

use infovalue_bench::config::{ResolvedOutputs, SweepConfig};
use infovalue_bench::logging::init_logging;
use infovalue_bench::sweep::SweepRunner;

/// Monte-Carlo sweep harness for the information value experiments.
#[derive(Debug, Parser)]
#[command(
    name = "infovalue-bench",
    author,
    version,
    about = "Deterministic information value experiment sweeps"
)]
struct Cli {
    /// Path to the YAML sweep configuration.
    #[arg(short, long, value_name = "FILE", default_value = "bench/sweep.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the master RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of trials per experiment for every scenario.
    #[arg(long, value_name = "COUNT")]
    experiments: Option<usize>,

    /// Override the number of guessing attempts per trial for every scenario.
    #[arg(long, value_name = "COUNT")]
    guessing: Option<usize>,

    /// Exit after validating the configuration (no experiment is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SweepConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    for scenario in &mut config.scenarios {
        if let Some(experiments) = cli.experiments {
            scenario.experiments = experiments;
        }
        if let Some(guessing) = cli.guessing {
            scenario.guessing = guessing;
        }
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let scenario_count = config.scenarios.len();
    let run_id = config.run_id.clone();

    println!(
        "Loaded configuration '{run_id}' with {scenario_count} scenario{} (seed {})",
        if scenario_count == 1 { "" } else { "s" },
        config.seed.unwrap_or(0)
    );

    let _logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = SweepRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: sweep execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Sweep complete for '{run_id}': {} scenarios → {} rows at {}",
        summary.scenarios_run,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    println!("Summary data: {}", summary.summary_json_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Information value plot: {}", plot_path.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
