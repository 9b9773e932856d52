mod seeds;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use infovalue_core::EngineError;
use infovalue_core::engine::{
    ExperimentReport, ExperimentResult, ModelParameters, SimulationEngine,
};
use infovalue_core::model::{Distribution, MessagePolicy};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{ResolvedOutputs, SweepConfig, ValidationError};
use crate::logging::{TELEMETRY_FILE, telemetry_dir};

pub use seeds::ScenarioSeeds;

const MAX_SCENARIOS: usize = 256;

/// Primary entry point for running a sweep of experiment scenarios.
pub struct SweepRunner {
    config: SweepConfig,
    outputs: ResolvedOutputs,
    plans: Vec<ScenarioPlan>,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub scenarios_run: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub summary_json_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
}

struct ScenarioPlan {
    name: String,
    params: ModelParameters,
    seed: u64,
}

/// Result of one scenario, kept in configuration order.
pub struct ScenarioOutcome {
    pub name: String,
    pub seed: u64,
    pub params: ModelParameters,
    pub report: ExperimentReport,
    pub elapsed_ms: f64,
}

impl SweepRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: SweepConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        if config.scenarios.len() > MAX_SCENARIOS {
            return Err(RunnerError::ScenarioLimit {
                requested: config.scenarios.len(),
                max: MAX_SCENARIOS,
            });
        }

        let seeds = ScenarioSeeds::new(config.seed.unwrap_or(0), config.scenarios.len());
        let plans = config
            .scenarios
            .iter()
            .zip(seeds.as_slice())
            .map(|(scenario, seed)| {
                Ok(ScenarioPlan {
                    name: scenario.name.clone(),
                    params: scenario.to_parameters()?,
                    seed: *seed,
                })
            })
            .collect::<Result<Vec<_>, RunnerError>>()?;

        Ok(Self {
            config,
            outputs,
            plans,
        })
    }

    pub fn scenario_count(&self) -> usize {
        self.plans.len()
    }

    /// Execute every scenario, then write JSONL rows, the summary and the plot.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        if !self.outputs.plots_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.plots_dir)?;
        }

        // Each scenario owns its RNG, so the output does not depend on scheduling.
        let outcomes = self
            .plans
            .par_iter()
            .map(run_plan)
            .collect::<Result<Vec<_>, RunnerError>>()?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut analytics = AnalyticsCollector::new(&self.config.run_id);
        let mut rows_written = 0usize;
        for outcome in &outcomes {
            write_result_row(&mut writer, &self.config.run_id, outcome)?;
            analytics.record_scenario(outcome);
            rows_written += 1;
        }
        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;
        let summary_json_path = self.outputs.summary_md.with_extension("json");
        summary.write_json(&summary_json_path)?;
        let plot_path = match summary.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {}", err);
                None
            }
        };

        let telemetry_path = if self.config.logging.enable_structured {
            Some(telemetry_dir(&self.outputs).join(TELEMETRY_FILE))
        } else {
            None
        };

        Ok(RunSummary {
            scenarios_run: outcomes.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            summary_json_path,
            plot_path,
            telemetry_path,
        })
    }
}

fn run_plan(plan: &ScenarioPlan) -> Result<ScenarioOutcome, RunnerError> {
    let engine = SimulationEngine::new(&plan.params).map_err(|source| RunnerError::Engine {
        scenario: plan.name.clone(),
        source,
    })?;
    let mut rng = StdRng::seed_from_u64(plan.seed);
    let start = Instant::now();
    let report = engine
        .run_detailed(&mut rng)
        .map_err(|source| RunnerError::Engine {
            scenario: plan.name.clone(),
            source,
        })?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1_000.0;

    if tracing::enabled!(Level::INFO) {
        event!(
            target: "infovalue_bench::scenario",
            Level::INFO,
            scenario = %plan.name,
            seed = plan.seed,
            model = report.result.model_number,
            strategy = engine.strategy().label(),
            prior_profit = report.result.average_prior_profit,
            posterior_profit = report.result.average_posterior_profit,
            information_value = report.result.average_information_value,
            elapsed_ms
        );
    }

    Ok(ScenarioOutcome {
        name: plan.name.clone(),
        seed: plan.seed,
        params: plan.params.clone(),
        report,
        elapsed_ms,
    })
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_result_row(
    writer: &mut BufWriter<File>,
    run_id: &str,
    outcome: &ScenarioOutcome,
) -> Result<(), RunnerError> {
    let params = &outcome.params;
    let row = ResultLogRow {
        run_id,
        scenario: &outcome.name,
        seed: outcome.seed,
        distribution: params.distribution(),
        strategy: params.strategy().label(),
        guesser_message: params.guesser_message,
        observer_message: params.observer_message,
        states_percent: params.states_percent,
        result: &outcome.report.result,
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[derive(Serialize)]
struct ResultLogRow<'a> {
    run_id: &'a str,
    scenario: &'a str,
    seed: u64,
    distribution: Distribution,
    strategy: &'static str,
    guesser_message: MessagePolicy,
    observer_message: MessagePolicy,
    states_percent: f64,
    #[serde(flatten)]
    result: &'a ExperimentResult,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Config(#[from] ValidationError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize result row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("scenario '{scenario}' failed: {source}")]
    Engine {
        scenario: String,
        #[source]
        source: EngineError,
    },
    #[error("requested {requested} scenarios exceeds maximum of {max}")]
    ScenarioLimit { requested: usize, max: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}
