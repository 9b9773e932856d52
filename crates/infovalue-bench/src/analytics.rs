use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::sweep::ScenarioOutcome;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// Collects per-scenario reports in the order scenarios were recorded.
pub struct AnalyticsCollector {
    run_id: String,
    reports: Vec<ScenarioReport>,
}

impl AnalyticsCollector {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            reports: Vec::new(),
        }
    }

    pub fn record_scenario(&mut self, outcome: &ScenarioOutcome) {
        let result = &outcome.report.result;
        let trials = &outcome.report.trials;
        let prior: Vec<f64> = trials.iter().map(|t| t.prior_profit).collect();
        let posterior: Vec<f64> = trials.iter().map(|t| t.posterior_profit).collect();
        let value: Vec<f64> = trials.iter().map(|t| t.information_value).collect();

        self.reports.push(ScenarioReport {
            name: outcome.name.clone(),
            model: result.model_number,
            alpha: result.alpha,
            beta: result.beta,
            states: result.states_amount,
            guessing: result.guessing_amount,
            experiments: result.experiments_amount,
            variable_length: outcome.params.uses_variable_length_messages(),
            avg_guesser_len: result.average_guesser_message_len,
            avg_observer_len: result.average_observer_message_len,
            prior_profit: result.average_prior_profit,
            posterior_profit: result.average_posterior_profit,
            information_value: result.average_information_value,
            prior_std_dev: std_dev(&prior),
            posterior_std_dev: std_dev(&posterior),
            information_value_std_dev: std_dev(&value),
            elapsed_ms: outcome.elapsed_ms,
        });
    }

    pub fn finalize(self) -> AnalyticsSummary {
        AnalyticsSummary {
            run_id: self.run_id,
            scenarios: self.reports,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub scenarios: Vec<ScenarioReport>,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str(&format!("# Information Value Sweep `{}`\n\n", self.run_id));
        rows.push_str("Std-dev columns give the spread of trial-level values across repetitions.\n\n");
        rows.push_str("| Scenario | Model | Alpha | Beta | States | Experiments | Guessing | Avg guesser len | Avg observer len | Prior profit | Posterior profit | Information value | IV std-dev | Elapsed ms |\n");
        rows.push_str("|----------|-------|-------|------|--------|-------------|----------|-----------------|------------------|--------------|------------------|-------------------|------------|------------|\n");

        for scenario in &self.scenarios {
            rows.push_str(&format!(
                "| {name} | {model} | {alpha} | {beta} | {states} | {experiments} | {guessing} | {guesser:.2}{marker} | {observer:.2}{marker} | {prior:.4} | {posterior:.4} | {value:+.4} | {spread:.4} | {elapsed:.1} |\n",
                name = scenario.name,
                model = scenario.model,
                alpha = scenario.alpha,
                beta = scenario.beta,
                states = scenario.states,
                experiments = scenario.experiments,
                guessing = scenario.guessing,
                guesser = scenario.avg_guesser_len,
                observer = scenario.avg_observer_len,
                marker = if scenario.variable_length { "*" } else { "" },
                prior = scenario.prior_profit,
                posterior = scenario.posterior_profit,
                value = scenario.information_value,
                spread = scenario.information_value_std_dev,
                elapsed = scenario.elapsed_ms,
            ));
        }

        if self.scenarios.iter().any(|s| s.variable_length) {
            rows.push_str("\n\\* threshold messages: length varies per attempt.\n");
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    /// Machine-readable counterpart of the markdown table, including every spread column.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let body = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), body).map_err(|e| AnalyticsError::Io {
            context: "writing summary json",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("information_value.png");
        let scenarios = self.scenarios.clone();

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let y_range_min = scenarios
                .iter()
                .map(|s| s.information_value)
                .fold(0.0f64, |acc, v| acc.min(v));
            let y_range_max = scenarios
                .iter()
                .map(|s| s.information_value)
                .fold(0.0f64, |acc, v| acc.max(v));
            let margin = ((y_range_max - y_range_min).abs() * 0.1).max(0.05);

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Information value by scenario", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 60)
                .build_cartesian_2d(
                    0..scenarios.len(),
                    (y_range_min - margin)..(y_range_max + margin),
                )
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("posterior - prior profit")
                .x_desc("Scenario")
                .x_label_formatter(&|idx| {
                    scenarios
                        .get(*idx)
                        .map(|scenario| scenario.name.clone())
                        .unwrap_or_default()
                })
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(scenarios.iter().enumerate().map(|(idx, scenario)| {
                    let color = if scenario.information_value >= 0.0 {
                        &GREEN
                    } else {
                        &RED
                    };
                    Rectangle::new(
                        [(idx, 0.0), (idx + 1, scenario.information_value)],
                        color.filled(),
                    )
                }))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub model: u8,
    pub alpha: f64,
    pub beta: f64,
    pub states: usize,
    pub guessing: usize,
    pub experiments: usize,
    pub variable_length: bool,
    pub avg_guesser_len: f64,
    pub avg_observer_len: f64,
    pub prior_profit: f64,
    pub posterior_profit: f64,
    pub information_value: f64,
    pub prior_std_dev: f64,
    pub posterior_std_dev: f64,
    pub information_value_std_dev: f64,
    #[serde(skip)]
    pub elapsed_ms: f64,
}

/// Sample standard deviation; zero when fewer than two values are available.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    Statistics::std_dev(values.iter())
}
