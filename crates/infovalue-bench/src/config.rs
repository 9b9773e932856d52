use infovalue_core::EngineError;
use infovalue_core::engine::{ModelParameters, ModelVariant, RewardWeights};
use infovalue_core::model::MessagePolicy;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_MODEL: u8 = 1;
const DEFAULT_ALPHA: f64 = 2.0;
const DEFAULT_BETA: f64 = 1.0;
const DEFAULT_STATES: usize = 100;
const DEFAULT_REPETITIONS: usize = 100;
const DEFAULT_MESSAGE_STATES: usize = 20;
const DEFAULT_MESSAGE_THRESHOLD: f64 = 0.2;
const DEFAULT_STATES_PERCENT: f64 = 25.0;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root sweep configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SweepConfig {
    pub run_id: String,
    #[serde(default)]
    pub seed: Option<u64>,
    pub scenarios: Vec<ScenarioConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SweepConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SweepConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        validate_scenarios(&self.scenarios)?;
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
        }
    }
}

/// One named parameter set. Field names and defaults follow the experiment form.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default = "default_model")]
    pub model: u8,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default = "default_states")]
    pub states: usize,
    #[serde(default = "default_repetitions")]
    pub guessing: usize,
    #[serde(default = "default_repetitions")]
    pub experiments: usize,
    #[serde(default = "default_message_states")]
    pub guesser_states: usize,
    #[serde(default = "default_message_states")]
    pub observer_states: usize,
    /// Switches both parties from fixed-size to threshold messages.
    #[serde(default)]
    pub random_message_length: bool,
    #[serde(default = "default_message_threshold")]
    pub guesser_threshold: f64,
    #[serde(default = "default_message_threshold")]
    pub observer_threshold: f64,
    #[serde(default = "default_states_percent")]
    pub states_percent: f64,
}

impl ScenarioConfig {
    /// Build the engine's parameter set, rejecting anything the engine would refuse.
    pub fn to_parameters(&self) -> Result<ModelParameters, ValidationError> {
        let model = ModelVariant::from_number(self.model).ok_or_else(|| {
            ValidationError::InvalidField {
                field: format!("scenarios[{}].model", self.name),
                message: format!("model must be 1, 2, 3 or 4 (got {})", self.model),
            }
        })?;

        let (guesser_message, observer_message) = if self.random_message_length {
            (
                MessagePolicy::Threshold {
                    threshold: self.guesser_threshold,
                },
                MessagePolicy::Threshold {
                    threshold: self.observer_threshold,
                },
            )
        } else {
            (
                MessagePolicy::Fixed {
                    size: self.guesser_states,
                },
                MessagePolicy::Fixed {
                    size: self.observer_states,
                },
            )
        };

        let params = ModelParameters {
            model,
            weights: RewardWeights::new(self.alpha, self.beta),
            states_amount: self.states,
            guessing_amount: self.guessing,
            experiments_amount: self.experiments,
            guesser_message,
            observer_message,
            states_percent: self.states_percent,
        };
        params
            .validate()
            .map_err(|err| ValidationError::from_engine(&self.name, err))?;
        Ok(params)
    }
}

fn default_model() -> u8 {
    DEFAULT_MODEL
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_beta() -> f64 {
    DEFAULT_BETA
}

fn default_states() -> usize {
    DEFAULT_STATES
}

fn default_repetitions() -> usize {
    DEFAULT_REPETITIONS
}

fn default_message_states() -> usize {
    DEFAULT_MESSAGE_STATES
}

fn default_message_threshold() -> f64 {
    DEFAULT_MESSAGE_THRESHOLD
}

fn default_states_percent() -> f64 {
    DEFAULT_STATES_PERCENT
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    pub plots_dir: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_scenarios(scenarios: &[ScenarioConfig]) -> Result<(), ValidationError> {
    if scenarios.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "scenarios".to_string(),
            message: "at least one scenario must be specified".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for scenario in scenarios {
        if scenario.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "scenarios.name".to_string(),
                message: "scenario name must not be empty".to_string(),
            });
        }

        if !scenario.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: format!("scenarios[{}].name", scenario.name),
                message: "scenario name contains invalid characters".to_string(),
            });
        }

        if !seen.insert(scenario.name.clone()) {
            return Err(ValidationError::InvalidField {
                field: "scenarios".to_string(),
                message: format!("scenario name '{}' defined more than once", scenario.name),
            });
        }

        scenario.to_parameters()?;
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn from_engine(scenario: &str, err: EngineError) -> Self {
        match err {
            EngineError::InvalidParameter { field, message } => ValidationError::InvalidField {
                field: format!("scenarios[{scenario}].{field}"),
                message,
            },
            EngineError::InvariantViolation(message) => ValidationError::InvalidField {
                field: format!("scenarios[{scenario}]"),
                message,
            },
        }
    }
}
