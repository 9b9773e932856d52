#![deny(warnings)]
pub mod engine;
pub mod error;
pub mod model;
pub mod rng;

pub use engine::{
    ExperimentResult, ModelParameters, ModelVariant, run_experiment, run_experiment_with_seed,
};
pub use error::EngineError;
pub use rng::RandomSource;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "infovalue"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "infovalue");
        assert!(!AppInfo::version().is_empty());
    }
}
