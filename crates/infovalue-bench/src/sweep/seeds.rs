use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Deterministic per-scenario seeds drawn from the sweep's master seed.
///
/// Seeds are taken in scenario order, so appending a scenario never changes the seeds of
/// the ones before it.
pub struct ScenarioSeeds {
    seeds: Vec<u64>,
}

impl ScenarioSeeds {
    pub fn new(master_seed: u64, count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(master_seed);
        let seeds = (0..count).map(|_| rng.next_u64()).collect();
        Self { seeds }
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.seeds
    }
}
