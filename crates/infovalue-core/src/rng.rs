//! Randomness seam shared by every stochastic step of the engine.

use rand::Rng;

/// Source of every random draw the simulation makes.
///
/// Any [`rand::Rng`] qualifies, so `StdRng` drives experiments and
/// `rand::rngs::mock::StepRng` pins exact outcomes in tests.
pub trait RandomSource: Rng {
    /// Uniform float in `[0, 1)`.
    fn next_unit(&mut self) -> f64 {
        self.r#gen::<f64>()
    }

    /// Uniform index in `[0, upper)`. `upper` must be non-zero.
    fn next_index(&mut self, upper: usize) -> usize {
        debug_assert!(upper > 0, "next_index requires a non-empty range");
        self.gen_range(0..upper)
    }
}

impl<R: Rng + ?Sized> RandomSource for R {}


#[cfg(test)]
mod tests {
    use super::testing::unit_steps;
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    #[test]
    fn unit_steps_replay_requested_draws() {
        let mut rng = unit_steps(0.125, 0.25);
        assert_eq!(rng.next_unit(), 0.125);
        assert_eq!(rng.next_unit(), 0.375);
        assert_eq!(rng.next_unit(), 0.625);
    }

    #[test]
    fn zero_source_always_picks_first_index() {
        let mut rng = StepRng::new(0, 0);
        for upper in 1..20 {
            assert_eq!(rng.next_index(upper), 0);
        }
        assert_eq!(rng.next_unit(), 0.0);
    }

    #[test]
    fn seeded_rng_indices_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for upper in 1..50 {
            assert!(rng.next_index(upper) < upper);
            let u = rng.next_unit();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
