// ============================================================
// Search — Configuration Samplers
// ============================================================
// A sampler proposes the next configuration given every trial
// recorded so far. The controller owns the trial log and only
// lends it out read-only, so a sampler never sees a trial that
// has not finished.
//
//   RandomSampler → independent uniform draws (seeded)
//   TpeSampler    → tpe.rs, fitness-informed after a warm-up

use rand::{rngs::StdRng, SeedableRng};

use crate::domain::hyperparams::HyperparameterConfiguration;
use crate::domain::trial::Trial;
use crate::error::TuneResult;
use crate::search::space::SearchSpace;

pub trait ConfigurationSampler {
    fn propose(&mut self, space: &SearchSpace, history: &[Trial]) -> TuneResult<HyperparameterConfiguration>;

    fn name(&self) -> &'static str;
}

// ─── RandomSampler ────────────────────────────────────────────────────────────
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl ConfigurationSampler for RandomSampler {
    fn propose(&mut self, space: &SearchSpace, _history: &[Trial]) -> TuneResult<HyperparameterConfiguration> {
        space.validate()?;
        Ok(space.sample_random(&mut self.rng))
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_proposals() {
        let space = SearchSpace::heston_default();
        let mut a = RandomSampler::new(5);
        let mut b = RandomSampler::new(5);
        for _ in 0..10 {
            assert_eq!(a.propose(&space, &[]).unwrap(), b.propose(&space, &[]).unwrap());
        }
    }

    #[test]
    fn test_empty_space_is_rejected() {
        let mut s = RandomSampler::new(0);
        assert!(s.propose(&SearchSpace::new(), &[]).is_err());
    }
}
