// ============================================================
// Search — Tree-structured Parzen Estimator
// ============================================================
// Until `n_startup` trials have completed, proposals are plain
// random draws. After that, completed trials are sorted by
// fitness and split at the `gamma` quantile:
//
//   good = best ceil(gamma · n)      → density l(x)
//   bad  = the rest                   → density g(x)
//
// Each parameter is then drawn independently to maximise
// l(x) / g(x):
//
//   real ranges    → 24 candidates drawn from a Gaussian KDE
//                    over the good values, best ratio wins
//   integer ranges → Laplace-smoothed counts, sampled in
//                    proportion to l / g
//
// Failed trials never count as evidence; they are neither good
// nor bad.
//
// Reference: Bergstra et al. (2011), "Algorithms for
//            Hyper-Parameter Optimization"

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::hyperparams::{HyperparameterConfiguration, ParamValue};
use crate::domain::trial::Trial;
use crate::error::TuneResult;
use crate::search::sampler::ConfigurationSampler;
use crate::search::space::{ParameterDomain, SearchSpace};

const N_CANDIDATES: usize = 24;

pub struct TpeSampler {
    rng:           StdRng,
    gamma:         f64,
    n_startup:     usize,
    kde_bandwidth: f64,
}

impl TpeSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng:           StdRng::seed_from_u64(seed),
            gamma:         0.25,
            n_startup:     10,
            kde_bandwidth: 1.0,
        }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma.clamp(0.01, 0.99);
        self
    }

    pub fn with_startup(mut self, n: usize) -> Self {
        self.n_startup = n.max(1);
        self
    }

    fn sample_parameter(
        &mut self,
        name:   &str,
        domain: &ParameterDomain,
        good:   &[&Trial],
        bad:    &[&Trial],
    ) -> ParamValue {
        match *domain {
            ParameterDomain::FloatRange { low, high, log_scale } => {
                let warp = |v: f64| if log_scale { v.max(f64::MIN_POSITIVE).ln() } else { v };
                let good_vals: Vec<f64> = good.iter().filter_map(|t| t.config.get(name)).map(|v| warp(v.as_float())).collect();
                let bad_vals:  Vec<f64> = bad.iter().filter_map(|t| t.config.get(name)).map(|v| warp(v.as_float())).collect();

                let value = ratio_sample_real(&good_vals, &bad_vals, warp(low), warp(high), self.kde_bandwidth, &mut self.rng);
                let value = if log_scale { value.exp() } else { value };
                ParamValue::Float(value.clamp(low, high))
            }
            ParameterDomain::IntRange { low, high } => {
                let good_vals: Vec<i64> = good.iter().filter_map(|t| t.config.get(name)?.as_int()).collect();
                let bad_vals:  Vec<i64> = bad.iter().filter_map(|t| t.config.get(name)?.as_int()).collect();
                ParamValue::Int(ratio_sample_int(&good_vals, &bad_vals, low, high, &mut self.rng))
            }
        }
    }
}

impl ConfigurationSampler for TpeSampler {
    fn propose(&mut self, space: &SearchSpace, history: &[Trial]) -> TuneResult<HyperparameterConfiguration> {
        space.validate()?;

        let mut completed: Vec<&Trial> = history
            .iter()
            .filter(|t| t.is_completed() && t.ranking_fitness().is_finite())
            .collect();

        if completed.len() < self.n_startup || completed.len() < 2 {
            return Ok(space.sample_random(&mut self.rng));
        }

        completed.sort_by(|a, b| a.cmp_fitness(b));
        let n_good = ((completed.len() as f64) * self.gamma).ceil() as usize;
        let n_good = n_good.clamp(1, completed.len() - 1);
        let (good, bad) = completed.split_at(n_good);

        let params = space
            .iter()
            .map(|(name, domain)| (name.clone(), self.sample_parameter(name, domain, good, bad)))
            .collect();
        Ok(HyperparameterConfiguration::new(params))
    }

    fn name(&self) -> &'static str {
        "tpe"
    }
}

// ─── Density-ratio draws ──────────────────────────────────────────────────────

fn kde_score(x: f64, values: &[f64], bandwidth: f64) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    values
        .iter()
        .map(|&v| (-(x - v).powi(2) / (2.0 * bandwidth.powi(2))).exp())
        .sum::<f64>()
        / values.len() as f64
}

fn ratio_sample_real<R: Rng>(good: &[f64], bad: &[f64], low: f64, high: f64, kde_bw: f64, rng: &mut R) -> f64 {
    if good.is_empty() || high <= low {
        return if high <= low { low } else { rng.gen_range(low..=high) };
    }
    let bandwidth = kde_bw * (high - low) / 10.0;

    let mut best       = low;
    let mut best_ratio = f64::NEG_INFINITY;
    for _ in 0..N_CANDIDATES {
        let base = good[rng.gen_range(0..good.len())];
        // Box-Muller
        let u1: f64 = rng.gen::<f64>().max(1e-10);
        let u2: f64 = rng.gen();
        let noise = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos() * bandwidth;
        let candidate = (base + noise).clamp(low, high);

        let ratio = kde_score(candidate, good, bandwidth) / (kde_score(candidate, bad, bandwidth) + 1e-10);
        if ratio > best_ratio {
            best_ratio = ratio;
            best       = candidate;
        }
    }
    best
}

fn ratio_sample_int<R: Rng>(good: &[i64], bad: &[i64], low: i64, high: i64, rng: &mut R) -> i64 {
    if good.is_empty() {
        return rng.gen_range(low..=high);
    }
    let range = (high - low + 1) as usize;
    let mut good_counts = vec![1.0f64; range];
    let mut bad_counts  = vec![1.0f64; range];
    for &v in good.iter().filter(|v| (low..=high).contains(*v)) {
        good_counts[(v - low) as usize] += 1.0;
    }
    for &v in bad.iter().filter(|v| (low..=high).contains(*v)) {
        bad_counts[(v - low) as usize] += 1.0;
    }

    let weights: Vec<f64> = good_counts.iter().zip(&bad_counts).map(|(l, g)| l / g).collect();
    let total: f64 = weights.iter().sum();

    let r = rng.gen::<f64>() * total;
    let mut cumsum = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumsum += w;
        if r < cumsum {
            return low + i as i64;
        }
    }
    high
}
