// ============================================================
// Layer 3 — Heston Parameter Vector
// ============================================================
// The regression target: the five parameters of the Heston
// stochastic-volatility model.
//
//   kappa  mean-reversion speed of the variance
//   theta  long-run variance
//   sigma  volatility of variance
//   rho    correlation between asset and variance shocks
//   v0     initial variance
//
// Vector order is always [kappa, theta, sigma, rho, v0].

use serde::{Deserialize, Serialize};

/// Number of regression outputs (K).
pub const TARGET_DIM: usize = 5;

pub const TARGET_COLUMNS: [&str; TARGET_DIM] = ["kappa", "theta", "sigma", "rho", "v0"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HestonParams {
    pub kappa: f64,
    pub theta: f64,
    pub sigma: f64,
    pub rho:   f64,
    pub v0:    f64,
}

impl HestonParams {
    /// The constant stand-in used when no calibration source is available.
    pub const PLACEHOLDER: HestonParams = HestonParams {
        kappa: 2.0,
        theta: 0.01,
        sigma: 0.1,
        rho:   -0.5,
        v0:    0.01,
    };

    pub fn to_array(&self) -> [f64; TARGET_DIM] {
        [self.kappa, self.theta, self.sigma, self.rho, self.v0]
    }

    /// Rebuild from a model output row. Returns None on a length mismatch.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [kappa, theta, sigma, rho, v0] => Some(Self {
                kappa: *kappa,
                theta: *theta,
                sigma: *sigma,
                rho:   *rho,
                v0:    *v0,
            }),
            _ => None,
        }
    }

    /// Feller condition 2·kappa·theta > sigma². Reported alongside predictions;
    /// violating it is legal but means the variance process can touch zero.
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.kappa * self.theta > self.sigma * self.sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_round_trip() {
        let p = HestonParams::PLACEHOLDER;
        assert_eq!(HestonParams::from_slice(&p.to_array()), Some(p));
    }

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        assert!(HestonParams::from_slice(&[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_placeholder_satisfies_feller() {
        // 2 * 2.0 * 0.01 = 0.04 > 0.01
        assert!(HestonParams::PLACEHOLDER.satisfies_feller());
    }
}
