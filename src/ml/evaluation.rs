// ============================================================
// Layer 5 — Regression Metrics
// ============================================================
// Hold-out scores for the final model, computed over N rows of
// K outputs:
//
//   MSE  mean of (y - ŷ)² over all N·K elements
//   MAE  mean of |y - ŷ| over all N·K elements
//   R²   1 - SS_res / SS_tot per output, averaged over K
//
// An output whose targets have zero variance (e.g. the constant
// placeholder vector) gets R² = 1.0 when predicted exactly and
// 0.0 otherwise, so the score stays finite.

use serde::{Deserialize, Serialize};

use crate::error::{TuneError, TuneResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub r2:  f64,
    pub mae: f64,
}

impl RegressionMetrics {
    pub fn all_finite(&self) -> bool {
        self.mse.is_finite() && self.r2.is_finite() && self.mae.is_finite()
    }
}

pub fn evaluate(actual: &[Vec<f64>], predicted: &[Vec<f64>]) -> TuneResult<RegressionMetrics> {
    if actual.is_empty() {
        return Err(TuneError::InvalidData("cannot score an empty set".into()));
    }
    if actual.len() != predicted.len() {
        return Err(TuneError::InvalidData(format!(
            "{} targets but {} predictions",
            actual.len(),
            predicted.len()
        )));
    }
    let k = actual[0].len();
    if actual.iter().chain(predicted).any(|r| r.len() != k) {
        return Err(TuneError::InvalidData("target and prediction widths differ".into()));
    }

    let n = actual.len() as f64;
    let mut sq_err  = vec![0.0; k];
    let mut abs_err = 0.0;
    let mut mean    = vec![0.0; k];

    for (y, p) in actual.iter().zip(predicted) {
        for j in 0..k {
            let d = y[j] - p[j];
            sq_err[j] += d * d;
            abs_err   += d.abs();
            mean[j]   += y[j];
        }
    }
    mean.iter_mut().for_each(|m| *m /= n);

    let mut ss_tot = vec![0.0; k];
    for y in actual {
        for j in 0..k {
            ss_tot[j] += (y[j] - mean[j]).powi(2);
        }
    }

    let r2_per_output: Vec<f64> = sq_err
        .iter()
        .zip(&ss_tot)
        .map(|(&res, &tot)| {
            if tot > 0.0 {
                1.0 - res / tot
            } else if res == 0.0 {
                1.0
            } else {
                0.0
            }
        })
        .collect();

    let total = n * k as f64;
    Ok(RegressionMetrics {
        mse: sq_err.iter().sum::<f64>() / total,
        r2:  r2_per_output.iter().sum::<f64>() / k as f64,
        mae: abs_err / total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        let y = vec![vec![1.0, 2.0], vec![3.0, 5.0]];
        let m = evaluate(&y, &y).unwrap();
        assert_eq!(m.mse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_known_values() {
        let y = vec![vec![1.0], vec![2.0], vec![3.0]];
        let p = vec![vec![1.0], vec![2.0], vec![4.0]];
        let m = evaluate(&y, &p).unwrap();
        assert!((m.mse - 1.0 / 3.0).abs() < 1e-12);
        assert!((m.mae - 1.0 / 3.0).abs() < 1e-12);
        // SS_res = 1, SS_tot = 2
        assert!((m.r2 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_constant_targets_stay_finite() {
        let y = vec![vec![2.0, 0.01]; 4];
        let p = vec![vec![1.9, 0.01]; 4];
        let m = evaluate(&y, &p).unwrap();
        assert!(m.all_finite());
        // first output imperfect → 0, second exact → 1
        assert!((m.r2 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(evaluate(&[vec![1.0]], &[]).is_err());
        assert!(evaluate(&[], &[]).is_err());
    }
}
