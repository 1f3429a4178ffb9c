// ============================================================
// Layer 4 — Feature Scaler
// ============================================================
// Per-feature standardisation: x' = (x - mean) / std
//
// The statistics are fitted on the TRAIN partition only and then
// applied unchanged to train, validation and any later inference
// input. The struct exposes no way to refit in place; a new
// scaler means a new value.
//
// std is the population standard deviation (divide by n). A
// feature with zero variance is scaled by 1 so it maps to 0
// instead of NaN.

use serde::{Deserialize, Serialize};

use crate::error::{TuneError, TuneResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std:  Vec<f64>,
}

impl StandardScaler {
    /// Compute per-feature mean and standard deviation.
    pub fn fit(rows: &[Vec<f64>]) -> TuneResult<Self> {
        let width = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| TuneError::InvalidData("cannot fit a scaler on zero rows".into()))?;
        if rows.iter().any(|r| r.len() != width) {
            return Err(TuneError::InvalidData("scaler input rows have inconsistent width".into()));
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; width];
        for row in rows {
            for ((s, v), m) in var.iter_mut().zip(row).zip(&mean) {
                *s += (v - m).powi(2);
            }
        }

        let std = var
            .into_iter()
            .map(|s| {
                let sd = (s / n).sqrt();
                if sd > f64::EPSILON { sd } else { 1.0 }
            })
            .collect();

        Ok(Self { mean, std })
    }

    /// Standardise rows with the fitted statistics.
    pub fn apply(&self, rows: &[Vec<f64>]) -> TuneResult<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.apply_row(row)).collect()
    }

    pub fn apply_row(&self, row: &[f64]) -> TuneResult<Vec<f64>> {
        if row.len() != self.mean.len() {
            return Err(TuneError::InvalidData(format!(
                "scaler fitted on {} features, got a row with {}",
                self.mean.len(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }

    pub fn feature_dim(&self) -> usize {
        self.mean.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_statistics() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let s = StandardScaler::fit(&rows).unwrap();
        assert_eq!(s.mean(), &[2.0, 10.0]);
        // population std of [1, 3] is 1; constant column falls back to 1
        assert_eq!(s.std(), &[1.0, 1.0]);
        assert_eq!(s.apply_row(&[3.0, 10.0]).unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_validation_rows_use_train_statistics() {
        let train = vec![vec![0.0], vec![2.0]];
        let s = StandardScaler::fit(&train).unwrap();
        // mean 1, std 1 → 5 maps to 4 regardless of the validation distribution
        assert_eq!(s.apply(&[vec![5.0]]).unwrap(), vec![vec![4.0]]);
    }

    #[test]
    fn test_width_mismatch() {
        let s = StandardScaler::fit(&[vec![1.0, 2.0]]).unwrap();
        assert!(matches!(s.apply_row(&[1.0]), Err(TuneError::InvalidData(_))));
    }

    #[test]
    fn test_empty_fit_fails() {
        assert!(StandardScaler::fit(&[]).is_err());
    }

    proptest! {
        #[test]
        fn prop_fitted_partition_is_standardised(
            rows in prop::collection::vec(prop::collection::vec(-1.0e3f64..1.0e3, 7), 2..60)
        ) {
            let s = StandardScaler::fit(&rows).unwrap();
            let z = s.apply(&rows).unwrap();
            let n = z.len() as f64;
            for j in 0..7 {
                let mean = z.iter().map(|r| r[j]).sum::<f64>() / n;
                let var  = z.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n;
                prop_assert!(mean.abs() < 1e-9);
                // constant columns standardise to all zeros
                if s.std()[j] != 1.0 || var > 1e-12 {
                    prop_assert!((var - 1.0).abs() < 1e-6);
                }
            }
        }
    }
}
