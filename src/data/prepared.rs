// ============================================================
// Layer 4 — Prepared Data
// ============================================================
// The scaled train/validation matrices every trial and the final
// retrain read from. Built once per run:
//
//   Split ──fit scaler on x_train──▶ StandardScaler
//     │                                   │
//     └────────── apply to x_train, x_val ◀┘
//
// Targets are not scaled. Fields are private and only handed out
// as slices, so nothing downstream can refit or mutate them.

use crate::data::scaler::StandardScaler;
use crate::data::splitter::Split;
use crate::domain::dataset::uniform_width;
use crate::error::{TuneError, TuneResult};

#[derive(Debug, Clone)]
pub struct PreparedData {
    x_train: Vec<Vec<f64>>,
    x_val:   Vec<Vec<f64>>,
    y_train: Vec<Vec<f64>>,
    y_val:   Vec<Vec<f64>>,
    scaler:  StandardScaler,
}

impl PreparedData {
    pub fn from_split(split: Split) -> TuneResult<Self> {
        if split.x_train.len() != split.y_train.len() || split.x_val.len() != split.y_val.len() {
            return Err(TuneError::InvalidData(format!(
                "feature/target row counts differ (train {}/{}, validation {}/{})",
                split.x_train.len(), split.y_train.len(), split.x_val.len(), split.y_val.len()
            )));
        }
        let train_dim = uniform_width(&split.y_train, "train target")?;
        let val_dim   = uniform_width(&split.y_val, "validation target")?;
        if train_dim != val_dim {
            return Err(TuneError::InvalidData(format!(
                "train targets have width {train_dim} but validation targets have width {val_dim}"
            )));
        }

        let scaler  = StandardScaler::fit(&split.x_train)?;
        let x_train = scaler.apply(&split.x_train)?;
        let x_val   = scaler.apply(&split.x_val)?;

        Ok(Self {
            x_train,
            x_val,
            y_train: split.y_train,
            y_val:   split.y_val,
            scaler,
        })
    }

    pub fn x_train(&self) -> &[Vec<f64>] {
        &self.x_train
    }

    pub fn x_val(&self) -> &[Vec<f64>] {
        &self.x_val
    }

    pub fn y_train(&self) -> &[Vec<f64>] {
        &self.y_train
    }

    pub fn y_val(&self) -> &[Vec<f64>] {
        &self.y_val
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn feature_dim(&self) -> usize {
        self.scaler.feature_dim()
    }

    pub fn target_dim(&self) -> usize {
        self.y_train.first().map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaler_is_fitted_on_train_only() {
        let split = Split {
            x_train: vec![vec![0.0], vec![2.0]],
            x_val:   vec![vec![100.0]],
            y_train: vec![vec![1.0], vec![1.0]],
            y_val:   vec![vec![1.0]],
        };
        let data = PreparedData::from_split(split).unwrap();
        assert_eq!(data.scaler().mean(), &[1.0]);
        assert_eq!(data.x_val(), &[vec![99.0]]);
        assert_eq!(data.x_train(), &[vec![-1.0], vec![1.0]]);
        assert_eq!(data.target_dim(), 1);
    }

    #[test]
    fn test_ragged_targets_are_rejected() {
        let split = Split {
            x_train: vec![vec![0.0], vec![2.0]],
            x_val:   vec![vec![1.0]],
            y_train: vec![vec![1.0, 2.0], vec![1.0]],
            y_val:   vec![vec![1.0, 2.0]],
        };
        assert!(matches!(PreparedData::from_split(split), Err(TuneError::InvalidData(_))));
    }

    #[test]
    fn test_target_width_must_match_across_partitions() {
        let split = Split {
            x_train: vec![vec![0.0], vec![2.0]],
            x_val:   vec![vec![1.0]],
            y_train: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            y_val:   vec![vec![1.0]],
        };
        assert!(matches!(PreparedData::from_split(split), Err(TuneError::InvalidData(_))));
    }

    #[test]
    fn test_row_count_mismatch_is_rejected() {
        let split = Split {
            x_train: vec![vec![0.0], vec![2.0]],
            x_val:   vec![vec![1.0]],
            y_train: vec![vec![1.0]],
            y_val:   vec![vec![1.0]],
        };
        assert!(matches!(PreparedData::from_split(split), Err(TuneError::InvalidData(_))));
    }
}
