// ============================================================
// Layer 3 — Loss History
// ============================================================
// The per-epoch output of one fit call. Epoch numbers start at
// 1 and are contiguous; `best_epoch` points at the epoch whose
// parameters the fit loop restored.

use serde::{Deserialize, Serialize};

/// One row of the training curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch:         usize,
    pub train_loss:    f64,
    pub val_loss:      f64,
    /// Learning rate in effect while this epoch trained
    pub learning_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LossHistory {
    pub epochs:        Vec<EpochRecord>,
    pub best_epoch:    usize,
    pub stopped_early: bool,
}

impl LossHistory {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Minimum validation loss across all epochs. NaN never wins the comparison.
    pub fn min_val_loss(&self) -> Option<f64> {
        self.epochs
            .iter()
            .map(|e| e.val_loss)
            .filter(|v| !v.is_nan())
            .min_by(f64::total_cmp)
    }

    /// Validation loss of the restored (best) epoch
    pub fn best_val_loss(&self) -> Option<f64> {
        self.epochs
            .iter()
            .find(|e| e.epoch == self.best_epoch)
            .map(|e| e.val_loss)
    }

    pub fn all_finite(&self) -> bool {
        self.epochs
            .iter()
            .all(|e| e.train_loss.is_finite() && e.val_loss.is_finite())
    }

    pub fn train_losses(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.train_loss).collect()
    }

    pub fn val_losses(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.val_loss).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(vals: &[f64], best_epoch: usize) -> LossHistory {
        LossHistory {
            epochs: vals
                .iter()
                .enumerate()
                .map(|(i, &v)| EpochRecord { epoch: i + 1, train_loss: v, val_loss: v, learning_rate: 0.01 })
                .collect(),
            best_epoch,
            stopped_early: false,
        }
    }

    #[test]
    fn test_min_val_loss_is_not_last() {
        let h = history(&[1.0, 0.4, 0.7, 0.9], 2);
        assert_eq!(h.min_val_loss(), Some(0.4));
        assert_eq!(h.best_val_loss(), Some(0.4));
    }

    #[test]
    fn test_empty_history_has_no_minimum() {
        assert_eq!(LossHistory::default().min_val_loss(), None);
    }

    #[test]
    fn test_all_finite_detects_nan() {
        assert!(history(&[1.0, 0.5], 2).all_finite());
        assert!(!history(&[1.0, f64::NAN], 1).all_finite());
    }
}
