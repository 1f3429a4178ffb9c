// ============================================================
// Layer 5 — Training Run State
// ============================================================
// Per-fit bookkeeping for the two validation-driven controls:
//
//   early stopping   stop once `es_patience` consecutive epochs
//                    fail to strictly improve on the best val loss
//   LR reduction     after `lr_patience` stalled epochs multiply the
//                    learning rate by `lr_factor`, never going
//                    below `min_lr`, then restart that counter
//
// A strict improvement resets both counters. The two counters are
// otherwise independent: an LR reduction does not touch the
// early-stopping counter.
//
// A TrainingRun is created at the start of one fit call and
// dropped when it returns. Nothing here touches tensors, so the
// schedule is testable with synthetic loss sequences.

use serde::{Deserialize, Serialize};

use crate::domain::history::{EpochRecord, LossHistory};
use crate::error::{TuneError, TuneResult};

/// Patience and decay knobs for one fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateauPolicy {
    pub es_patience: usize,
    pub lr_patience: usize,
    pub lr_factor:   f64,
    pub min_lr:      f64,
}

impl Default for PlateauPolicy {
    fn default() -> Self {
        Self {
            es_patience: 10,
            lr_patience: 5,
            lr_factor:   0.2,
            min_lr:      0.001,
        }
    }
}

impl PlateauPolicy {
    pub fn validate(&self) -> TuneResult<()> {
        if self.es_patience == 0 || self.lr_patience == 0 {
            return Err(TuneError::InvalidConfig("patience values must be at least 1".into()));
        }
        if !(self.lr_factor > 0.0 && self.lr_factor < 1.0) {
            return Err(TuneError::InvalidConfig(format!(
                "lr_factor must lie strictly between 0 and 1, got {}",
                self.lr_factor
            )));
        }
        if !(self.min_lr >= 0.0) {
            return Err(TuneError::InvalidConfig(format!("min_lr must be non-negative, got {}", self.min_lr)));
        }
        Ok(())
    }
}

/// What the fit loop should do after recording an epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochOutcome {
    /// Validation loss strictly improved; snapshot the parameters
    pub improved:   bool,
    /// Learning rate after this epoch's check, if it changed
    pub lr_reduced: Option<f64>,
    /// Early stopping fired; halt and restore the best snapshot
    pub stop:       bool,
}

#[derive(Debug, Clone)]
pub struct TrainingRun {
    policy:        PlateauPolicy,
    epoch:         usize,
    learning_rate: f64,
    best_val_loss: f64,
    best_epoch:    usize,
    es_stall:      usize,
    lr_stall:      usize,
    stopped_early: bool,
    records:       Vec<EpochRecord>,
}

impl TrainingRun {
    pub fn new(policy: PlateauPolicy, initial_lr: f64) -> Self {
        Self {
            policy,
            epoch:         0,
            learning_rate: initial_lr,
            best_val_loss: f64::INFINITY,
            best_epoch:    0,
            es_stall:      0,
            lr_stall:      0,
            stopped_early: false,
            records:       Vec::new(),
        }
    }

    /// Learning rate to use for the next epoch
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn best_val_loss(&self) -> f64 {
        self.best_val_loss
    }

    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }

    pub fn epochs_since_improvement(&self) -> usize {
        self.es_stall
    }

    /// Record one finished epoch and decide what happens next.
    pub fn record_epoch(&mut self, train_loss: f64, val_loss: f64) -> EpochOutcome {
        self.epoch += 1;
        self.records.push(EpochRecord {
            epoch: self.epoch,
            train_loss,
            val_loss,
            learning_rate: self.learning_rate,
        });

        let improved = val_loss < self.best_val_loss;
        let mut lr_reduced = None;

        if improved {
            self.best_val_loss = val_loss;
            self.best_epoch    = self.epoch;
            self.es_stall      = 0;
            self.lr_stall      = 0;
        } else {
            self.es_stall += 1;
            self.lr_stall += 1;

            if self.lr_stall >= self.policy.lr_patience {
                if self.learning_rate > self.policy.min_lr {
                    let next = (self.learning_rate * self.policy.lr_factor).max(self.policy.min_lr);
                    self.learning_rate = next;
                    lr_reduced = Some(next);
                }
                self.lr_stall = 0;
            }
        }

        let stop = self.es_stall >= self.policy.es_patience;
        if stop {
            self.stopped_early = true;
        }

        EpochOutcome { improved, lr_reduced, stop }
    }

    /// Consume the run and hand back the loss curve.
    pub fn into_history(self) -> LossHistory {
        LossHistory {
            epochs:        self.records,
            best_epoch:    self.best_epoch,
            stopped_early: self.stopped_early,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn run() -> TrainingRun {
        TrainingRun::new(PlateauPolicy::default(), 0.01)
    }

    #[test]
    fn test_nine_stalls_do_not_stop_but_ten_do() {
        let mut r = run();
        assert!(!r.record_epoch(1.0, 1.0).stop);
        assert!(!r.record_epoch(0.9, 0.9).stop);

        // 9 consecutive non-improving epochs
        for i in 0..9 {
            let v = 0.95 + 0.01 * i as f64;
            assert!(!r.record_epoch(v, v).stop, "stopped too early at stall {}", i + 1);
        }
        assert_eq!(r.epochs_since_improvement(), 9);

        // the 10th stalled epoch triggers
        let outcome = r.record_epoch(1.1, 1.1);
        assert!(outcome.stop);
        assert_eq!(r.best_epoch(), 2);
        assert_eq!(r.epoch(), 12);
    }

    #[test]
    fn test_equal_loss_is_not_an_improvement() {
        let mut r = run();
        r.record_epoch(0.5, 0.5);
        let outcome = r.record_epoch(0.5, 0.5);
        assert!(!outcome.improved);
        assert_eq!(r.epochs_since_improvement(), 1);
    }

    #[test]
    fn test_improvement_resets_both_counters() {
        let mut r = run();
        r.record_epoch(1.0, 1.0);
        for _ in 0..4 {
            r.record_epoch(1.0, 1.0);
        }
        // stall 4 of 5; an improvement now must prevent the LR cut next epoch
        assert!(r.record_epoch(0.5, 0.5).improved);
        let outcome = r.record_epoch(0.6, 0.6);
        assert_eq!(outcome.lr_reduced, None);
        assert_eq!(r.epochs_since_improvement(), 1);
        assert_eq!(r.learning_rate(), 0.01);
    }

    #[test]
    fn test_lr_reduces_every_patience_window_and_clamps_to_floor() {
        let policy = PlateauPolicy { es_patience: 100, ..PlateauPolicy::default() };
        let mut r  = TrainingRun::new(policy, 0.01);
        r.record_epoch(1.0, 1.0);

        let mut cuts = Vec::new();
        for _ in 0..25 {
            if let Some(lr) = r.record_epoch(1.0, 1.0).lr_reduced {
                cuts.push(lr);
            }
        }

        // 0.01 → 0.002 → max(0.0004, 0.001) = 0.001, then no further change
        assert_eq!(cuts.len(), 2);
        assert!((cuts[0] - 0.002).abs() < 1e-15);
        assert_eq!(cuts[1], 0.001);
        assert_eq!(r.learning_rate(), 0.001);
    }

    #[test]
    fn test_lr_reduction_does_not_reset_early_stopping() {
        let mut r = run();
        r.record_epoch(1.0, 1.0);
        for _ in 0..5 {
            r.record_epoch(1.0, 1.0);
        }
        assert!((r.learning_rate() - 0.002).abs() < 1e-15);
        assert_eq!(r.epochs_since_improvement(), 5);
    }

    #[test]
    fn test_history_records_lr_in_effect() {
        let mut r = run();
        r.record_epoch(1.0, 1.0);
        for _ in 0..6 {
            r.record_epoch(1.0, 1.0);
        }
        let h = r.into_history();
        assert_eq!(h.len(), 7);
        // epoch 6 triggered the cut, so epoch 7 trained at the reduced rate
        assert_eq!(h.epochs[5].learning_rate, 0.01);
        assert!((h.epochs[6].learning_rate - 0.002).abs() < 1e-15);
        assert_eq!(h.best_epoch, 1);
        assert!(!h.stopped_early);
    }

    #[test]
    fn test_best_epoch_loss_bounds_later_epochs() {
        let vals = [0.9, 0.7, 0.8, 0.65, 0.66, 0.7, 0.9, 0.68, 0.67, 0.7, 0.75, 0.8, 0.81, 0.82];
        let mut r = run();
        for v in vals {
            if r.record_epoch(v, v).stop {
                break;
            }
        }
        let h = r.into_history();
        let best = h.best_val_loss().unwrap();
        assert_eq!(best, 0.65);
        assert!(h.epochs.iter().filter(|e| e.epoch > h.best_epoch).all(|e| e.val_loss >= best));
        assert!(h.stopped_early);
    }

    #[test]
    fn test_policy_validation() {
        assert!(PlateauPolicy::default().validate().is_ok());
        let bad = PlateauPolicy { lr_factor: 1.5, ..PlateauPolicy::default() };
        assert!(bad.validate().is_err());
        let bad = PlateauPolicy { es_patience: 0, ..PlateauPolicy::default() };
        assert!(bad.validate().is_err());
    }
}
