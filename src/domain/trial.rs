// ============================================================
// Layer 3 — Trial
// ============================================================
// One evaluation of one sampled configuration. Trials are
// append-only records owned by the search controller; they are
// constructed complete and never mutated afterwards.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::history::LossHistory;
use crate::domain::hyperparams::HyperparameterConfiguration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    Completed,
    /// Training diverged; fitness is undefined and ranks below every finite value
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Zero-based position in the trial log
    pub id:      usize,
    pub config:  HyperparameterConfiguration,
    pub status:  TrialStatus,
    /// Minimum validation loss; None when the trial failed
    pub fitness: Option<f64>,
    pub history: Option<LossHistory>,
    /// Failure description for failed trials
    pub error:   Option<String>,
}

impl Trial {
    pub fn completed(
        id:      usize,
        config:  HyperparameterConfiguration,
        fitness: f64,
        history: LossHistory,
    ) -> Self {
        Self {
            id,
            config,
            status:  TrialStatus::Completed,
            fitness: Some(fitness),
            history: Some(history),
            error:   None,
        }
    }

    pub fn failed(id: usize, config: HyperparameterConfiguration, error: impl Into<String>) -> Self {
        Self {
            id,
            config,
            status:  TrialStatus::Failed,
            fitness: None,
            history: None,
            error:   Some(error.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TrialStatus::Completed
    }

    /// Fitness used for ranking: failed or non-finite trials become +∞.
    pub fn ranking_fitness(&self) -> f64 {
        match self.fitness {
            Some(f) if f.is_finite() => f,
            _ => f64::INFINITY,
        }
    }

    /// Total order on ranking fitness (lower is better)
    pub fn cmp_fitness(&self, other: &Trial) -> Ordering {
        self.ranking_fitness().total_cmp(&other.ranking_fitness())
    }

    pub fn epochs_run(&self) -> usize {
        self.history.as_ref().map(LossHistory::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> HyperparameterConfiguration {
        HyperparameterConfiguration::dense(64, 0.1)
    }

    #[test]
    fn test_failed_trial_ranks_last() {
        let good   = Trial::completed(0, cfg(), 0.5, LossHistory::default());
        let failed = Trial::failed(1, cfg(), "diverged");
        assert_eq!(good.cmp_fitness(&failed), Ordering::Less);
        assert_eq!(failed.ranking_fitness(), f64::INFINITY);
    }

    #[test]
    fn test_nan_fitness_ranks_like_failure() {
        let nan = Trial::completed(0, cfg(), f64::NAN, LossHistory::default());
        assert_eq!(nan.ranking_fitness(), f64::INFINITY);
    }
}
