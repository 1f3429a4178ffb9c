// ============================================================
// Search — Objective
// ============================================================
// Reduces one configuration to one number. The objective:
//
//   1. builds a fresh regressor for the configuration
//   2. trains it on the prepared (already scaled) partitions
//   3. returns the minimum validation loss of the history
//
// The minimum, not the last value: with early stopping the
// last `es_patience` epochs are by construction worse than the
// best one.
//
// The prepared data is borrowed for the whole search; the
// scaler inside it is never refitted.

use burn::tensor::backend::AutodiffBackend;

use crate::data::prepared::PreparedData;
use crate::domain::history::LossHistory;
use crate::domain::hyperparams::HyperparameterConfiguration;
use crate::error::{TuneError, TuneResult};
use crate::ml::model::HestonRegressorConfig;
use crate::ml::trainer::{fit, FitOutcome, FitSettings};

/// Fitness plus the curve it was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub fitness: f64,
    pub history: LossHistory,
}

pub trait Objective {
    /// Errors for which `TuneError::is_recoverable_trial_failure` holds
    /// are recorded as a failed trial; anything else ends the search.
    fn evaluate(&mut self, config: &HyperparameterConfiguration) -> TuneResult<Evaluation>;
}

/// Build and fit the regressor described by `config`.
///
/// Shared by the search objective and the final retrain so both
/// construct the model the same way.
pub fn train_configuration<B: AutodiffBackend>(
    config:   &HyperparameterConfiguration,
    data:     &PreparedData,
    settings: &FitSettings,
    device:   &B::Device,
) -> TuneResult<FitOutcome<B::InnerBackend>> {
    let model = HestonRegressorConfig::from_hyperparameters(config, data.feature_dim(), data.target_dim())?
        .init::<B>(device);

    fit(model, data.x_train(), data.y_train(), data.x_val(), data.y_val(), settings, device)
}

/// Minimum validation loss of a fit with the configuration.
pub struct ValidationLossObjective<'a, B: AutodiffBackend> {
    data:     &'a PreparedData,
    settings: FitSettings,
    device:   B::Device,
}

impl<'a, B: AutodiffBackend> ValidationLossObjective<'a, B> {
    pub fn new(data: &'a PreparedData, settings: FitSettings, device: B::Device) -> Self {
        Self { data, settings, device }
    }
}

impl<B: AutodiffBackend> Objective for ValidationLossObjective<'_, B> {
    fn evaluate(&mut self, config: &HyperparameterConfiguration) -> TuneResult<Evaluation> {
        let FitOutcome { history, .. } = train_configuration::<B>(config, self.data, &self.settings, &self.device)?;

        let fitness = history
            .min_val_loss()
            .ok_or_else(|| TuneError::InvalidConfig("fit produced an empty loss history".into()))?;

        Ok(Evaluation { fitness, history })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::splitter::Split;

    type TestBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    fn toy_data() -> PreparedData {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<Vec<f64>> = x.iter().map(|r| vec![0.1 * r[0], 1.0]).collect();
        PreparedData::from_split(Split {
            x_train: x[..24].to_vec(),
            x_val:   x[24..].to_vec(),
            y_train: y[..24].to_vec(),
            y_val:   y[24..].to_vec(),
        })
        .unwrap()
    }

    #[test]
    fn test_fitness_is_minimum_validation_loss() {
        let data = toy_data();
        let settings = FitSettings { max_epochs: 6, batch_size: 8, shuffle_seed: Some(3), ..FitSettings::default() };
        let mut objective = ValidationLossObjective::<TestBackend>::new(&data, settings, Default::default());

        let eval = objective.evaluate(&HyperparameterConfiguration::dense(8, 0.1)).unwrap();

        assert_eq!(Some(eval.fitness), eval.history.min_val_loss());
        assert!(eval.history.val_losses().iter().all(|&v| v >= eval.fitness));
    }

    #[test]
    fn test_missing_parameter_is_not_recoverable() {
        let data = toy_data();
        let mut objective = ValidationLossObjective::<TestBackend>::new(&data, FitSettings::default(), Default::default());

        let err = objective.evaluate(&HyperparameterConfiguration::default()).unwrap_err();

        assert!(matches!(err, TuneError::MissingParameter(_)));
        assert!(!err.is_recoverable_trial_failure());
    }
}
