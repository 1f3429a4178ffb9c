// ============================================================
// Layer 2 — FinalTrainer
// ============================================================
// Retrains the winning configuration once, the same way the
// search objective trained it, and scores the result on the
// validation partition.
//
// The retrain is an independent run: a different
// initialisation and batch order mean its losses will not
// match the search trial's exactly. Any failure here is
// returned to the caller; there is no fallback configuration.

use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;

use crate::data::prepared::PreparedData;
use crate::domain::history::LossHistory;
use crate::domain::hyperparams::HyperparameterConfiguration;
use crate::error::TuneResult;
use crate::ml::evaluation::{evaluate, RegressionMetrics};
use crate::ml::inferencer::predict_rows;
use crate::ml::model::{HestonRegressor, HestonRegressorConfig};
use crate::ml::trainer::{FitOutcome, FitSettings};
use crate::search::objective::train_configuration;

/// The retrained model with everything needed to persist and report it.
#[derive(Debug)]
pub struct FinalModel<B: Backend> {
    pub model:        HestonRegressor<B>,
    pub model_config: HestonRegressorConfig,
    pub metrics:      RegressionMetrics,
    pub history:      LossHistory,
}

pub fn finalize<B: AutodiffBackend>(
    best_config: &HyperparameterConfiguration,
    data:        &PreparedData,
    settings:    &FitSettings,
    device:      &B::Device,
) -> TuneResult<FinalModel<B::InnerBackend>> {
    tracing::info!("Retraining best configuration {}", best_config);

    let model_config = HestonRegressorConfig::from_hyperparameters(best_config, data.feature_dim(), data.target_dim())?;
    let FitOutcome { model, history } = train_configuration::<B>(best_config, data, settings, device)?;

    let predictions = predict_rows(&model, data.x_val(), device)?;
    let metrics     = evaluate(data.y_val(), &predictions)?;

    tracing::info!(
        "Final model: {} epochs (best {}), MSE={:.6}, R^2={:.4}, MAE={:.6}",
        history.len(), history.best_epoch, metrics.mse, metrics.r2, metrics.mae,
    );

    Ok(FinalModel { model, model_config, metrics, history })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::splitter::Split;
    use crate::error::TuneError;

    type TestBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    fn data() -> PreparedData {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64 * 0.1, ((i * 7) % 5) as f64]).collect();
        let y: Vec<Vec<f64>> = x.iter().map(|r| vec![r[0] - r[1], 0.5 * r[1]]).collect();
        PreparedData::from_split(Split {
            x_train: x[..32].to_vec(),
            x_val:   x[32..].to_vec(),
            y_train: y[..32].to_vec(),
            y_val:   y[32..].to_vec(),
        })
        .unwrap()
    }

    #[test]
    fn test_finalize_reports_finite_metrics() {
        let data     = data();
        let settings = FitSettings { max_epochs: 5, batch_size: 8, shuffle_seed: Some(2), ..FitSettings::default() };

        let out = finalize::<TestBackend>(&HyperparameterConfiguration::dense(16, 0.2), &data, &settings, &Default::default())
            .unwrap();

        assert!(out.metrics.all_finite());
        assert_eq!(out.model_config.hidden_width, 16);
        assert_eq!(out.model_config.output_dim, 2);
        assert!(!out.history.is_empty());
    }

    #[test]
    fn test_invalid_best_config_is_fatal() {
        let data = data();
        let err  = finalize::<TestBackend>(
            &HyperparameterConfiguration::dense(16, 1.5),
            &data,
            &FitSettings::default(),
            &Default::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TuneError::InvalidConfig(_)));
    }
}
