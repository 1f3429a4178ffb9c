// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch Adam on MSE with two validation-driven controls
// (early stopping, LR reduction on plateau), both tracked by a
// TrainingRun that lives only for the duration of one call.
//
//   - Training uses B (Autodiff<...>) for gradients
//   - model.valid() returns the model on B::InnerBackend with
//     dropout disabled; validation runs there
//   - every strict improvement snapshots model.valid(); the
//     snapshot of the best epoch is what fit returns
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::RegressionBatcher, dataset::RegressionDataset};
use crate::domain::history::LossHistory;
use crate::error::{TuneError, TuneResult};
use crate::ml::model::HestonRegressor;
use crate::ml::training_run::{PlateauPolicy, TrainingRun};

/// Knobs shared by every fit in a run (search trials and the final retrain).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSettings {
    pub max_epochs:    usize,
    pub batch_size:    usize,
    pub learning_rate: f64,
    pub plateau:       PlateauPolicy,
    /// Seed for per-epoch batch shuffling; None draws a fresh one per fit
    pub shuffle_seed:  Option<u64>,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            max_epochs:    100,
            batch_size:    32,
            learning_rate: 0.01,
            plateau:       PlateauPolicy::default(),
            shuffle_seed:  None,
        }
    }
}

impl FitSettings {
    pub fn validate(&self) -> TuneResult<()> {
        if self.max_epochs == 0 {
            return Err(TuneError::InvalidConfig("max_epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(TuneError::InvalidConfig("batch_size must be at least 1".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(TuneError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        self.plateau.validate()
    }
}

/// Result of one fit: the restored best-epoch model and its loss curve.
#[derive(Debug)]
pub struct FitOutcome<B: Backend> {
    pub model:   HestonRegressor<B>,
    pub history: LossHistory,
}

pub fn fit<B: AutodiffBackend>(
    mut model: HestonRegressor<B>,
    x_train:   &[Vec<f64>],
    y_train:   &[Vec<f64>],
    x_val:     &[Vec<f64>],
    y_val:     &[Vec<f64>],
    settings:  &FitSettings,
    device:    &B::Device,
) -> TuneResult<FitOutcome<B::InnerBackend>> {
    settings.validate()?;
    if x_train.is_empty() || x_val.is_empty() {
        return Err(TuneError::InvalidData("train and validation partitions must be non-empty".into()));
    }

    let mut optim = AdamConfig::new().with_epsilon(1e-7).init();

    // ── Training data loader (AutodiffBackend, reshuffled every epoch) ────────
    let seed = settings.shuffle_seed.unwrap_or_else(rand::random);
    let train_loader = DataLoaderBuilder::new(RegressionBatcher::<B>::new(device.clone()))
        .batch_size(settings.batch_size)
        .shuffle(seed)
        .build(RegressionDataset::from_rows(x_train, y_train));

    // ── Validation data loader (InnerBackend, fixed order) ────────────────────
    let val_loader = DataLoaderBuilder::new(RegressionBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(settings.batch_size)
        .build(RegressionDataset::from_rows(x_val, y_val));

    let mut run = TrainingRun::new(settings.plateau, settings.learning_rate);
    let mut best_model: Option<HestonRegressor<B::InnerBackend>> = None;

    for epoch in 1..=settings.max_epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let lr = run.learning_rate();
        let mut train_loss_sum = 0.0f64;
        let mut train_rows     = 0usize;

        for batch in train_loader.iter() {
            let rows = batch.features.dims()[0];
            let loss = model.forward_loss(batch.features, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val * rows as f64;
            train_rows     += rows;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(lr, model, grads);
        }

        let train_loss = train_loss_sum / train_rows.max(1) as f64;

        // ── Validation phase (dropout off) ────────────────────────────────────
        let model_valid = model.valid();
        let mut val_loss_sum = 0.0f64;
        let mut val_rows     = 0usize;

        for batch in val_loader.iter() {
            let rows = batch.features.dims()[0];
            let loss: f64 = model_valid
                .forward_loss(batch.features, batch.targets)
                .into_scalar()
                .elem::<f64>();
            val_loss_sum += loss * rows as f64;
            val_rows     += rows;
        }

        let val_loss = val_loss_sum / val_rows.max(1) as f64;

        if !train_loss.is_finite() || !val_loss.is_finite() {
            tracing::warn!(
                "Non-finite loss at epoch {} (train_loss={}, val_loss={})",
                epoch, train_loss, val_loss
            );
            return Err(TuneError::TrainingDiverged { epoch, train_loss, val_loss });
        }

        let outcome = run.record_epoch(train_loss, val_loss);
        tracing::debug!(
            "Epoch {:>3}/{} | train_loss={:.6} | val_loss={:.6} | lr={:.5}",
            epoch, settings.max_epochs, train_loss, val_loss, lr,
        );

        if outcome.improved {
            best_model = Some(model_valid);
        }
        if let Some(new_lr) = outcome.lr_reduced {
            tracing::warn!("Validation loss plateaued: learning rate {:.5} → {:.5}", lr, new_lr);
        }
        if outcome.stop {
            tracing::debug!(
                "Early stopping at epoch {}; restoring epoch {} (val_loss={:.6})",
                epoch, run.best_epoch(), run.best_val_loss()
            );
            break;
        }
    }

    let history = run.into_history();
    let model = best_model.ok_or_else(|| {
        TuneError::InvalidConfig("fit finished without recording an epoch".into())
    })?;

    Ok(FitOutcome { model, history })
}
