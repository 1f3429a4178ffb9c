// ============================================================
// Layer 2 — TuneUseCase
// ============================================================
// Orchestrates one tuning run in order:
//
//   Step 1: Load option quotes           (Layer 4 - data)
//   Step 2: Attach Heston targets        (Layer 4 - data)
//   Step 3: Split + fit the scaler       (Layer 4 - data)
//   Step 4: Save config and scaler       (Layer 6 - infra)
//   Step 5: Hyperparameter search        (search → Layer 5 - ml)
//   Step 6: Save the trial log           (Layer 6 - infra)
//   Step 7: Retrain the best config      (FinalTrainer)
//   Step 8: Save model, manifest, curve  (Layer 6 - infra)
//
// The scaler is fitted exactly once in step 3 and only read
// afterwards.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::application::final_trainer::finalize;
use crate::data::{
    loader::CsvQuoteLoader,
    prepared::PreparedData,
    splitter::prepare,
    targets::{CalibratedTargets, PlaceholderTargets},
};
use crate::domain::dataset::Dataset;
use crate::domain::history::LossHistory;
use crate::domain::traits::{QuoteSource, TargetSource};
use crate::domain::trial::Trial;
use crate::error::TuneError;
use crate::infra::{
    checkpoint::{ArtifactStore, ModelManifest},
    metrics::MetricsLogger,
};
use crate::ml::evaluation::RegressionMetrics;
use crate::ml::trainer::FitSettings;
use crate::ml::training_run::PlateauPolicy;
use crate::search::{
    controller::{CancelHandle, SearchBudget, SearchController, StopReason},
    objective::ValidationLossObjective,
    sampler::{ConfigurationSampler, RandomSampler},
    space::SearchSpace,
    tpe::TpeSampler,
};

type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;

pub const CONFIG_FILE: &str = "tune_config.json";

// ─── Sampler choice ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplerKind {
    Tpe,
    Random,
}

impl SamplerKind {
    fn build(self, seed: u64) -> Box<dyn ConfigurationSampler> {
        match self {
            SamplerKind::Tpe    => Box::new(TpeSampler::new(seed)),
            SamplerKind::Random => Box::new(RandomSampler::new(seed)),
        }
    }
}

impl FromStr for SamplerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tpe"    => Ok(SamplerKind::Tpe),
            "random" => Ok(SamplerKind::Random),
            other    => Err(format!("unknown sampler '{other}' (expected 'tpe' or 'random')")),
        }
    }
}

// ─── Tuning Configuration ─────────────────────────────────────────────────────
// Everything a run needs. Saved next to the artifacts so a run
// can be reproduced from its own output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuneConfig {
    pub data_path:           String,
    /// Calibrated kappa,theta,sigma,rho,v0 per quote; None uses the placeholder vector
    pub targets_path:        Option<String>,
    pub artifact_dir:        String,
    pub validation_fraction: f64,
    pub split_seed:          u64,
    pub trials:              usize,
    pub timeout_secs:        Option<u64>,
    pub sampler:             SamplerKind,
    pub sampler_seed:        u64,
    pub max_epochs:          usize,
    pub batch_size:          usize,
    pub learning_rate:       f64,
    pub es_patience:         usize,
    pub lr_patience:         usize,
    pub lr_factor:           f64,
    pub min_lr:              f64,
    /// Fixed batch-shuffle seed for every fit; None reshuffles freshly per fit
    pub shuffle_seed:        Option<u64>,
}

impl Default for TuneConfig {
    fn default() -> Self {
        let plateau = PlateauPolicy::default();
        let fit     = FitSettings::default();
        Self {
            data_path:           "data/options.csv".to_string(),
            targets_path:        None,
            artifact_dir:        "artifacts".to_string(),
            validation_fraction: 0.2,
            split_seed:          42,
            trials:              100,
            timeout_secs:        None,
            sampler:             SamplerKind::Tpe,
            sampler_seed:        42,
            max_epochs:          fit.max_epochs,
            batch_size:          fit.batch_size,
            learning_rate:       fit.learning_rate,
            es_patience:         plateau.es_patience,
            lr_patience:         plateau.lr_patience,
            lr_factor:           plateau.lr_factor,
            min_lr:              plateau.min_lr,
            shuffle_seed:        None,
        }
    }
}

impl TuneConfig {
    pub fn fit_settings(&self) -> FitSettings {
        FitSettings {
            max_epochs:    self.max_epochs,
            batch_size:    self.batch_size,
            learning_rate: self.learning_rate,
            plateau: PlateauPolicy {
                es_patience: self.es_patience,
                lr_patience: self.lr_patience,
                lr_factor:   self.lr_factor,
                min_lr:      self.min_lr,
            },
            shuffle_seed:  self.shuffle_seed,
        }
    }

    pub fn search_budget(&self) -> SearchBudget {
        SearchBudget {
            max_trials: self.trials,
            deadline:   self.timeout_secs.map(Duration::from_secs),
        }
    }
}

// ─── Run summary ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TuneReport {
    pub best_trial:    Trial,
    pub metrics:       RegressionMetrics,
    pub trials_run:    usize,
    pub failed_trials: usize,
    pub stop_reason:   StopReason,
    pub final_history: LossHistory,
    pub artifact_dir:  PathBuf,
}

// ─── TuneUseCase ──────────────────────────────────────────────────────────────
pub struct TuneUseCase {
    config: TuneConfig,
    cancel: CancelHandle,
}

impl TuneUseCase {
    pub fn new(config: TuneConfig) -> Self {
        Self { config, cancel: CancelHandle::default() }
    }

    /// Handle that stops the search after the trial in flight.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn execute(&self) -> Result<TuneReport> {
        let cfg      = &self.config;
        let settings = cfg.fit_settings();
        settings.validate().context("Invalid training settings")?;

        // ── Step 1: Load quotes ───────────────────────────────────────────────
        tracing::info!("Loading option quotes from '{}'", cfg.data_path);
        let quotes = CsvQuoteLoader::new(&cfg.data_path)
            .load_all()
            .with_context(|| format!("Failed to load quotes from '{}'", cfg.data_path))?;

        // ── Step 2: Targets ───────────────────────────────────────────────────
        let source: Box<dyn TargetSource> = match &cfg.targets_path {
            Some(path) => {
                tracing::info!("Using calibrated targets from '{}'", path);
                Box::new(CalibratedTargets::new(path))
            }
            None => {
                tracing::warn!("No targets file given; every row gets the placeholder Heston vector");
                Box::new(PlaceholderTargets::default())
            }
        };
        let targets = source.targets_for(&quotes).context("Failed to build targets")?;
        let dataset = Dataset::from_quotes(&quotes, &targets)?;

        // ── Step 3: Split and standardise ─────────────────────────────────────
        let split = prepare(&dataset, cfg.validation_fraction, cfg.split_seed)?;
        tracing::info!("Split: {} train, {} validation", split.train_len(), split.val_len());
        let data = PreparedData::from_split(split)?;

        // ── Step 4: Save config and scaler ────────────────────────────────────
        let store = ArtifactStore::new(&cfg.artifact_dir)
            .with_context(|| format!("Cannot create artifact directory '{}'", cfg.artifact_dir))?;
        store.save_json(CONFIG_FILE, cfg)?;
        store.save_scaler(data.scaler())?;

        // ── Step 5: Search ────────────────────────────────────────────────────
        let device     = burn::backend::ndarray::NdArrayDevice::default();
        let mut search = SearchController::new(
            SearchSpace::heston_default(),
            cfg.sampler.build(cfg.sampler_seed),
            cfg.search_budget(),
        )?
        .with_cancel_handle(self.cancel.clone());
        let mut objective = ValidationLossObjective::<TrainBackend>::new(&data, settings.clone(), device.clone());
        let outcome = search.run(&mut objective).context("Hyperparameter search failed")?;

        // ── Step 6: Trial log ─────────────────────────────────────────────────
        store.save_trials(&outcome.trials)?;

        let best = outcome.best_trial().cloned().ok_or(TuneError::NoViableTrial)?;

        // ── Step 7: Final retrain ─────────────────────────────────────────────
        let final_model = finalize::<TrainBackend>(&best.config, &data, &settings, &device)
            .with_context(|| format!("Final retrain of trial {} failed", best.id))?;

        // ── Step 8: Persist ───────────────────────────────────────────────────
        store.save_model(&final_model.model)?;
        store.save_manifest(&ModelManifest {
            hyperparameters: best.config.clone(),
            model:           final_model.model_config.clone(),
            best_trial_id:   best.id,
            search_fitness:  best.ranking_fitness(),
            metrics:         final_model.metrics,
        })?;
        MetricsLogger::new(store.dir())?.write_history(&final_model.history)?;

        tracing::info!("Artifacts written to '{}'", store.dir().display());

        Ok(TuneReport {
            trials_run:    outcome.trials.len(),
            failed_trials: outcome.failed_count(),
            stop_reason:   outcome.stop_reason,
            best_trial:    best,
            metrics:       final_model.metrics,
            final_history: final_model.history,
            artifact_dir:  store.dir().to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_fit_defaults() {
        let cfg = TuneConfig::default();
        assert_eq!(cfg.trials, 100);
        assert_eq!(cfg.es_patience, 10);
        assert_eq!(cfg.lr_patience, 5);
        assert!((cfg.min_lr - 0.001).abs() < 1e-15);
        assert!(cfg.fit_settings().validate().is_ok());
    }

    #[test]
    fn test_sampler_kind_parses_case_insensitively() {
        assert_eq!("TPE".parse::<SamplerKind>().unwrap(), SamplerKind::Tpe);
        assert_eq!("random".parse::<SamplerKind>().unwrap(), SamplerKind::Random);
        assert!("grid".parse::<SamplerKind>().is_err());
    }

    #[test]
    fn test_config_json_round_trip_keeps_sampler_name() {
        let cfg  = TuneConfig { sampler: SamplerKind::Random, timeout_secs: Some(30), ..TuneConfig::default() };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"sampler\":\"random\""));
        let back: TuneConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.search_budget().deadline, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_data_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = TuneConfig {
            data_path:    tmp.path().join("absent.csv").display().to_string(),
            artifact_dir: tmp.path().join("out").display().to_string(),
            ..TuneConfig::default()
        };
        assert!(TuneUseCase::new(cfg).execute().is_err());
    }
}
