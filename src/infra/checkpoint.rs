// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Everything a run leaves behind, under one directory:
//
//   artifacts/
//     best_model.mpk        ← final model weights (full precision)
//     model_manifest.json   ← winning hyperparameters + model config
//     scaler.json           ← train-partition feature statistics
//     trials.json           ← every search trial
//     tune_config.json      ← settings the run was launched with
//     training_history.csv  ← loss curve of the final retrain
//
// The manifest is what lets the predictor rebuild the exact
// architecture before loading weights into it; the recorder
// refuses a record whose shapes do not match.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use std::{fs, path::{Path, PathBuf}};

use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::data::scaler::StandardScaler;
use crate::domain::hyperparams::HyperparameterConfiguration;
use crate::domain::trial::Trial;
use crate::error::{TuneError, TuneResult};
use crate::ml::evaluation::RegressionMetrics;
use crate::ml::model::{HestonRegressor, HestonRegressorConfig};

/// Weights are stored as f32, exactly as they were scored.
type WeightsRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

const MODEL_FILE:    &str = "best_model";
const MANIFEST_FILE: &str = "model_manifest.json";
const SCALER_FILE:   &str = "scaler.json";
const TRIALS_FILE:   &str = "trials.json";

/// Describes the saved model well enough to rebuild it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub hyperparameters: HyperparameterConfiguration,
    pub model:           HestonRegressorConfig,
    /// Trial that produced the winning configuration
    pub best_trial_id:   usize,
    /// Fitness of that trial during the search
    pub search_fitness:  f64,
    /// Hold-out metrics of the retrained model
    pub metrics:         RegressionMetrics,
}

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open (and create if needed) an artifact directory.
    pub fn new(dir: impl Into<PathBuf>) -> TuneResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Open an existing directory without creating it.
    pub fn open(dir: impl Into<PathBuf>) -> TuneResult<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(TuneError::Checkpoint(format!(
                "artifact directory '{}' does not exist. Have you run 'tune' first?",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save model weights to {dir}/best_model.mpk
    pub fn save_model<B: Backend>(&self, model: &HestonRegressor<B>) -> TuneResult<PathBuf> {
        let path = self.dir.join(MODEL_FILE);

        WeightsRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .map_err(|e| TuneError::Checkpoint(format!("cannot save '{}': {e:?}", path.display())))?;

        tracing::debug!("Saved model weights to '{}'", path.display());
        Ok(path)
    }

    /// Rebuild the architecture from the manifest and load the saved weights into it.
    pub fn load_model<B: Backend>(&self, device: &B::Device) -> TuneResult<HestonRegressor<B>> {
        let manifest = self.load_manifest()?;
        let model: HestonRegressor<B> = manifest.model.init(device);
        let path = self.dir.join(MODEL_FILE);

        let record = WeightsRecorder::new()
            .load(path.clone(), device)
            .map_err(|e| TuneError::Checkpoint(format!("cannot load '{}': {e:?}", path.display())))?;

        Ok(model.load_record(record))
    }

    pub fn save_manifest(&self, manifest: &ModelManifest) -> TuneResult<()> {
        self.save_json(MANIFEST_FILE, manifest)
    }

    pub fn load_manifest(&self) -> TuneResult<ModelManifest> {
        self.load_json(MANIFEST_FILE)
    }

    pub fn save_scaler(&self, scaler: &StandardScaler) -> TuneResult<()> {
        self.save_json(SCALER_FILE, scaler)
    }

    pub fn load_scaler(&self) -> TuneResult<StandardScaler> {
        self.load_json(SCALER_FILE)
    }

    pub fn save_trials(&self, trials: &[Trial]) -> TuneResult<()> {
        self.save_json(TRIALS_FILE, &trials)
    }

    pub fn load_trials(&self) -> TuneResult<Vec<Trial>> {
        self.load_json(TRIALS_FILE)
    }

    /// Pretty-printed JSON under the artifact directory
    pub fn save_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> TuneResult<()> {
        let path = self.dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(())
    }

    pub fn load_json<T: DeserializeOwned>(&self, name: &str) -> TuneResult<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path).map_err(|e| {
            TuneError::Checkpoint(format!("cannot read '{}': {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::LossHistory;

    type TestBackend = burn::backend::NdArray;

    fn manifest() -> ModelManifest {
        ModelManifest {
            hyperparameters: HyperparameterConfiguration::dense(16, 0.2),
            model:           HestonRegressorConfig::new(7, 16, 5).with_dropout(0.2),
            best_trial_id:   3,
            search_fitness:  0.012,
            metrics:         RegressionMetrics { mse: 0.01, r2: 0.5, mae: 0.05 },
        }
    }

    #[test]
    fn test_model_round_trip_preserves_predictions() {
        let tmp    = tempfile::tempdir().unwrap();
        let store  = ArtifactStore::new(tmp.path()).unwrap();
        let device = Default::default();
        let m      = manifest();
        let model: HestonRegressor<TestBackend> = m.model.init(&device);

        store.save_manifest(&m).unwrap();
        store.save_model(&model).unwrap();
        let loaded: HestonRegressor<TestBackend> = store.load_model(&device).unwrap();

        let x = Tensor::<TestBackend, 2>::ones([2, 7], &device);
        let a: Vec<f32> = model.forward(x.clone()).into_data().to_vec().unwrap();
        let b: Vec<f32> = loaded.forward(x).into_data().to_vec().unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6, "{x} vs {y}");
        }
    }

    #[test]
    fn test_wide_model_round_trip_is_exact_enough_for_small_targets() {
        let tmp    = tempfile::tempdir().unwrap();
        let store  = ArtifactStore::new(tmp.path()).unwrap();
        let device = Default::default();
        let m      = ModelManifest { model: HestonRegressorConfig::new(7, 512, 5), ..manifest() };
        let model: HestonRegressor<TestBackend> = m.model.init(&device);

        store.save_manifest(&m).unwrap();
        store.save_model(&model).unwrap();
        let loaded: HestonRegressor<TestBackend> = store.load_model(&device).unwrap();

        let rows: Vec<Vec<f64>> = (0..8).map(|i| (0..7).map(|j| (i * 7 + j) as f64 * 0.1 - 2.0).collect()).collect();
        let a = crate::ml::inferencer::predict_rows(&model, &rows, &device).unwrap();
        let b = crate::ml::inferencer::predict_rows(&loaded, &rows, &device).unwrap();
        let max = a.iter().flatten().zip(b.iter().flatten()).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max);
        assert!(max < 1e-6, "max prediction drift {max}");
    }

    #[test]
    fn test_scaler_and_trials_round_trip() {
        let tmp   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path()).unwrap();

        let scaler = StandardScaler::fit(&[vec![1.0, 2.0], vec![3.0, 6.0]]).unwrap();
        store.save_scaler(&scaler).unwrap();
        assert_eq!(store.load_scaler().unwrap(), scaler);

        let trials = vec![
            Trial::completed(0, HyperparameterConfiguration::dense(64, 0.1), 0.2, LossHistory::default()),
            Trial::failed(1, HyperparameterConfiguration::dense(128, 0.4), "diverged"),
        ];
        store.save_trials(&trials).unwrap();
        assert_eq!(store.load_trials().unwrap(), trials);
    }

    #[test]
    fn test_open_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            ArtifactStore::open(tmp.path().join("nope")),
            Err(TuneError::Checkpoint(_))
        ));
    }
}
