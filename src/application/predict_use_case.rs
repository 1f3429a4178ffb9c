// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Loads an artifact directory written by TuneUseCase and maps
// a quotes CSV to Heston parameters:
//
//   Step 1: Rebuild the model + scaler     (Layer 6 - infra)
//   Step 2: Load the new quotes            (Layer 4 - data)
//   Step 3: Standardise and predict        (Layer 5 - ml)
//   Step 4: Write one row per quote        (csv)
//
// New quotes are scaled with the statistics saved at training
// time, never refitted.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::loader::CsvQuoteLoader;
use crate::domain::heston::HestonParams;
use crate::domain::traits::QuoteSource;
use crate::infra::checkpoint::ArtifactStore;
use crate::ml::inferencer::Predictor;

/// One output line of the predictions CSV
#[derive(Debug, Serialize)]
struct PredictionRow {
    row:    usize,
    kappa:  f64,
    theta:  f64,
    sigma:  f64,
    rho:    f64,
    v0:     f64,
    feller: bool,
}

impl PredictionRow {
    fn new(row: usize, p: &HestonParams) -> Self {
        Self {
            row,
            kappa:  p.kappa,
            theta:  p.theta,
            sigma:  p.sigma,
            rho:    p.rho,
            v0:     p.v0,
            feller: p.satisfies_feller(),
        }
    }
}

pub struct PredictUseCase {
    predictor: Predictor,
}

impl PredictUseCase {
    pub fn new(artifact_dir: impl AsRef<Path>) -> Result<Self> {
        let dir   = artifact_dir.as_ref();
        let store = ArtifactStore::open(dir)
            .with_context(|| format!("No artifacts found in '{}'", dir.display()))?;
        let predictor = Predictor::from_artifacts(&store).context("Failed to load trained model")?;
        Ok(Self { predictor })
    }

    /// Predict for every quote in `input` and write the results to `output`.
    /// Returns the number of rows written.
    pub fn execute(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<usize> {
        let input  = input.as_ref();
        let output = output.as_ref();

        let quotes = CsvQuoteLoader::new(input)
            .load_all()
            .with_context(|| format!("Failed to load quotes from '{}'", input.display()))?;
        let params = self.predictor.predict(&quotes)?;

        let mut writer = csv::Writer::from_path(output)
            .with_context(|| format!("Cannot create '{}'", output.display()))?;
        for (i, p) in params.iter().enumerate() {
            writer.serialize(PredictionRow::new(i, p))?;
        }
        writer.flush()?;

        let violations = params.iter().filter(|p| !p.satisfies_feller()).count();
        if violations > 0 {
            tracing::warn!("{} of {} predictions violate the Feller condition", violations, params.len());
        }
        tracing::info!("Wrote {} predictions to '{}'", params.len(), output.display());
        Ok(params.len())
    }
}
