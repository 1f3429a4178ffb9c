// ============================================================
// Layer 5 — Inferencer
// ============================================================
use burn::prelude::*;

use crate::data::scaler::StandardScaler;
use crate::domain::heston::HestonParams;
use crate::domain::option_quote::OptionQuote;
use crate::error::{TuneError, TuneResult};
use crate::infra::checkpoint::ArtifactStore;
use crate::ml::model::HestonRegressor;

type InferBackend = burn::backend::NdArray;

/// Run the model over already-scaled rows; one output row per input row.
pub fn predict_rows<B: Backend>(
    model:  &HestonRegressor<B>,
    rows:   &[Vec<f64>],
    device: &B::Device,
) -> TuneResult<Vec<Vec<f64>>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let width = rows[0].len();
    if rows.iter().any(|r| r.len() != width) {
        return Err(TuneError::InvalidData("prediction rows have inconsistent width".into()));
    }
    let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().map(|&v| v as f32)).collect();

    let input  = Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([rows.len(), width]);
    let output = model.forward(input);
    let [_, k] = output.dims();

    let values: Vec<f32> = output
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| TuneError::Tensor(format!("{e:?}")))?;

    Ok(values
        .chunks(k)
        .map(|c| c.iter().map(|&v| v as f64).collect())
        .collect())
}

/// Loaded model plus the scaler it was trained with.
pub struct Predictor {
    model:  HestonRegressor<InferBackend>,
    scaler: StandardScaler,
    device: burn::backend::ndarray::NdArrayDevice,
}

impl Predictor {
    pub fn from_artifacts(store: &ArtifactStore) -> TuneResult<Self> {
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let scaler = store.load_scaler()?;
        let model  = store.load_model::<InferBackend>(&device)?;
        tracing::info!("Model loaded from '{}'", store.dir().display());
        Ok(Self { model, scaler, device })
    }

    /// Standardise quotes with the training statistics and predict one Heston vector each.
    pub fn predict(&self, quotes: &[OptionQuote]) -> TuneResult<Vec<HestonParams>> {
        let raw: Vec<Vec<f64>> = quotes.iter().map(|q| q.features().to_vec()).collect();
        let scaled = self.scaler.apply(&raw)?;

        predict_rows(&self.model, &scaled, &self.device)?
            .iter()
            .map(|row| {
                HestonParams::from_slice(row).ok_or_else(|| {
                    TuneError::InvalidData(format!("model produced {} outputs, expected 5", row.len()))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::HestonRegressorConfig;

    #[test]
    fn test_predict_rows_shape() {
        let device = Default::default();
        let model: HestonRegressor<InferBackend> = HestonRegressorConfig::new(3, 4, 5).init(&device);
        let out = predict_rows(&model, &[vec![0.0; 3], vec![1.0; 3]], &device).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.len() == 5));
    }

    #[test]
    fn test_predict_rows_rejects_ragged_input() {
        let device = Default::default();
        let model: HestonRegressor<InferBackend> = HestonRegressorConfig::new(2, 4, 5).init(&device);
        assert!(predict_rows(&model, &[vec![0.0; 2], vec![1.0]], &device).is_err());
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let device = Default::default();
        let model: HestonRegressor<InferBackend> = HestonRegressorConfig::new(2, 4, 5).init(&device);
        assert!(predict_rows(&model, &[], &device).unwrap().is_empty());
    }
}
