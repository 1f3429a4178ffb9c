// ============================================================
// Layer 4 — Regression Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<RegressionSample>
// into two dense tensors.
//
//   Input:  N samples, each with D features and K targets
//   Output: features [N, D], targets [N, K]
//
// Rows are flattened in sample order and reshaped:
//   [s1_f1, ..., s1_fD, s2_f1, ..., sN_fD] → [N, D]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::RegressionSample;

/// A mini-batch ready for the forward pass.
#[derive(Debug, Clone)]
pub struct RegressionBatch<B: Backend> {
    /// Scaled input features, shape [batch_size, D]
    pub features: Tensor<B, 2>,

    /// Heston targets, shape [batch_size, K]
    pub targets: Tensor<B, 2>,
}

/// Holds the target device so tensors land on the right backend device.
#[derive(Clone, Debug)]
pub struct RegressionBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> RegressionBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<RegressionSample, RegressionBatch<B>> for RegressionBatcher<B> {
    fn batch(&self, items: Vec<RegressionSample>) -> RegressionBatch<B> {
        let batch_size = items.len();
        // All rows share the same widths (checked when the Dataset was built)
        let n_features = items[0].features.len();
        let n_targets  = items[0].targets.len();

        let features_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        let targets_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.targets.iter().copied())
            .collect();

        let features = Tensor::<B, 1>::from_floats(
            features_flat.as_slice(), &self.device
        ).reshape([batch_size, n_features]);

        let targets = Tensor::<B, 1>::from_floats(
            targets_flat.as_slice(), &self.device
        ).reshape([batch_size, n_targets]);

        RegressionBatch { features, targets }
    }
}
