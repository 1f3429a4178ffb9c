use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One scaled training row, stored as f32 for the tensor backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionSample {
    pub features: Vec<f32>,
    pub targets:  Vec<f32>,
}

pub struct RegressionDataset {
    samples: Vec<RegressionSample>,
}

impl RegressionDataset {
    pub fn new(samples: Vec<RegressionSample>) -> Self { Self { samples } }

    /// Zip feature and target rows. Callers pass matrices of equal length.
    pub fn from_rows(features: &[Vec<f64>], targets: &[Vec<f64>]) -> Self {
        let samples = features
            .iter()
            .zip(targets)
            .map(|(x, y)| RegressionSample {
                features: x.iter().map(|&v| v as f32).collect(),
                targets:  y.iter().map(|&v| v as f32).collect(),
            })
            .collect();
        Self { samples }
    }
}

impl Dataset<RegressionSample> for RegressionDataset {
    fn get(&self, index: usize) -> Option<RegressionSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_pairs_rows() {
        let ds = RegressionDataset::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]], &[vec![0.5], vec![0.25]]);
        assert_eq!(ds.len(), 2);
        let s = ds.get(1).unwrap();
        assert_eq!(s.features, vec![3.0, 4.0]);
        assert_eq!(s.targets, vec![0.25]);
        assert!(ds.get(2).is_none());
    }
}
