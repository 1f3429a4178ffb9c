// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles row indices with a seeded RNG and cuts them into two
// disjoint partitions:
//   - Training set:   used for parameter updates
//   - Validation set: used only for scoring (early stopping,
//                     LR reduction, trial fitness, final metrics)
//
// Sizes: n_val = ceil(fraction * n), n_train = n - n_val.
// The same (dataset, fraction, seed) always yields the same
// partition.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::dataset::Dataset;
use crate::error::{TuneError, TuneResult};

/// The four matrices produced by `prepare`
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub x_train: Vec<Vec<f64>>,
    pub x_val:   Vec<Vec<f64>>,
    pub y_train: Vec<Vec<f64>>,
    pub y_val:   Vec<Vec<f64>>,
}

impl Split {
    pub fn train_len(&self) -> usize {
        self.x_train.len()
    }

    pub fn val_len(&self) -> usize {
        self.x_val.len()
    }
}

/// Permute `0..n` with a seeded Fisher-Yates shuffle and return
/// (train_indices, val_indices).
pub fn split_indices(n: usize, validation_fraction: f64, seed: u64) -> TuneResult<(Vec<usize>, Vec<usize>)> {
    if !(validation_fraction > 0.0 && validation_fraction < 1.0) {
        return Err(TuneError::InvalidConfig(format!(
            "validation fraction must lie strictly between 0 and 1, got {validation_fraction}"
        )));
    }

    let n_val   = ((n as f64) * validation_fraction).ceil() as usize;
    let n_train = n.saturating_sub(n_val);
    if n_val == 0 || n_train == 0 {
        return Err(TuneError::InvalidData(format!(
            "{n} rows cannot be split into non-empty train and validation sets at fraction {validation_fraction}"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    // split_off(n) keeps [0..n_train] in `indices` and returns the rest
    let val = indices.split_off(n_train);
    Ok((indices, val))
}

/// Split a dataset into train/validation partitions.
pub fn prepare(dataset: &Dataset, validation_fraction: f64, seed: u64) -> TuneResult<Split> {
    let (train_idx, val_idx) = split_indices(dataset.len(), validation_fraction, seed)?;

    let take = |rows: &[Vec<f64>], idx: &[usize]| -> Vec<Vec<f64>> {
        idx.iter().map(|&i| rows[i].clone()).collect()
    };

    let split = Split {
        x_train: take(dataset.features(), &train_idx),
        x_val:   take(dataset.features(), &val_idx),
        y_train: take(dataset.targets(), &train_idx),
        y_val:   take(dataset.targets(), &val_idx),
    };

    tracing::debug!(
        "Dataset split: {} training, {} validation (seed {})",
        split.train_len(),
        split.val_len(),
        seed,
    );

    Ok(split)
}
