// ============================================================
// Layer 3 — Dataset
// ============================================================
// Ordered (feature-vector, target-vector) pairs. Built once at
// load time and never mutated afterwards; every consumer gets
// read-only slices.
//
// Invariants checked by `Dataset::new`:
//   - at least one row
//   - features.len() == targets.len()
//   - every feature row has the same width D
//   - every target row has the same width K

use crate::domain::heston::HestonParams;
use crate::domain::option_quote::OptionQuote;
use crate::error::{TuneError, TuneResult};

#[derive(Debug, Clone)]
pub struct Dataset {
    features:    Vec<Vec<f64>>,
    targets:     Vec<Vec<f64>>,
    feature_dim: usize,
    target_dim:  usize,
}

impl Dataset {
    pub fn new(features: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> TuneResult<Self> {
        if features.is_empty() {
            return Err(TuneError::InvalidData("dataset has no rows".into()));
        }
        if features.len() != targets.len() {
            return Err(TuneError::InvalidData(format!(
                "{} feature rows but {} target rows",
                features.len(),
                targets.len()
            )));
        }

        let feature_dim = uniform_width(&features, "feature")?;
        let target_dim  = uniform_width(&targets, "target")?;

        Ok(Self { features, targets, feature_dim, target_dim })
    }

    /// Pair quotes with their Heston targets row by row.
    pub fn from_quotes(quotes: &[OptionQuote], targets: &[HestonParams]) -> TuneResult<Self> {
        let features = quotes.iter().map(|q| q.features().to_vec()).collect();
        let targets  = targets.iter().map(|t| t.to_array().to_vec()).collect();
        Self::new(features, targets)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn targets(&self) -> &[Vec<f64>] {
        &self.targets
    }
}

pub(crate) fn uniform_width(rows: &[Vec<f64>], what: &str) -> TuneResult<usize> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    if width == 0 {
        return Err(TuneError::InvalidData(format!("{what} rows are empty")));
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(TuneError::InvalidData(format!(
            "{what} row {i} has width {} (expected {width})",
            row.len()
        )));
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_dataset() {
        let err = Dataset::new(Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, TuneError::InvalidData(_)));
    }

    #[test]
    fn test_rejects_ragged_features() {
        let features = vec![vec![1.0, 2.0], vec![3.0]];
        let targets  = vec![vec![0.0], vec![0.0]];
        assert!(matches!(
            Dataset::new(features, targets),
            Err(TuneError::InvalidData(msg)) if msg.contains("row 1")
        ));
    }

    #[test]
    fn test_rejects_row_count_mismatch() {
        let features = vec![vec![1.0], vec![2.0]];
        let targets  = vec![vec![0.0]];
        assert!(Dataset::new(features, targets).is_err());
    }

    #[test]
    fn test_dimensions_from_quotes() {
        let quote = OptionQuote {
            strike: 100.0, time_to_maturity: 0.5, log_return: 0.0,
            volatility: 0.2, last_price: 3.0, bid: 2.9, ask: 3.1,
        };
        let ds = Dataset::from_quotes(&[quote, quote], &[HestonParams::PLACEHOLDER; 2]).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.feature_dim(), 7);
        assert_eq!(ds.target_dim(), 5);
    }
}
