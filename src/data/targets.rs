// ============================================================
// Layer 4 — Target Sources
// ============================================================
// Where the Heston vector for each quote comes from.
//
//   PlaceholderTargets  same constant vector for every row; this
//                       is what the pipeline uses until a real
//                       calibration feed exists
//   CalibratedTargets   one row per quote from a CSV with columns
//                       kappa,theta,sigma,rho,v0 (same row order
//                       as the quote file)

use std::path::PathBuf;

use crate::domain::heston::{HestonParams, TARGET_COLUMNS};
use crate::domain::option_quote::OptionQuote;
use crate::domain::traits::TargetSource;
use crate::error::{TuneError, TuneResult};

#[derive(Debug, Clone, Copy)]
pub struct PlaceholderTargets {
    params: HestonParams,
}

impl PlaceholderTargets {
    pub fn new(params: HestonParams) -> Self {
        Self { params }
    }
}

impl Default for PlaceholderTargets {
    fn default() -> Self {
        Self::new(HestonParams::PLACEHOLDER)
    }
}

impl TargetSource for PlaceholderTargets {
    fn targets_for(&self, quotes: &[OptionQuote]) -> TuneResult<Vec<HestonParams>> {
        Ok(vec![self.params; quotes.len()])
    }
}

/// Row-aligned calibrated parameters read from a CSV file.
pub struct CalibratedTargets {
    path: PathBuf,
}

impl CalibratedTargets {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TargetSource for CalibratedTargets {
    fn targets_for(&self, quotes: &[OptionQuote]) -> TuneResult<Vec<HestonParams>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        if let Some(col) = TARGET_COLUMNS.iter().find(|c| !headers.iter().any(|h| h == **c)) {
            return Err(TuneError::InvalidData(format!(
                "calibration file '{}' has no '{col}' column",
                self.path.display()
            )));
        }

        let mut targets = Vec::with_capacity(quotes.len());
        for (i, row) in reader.deserialize::<HestonParams>().enumerate() {
            let params = row.map_err(|e| {
                TuneError::InvalidData(format!("'{}' line {}: {e}", self.path.display(), i + 2))
            })?;
            if params.to_array().iter().any(|v| !v.is_finite()) {
                return Err(TuneError::InvalidData(format!(
                    "'{}' line {}: non-finite parameter",
                    self.path.display(),
                    i + 2
                )));
            }
            targets.push(params);
        }

        if targets.len() != quotes.len() {
            return Err(TuneError::InvalidData(format!(
                "calibration file has {} rows but there are {} quotes",
                targets.len(),
                quotes.len()
            )));
        }

        tracing::info!("Loaded {} calibrated targets from '{}'", targets.len(), self.path.display());
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn quotes(n: usize) -> Vec<OptionQuote> {
        let q = OptionQuote {
            strike: 100.0, time_to_maturity: 0.5, log_return: 0.0,
            volatility: 0.2, last_price: 3.0, bid: 2.9, ask: 3.1,
        };
        vec![q; n]
    }

    #[test]
    fn test_placeholder_repeats_constant() {
        let t = PlaceholderTargets::default().targets_for(&quotes(3)).unwrap();
        assert_eq!(t.len(), 3);
        assert!(t.iter().all(|p| *p == HestonParams::PLACEHOLDER));
    }

    #[test]
    fn test_calibrated_rows_are_aligned() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "kappa,theta,sigma,rho,v0\n1.5,0.04,0.3,-0.7,0.05\n2.5,0.02,0.2,-0.4,0.03\n").unwrap();
        let t = CalibratedTargets::new(f.path()).targets_for(&quotes(2)).unwrap();
        assert_eq!(t[0].kappa, 1.5);
        assert_eq!(t[1].rho, -0.4);
    }

    #[test]
    fn test_calibrated_row_count_mismatch() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "kappa,theta,sigma,rho,v0\n1.5,0.04,0.3,-0.7,0.05\n").unwrap();
        let err = CalibratedTargets::new(f.path()).targets_for(&quotes(2)).unwrap_err();
        assert!(matches!(err, TuneError::InvalidData(_)));
    }
}
