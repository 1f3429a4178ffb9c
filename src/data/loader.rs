// ============================================================
// Layer 4 — Quote Loader
// ============================================================
// Reads option quotes from a CSV file with named columns.
//
// Expected header (extra columns are ignored):
//   Strike,Time_to_Maturity,Log_Return,Volatility,Last Price,Bid,Ask,...
//
// Any missing column, unparsable cell or non-finite value makes
// the whole file invalid. A half-loaded dataset would silently
// shift the train/validation split, so there is no skip mode.

use std::path::{Path, PathBuf};

use crate::domain::option_quote::{OptionQuote, FEATURE_COLUMNS};
use crate::domain::traits::QuoteSource;
use crate::error::{TuneError, TuneResult};

/// Loads all quotes from one CSV file.
/// Implements the QuoteSource trait from Layer 3.
pub struct CsvQuoteLoader {
    path: PathBuf,
}

impl CsvQuoteLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QuoteSource for CsvQuoteLoader {
    fn load_all(&self) -> TuneResult<Vec<OptionQuote>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = FEATURE_COLUMNS
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .collect();
        if !missing.is_empty() {
            return Err(TuneError::InvalidData(format!(
                "'{}' is missing column(s): {}",
                self.path.display(),
                missing.join(", ")
            )));
        }

        let mut quotes = Vec::new();
        for (i, row) in reader.deserialize::<OptionQuote>().enumerate() {
            // Header is line 1, so record i sits on line i + 2
            let line = i + 2;
            let quote = row.map_err(|e| {
                TuneError::InvalidData(format!("'{}' line {line}: {e}", self.path.display()))
            })?;
            if let Some(col) = quote.first_non_finite() {
                return Err(TuneError::InvalidData(format!(
                    "'{}' line {line}: column '{col}' is not finite",
                    self.path.display()
                )));
            }
            quotes.push(quote);
        }

        if quotes.is_empty() {
            return Err(TuneError::InvalidData(format!("'{}' contains no rows", self.path.display())));
        }

        tracing::info!("Loaded {} quotes from '{}'", quotes.len(), self.path.display());
        Ok(quotes)
    }
}
