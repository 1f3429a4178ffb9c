// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two inputs of a run come from outside the core:
//
//   QuoteSource   → the market observations (features)
//   TargetSource  → the Heston vector for each observation
//
// The application layer only sees these traits, so a CSV file,
// an in-memory fixture or a calibration service all plug in the
// same way.

use crate::domain::heston::HestonParams;
use crate::domain::option_quote::OptionQuote;
use crate::error::TuneResult;

// ─── QuoteSource ──────────────────────────────────────────────────────────────
/// Anything that can produce the option quotes for one run.
///
/// Implementations:
///   - CsvQuoteLoader → reads the named columns of a CSV file
pub trait QuoteSource {
    fn load_all(&self) -> TuneResult<Vec<OptionQuote>>;
}

// ─── TargetSource ─────────────────────────────────────────────────────────────
/// Supplies one Heston parameter vector per quote, row-aligned.
///
/// Implementations:
///   - PlaceholderTargets → the same constant vector for every row
///   - CalibratedTargets  → rows read from a calibration CSV
pub trait TargetSource {
    fn targets_for(&self, quotes: &[OptionQuote]) -> TuneResult<Vec<HestonParams>>;
}

/// Blanket impl so in-memory quote vectors work as a source (tests, library callers).
impl QuoteSource for Vec<OptionQuote> {
    fn load_all(&self) -> TuneResult<Vec<OptionQuote>> {
        Ok(self.clone())
    }
}
