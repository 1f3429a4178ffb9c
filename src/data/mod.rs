// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the raw CSV file and tensor mini-batches.
//
//   quotes CSV
//       │
//       ▼
//   CsvQuoteLoader     → reads the seven feature columns
//       │
//       ▼
//   TargetSource       → one Heston vector per quote
//       │
//       ▼
//   splitter::prepare  → seeded train/validation split
//       │
//       ▼
//   PreparedData       → StandardScaler fitted on train, applied to both
//       │
//       ▼
//   RegressionDataset  → implements Burn's Dataset trait
//       │
//       ▼
//   RegressionBatcher  → stacks samples into [N, D] / [N, K] tensors

/// Reads option quotes from CSV
pub mod loader;

/// Placeholder and calibrated Heston targets
pub mod targets;

/// Seeded train/validation split
pub mod splitter;

/// Per-feature standardisation fitted on the train partition
pub mod scaler;

/// Scaled train/validation matrices shared by every trial
pub mod prepared;

/// Implements Burn's Dataset trait for regression rows
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
