// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing the problem:
// quotes, Heston targets, datasets, hyperparameter
// configurations, trials and loss histories.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only data, invariants, and traits

/// A single market observation and its feature vector
pub mod option_quote;

/// The five Heston parameters (regression target)
pub mod heston;

/// Immutable feature/target table
pub mod dataset;

/// Sampled hyperparameter configurations
pub mod hyperparams;

/// Per-epoch loss curve of one fit
pub mod history;

/// Append-only search records
pub mod trial;

/// Abstractions over quote and target sources
pub mod traits;
