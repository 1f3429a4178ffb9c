// ============================================================
// Search Layer — Hyperparameter Search
// ============================================================
// Sits between the application layer and the ML layer: it asks
// the ML layer to train, never the other way round.
//
//   space.rs      — declared parameter domains
//   sampler.rs    — ConfigurationSampler trait + RandomSampler
//   tpe.rs        — tree-structured Parzen estimator sampler
//   objective.rs  — configuration → minimum validation loss
//   controller.rs — the trial loop, best-trial tracking, stop rules

pub mod space;

pub mod sampler;

/// Fitness-informed sampler
pub mod tpe;

pub mod objective;

/// Trial loop with budget, deadline and cancellation
pub mod controller;
