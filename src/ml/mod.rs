// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn-specific model and training code lives here.
//
//   model.rs        — dense → ReLU → dropout → dense(5) regressor
//   training_run.rs — per-fit early-stopping / LR-plateau state
//   trainer.rs      — the Adam + MSE fit loop with best-epoch restore
//   evaluation.rs   — MSE, R², MAE on held-out rows
//   inferencer.rs   — batch prediction and the artifact-backed Predictor
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Feed-forward regressor architecture
pub mod model;

/// Validation-plateau bookkeeping for one fit
pub mod training_run;

/// Training loop with early stopping and LR reduction
pub mod trainer;

/// Hold-out regression metrics
pub mod evaluation;

/// Prediction from a loaded checkpoint
pub mod inferencer;
