// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (tuning a regressor or predicting with one).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - Only workflow coordination; errors leave as anyhow with context
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The search → retrain → persist workflow
pub mod tune_use_case;

// Retrain of the winning configuration and its hold-out metrics
pub mod final_trainer;

// Artifact-backed batch prediction
pub mod predict_use_case;
