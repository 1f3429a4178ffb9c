// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence concerns shared by the tune and predict workflows:
//
//   checkpoint.rs  — ArtifactStore: full-precision model weights via
//                    Burn's NamedMpkFileRecorder, plus JSON for the manifest,
//                    scaler, trial log and run settings
//
//   metrics.rs     — loss history of the final retrain as CSV

/// Model, scaler, manifest and trial-log persistence
pub mod checkpoint;

/// Training-curve CSV writer
pub mod metrics;
