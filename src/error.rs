// ============================================================
// Error Taxonomy
// ============================================================
// Every library layer (domain, data, ml, search, infra) returns
// TuneResult. The application and CLI layers wrap these in
// anyhow with extra context.
//
//   InvalidData       fatal, surfaced immediately
//   TrainingDiverged  recovered by the search loop (trial penalised)
//   everything else   fatal

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuneError {
    /// Empty dataset, inconsistent dimensionality, unreadable rows
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Settings that can never produce a valid run (zero epochs, bad split fraction, ...)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("hyperparameter '{0}' missing from configuration")]
    MissingParameter(String),

    /// A non-finite loss appeared during training
    #[error("training diverged at epoch {epoch} (train_loss={train_loss}, val_loss={val_loss})")]
    TrainingDiverged {
        epoch:      usize,
        train_loss: f64,
        val_loss:   f64,
    },

    /// The search finished without a single finite-fitness trial
    #[error("no trial completed with a finite fitness")]
    NoViableTrial,

    #[error("tensor conversion failed: {0}")]
    Tensor(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl TuneError {
    /// True for failures the search loop absorbs as a penalised trial.
    pub fn is_recoverable_trial_failure(&self) -> bool {
        matches!(self, TuneError::TrainingDiverged { .. })
    }
}

pub type TuneResult<T> = std::result::Result<T, TuneError>;
