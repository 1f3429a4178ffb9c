// ============================================================
// Layer 6 — Loss History Report
// ============================================================
// Writes the final run's training curve to CSV for plotting.
//
// Output file: {artifact_dir}/training_history.csv
//
//   epoch,train_loss,val_loss,learning_rate
//   1,0.412300,0.389200,0.01
//   2,0.190100,0.154300,0.01
//   ...
//
// How to read it:
//   - val_loss rising while train_loss falls → overfitting
//   - learning_rate steps down by the plateau factor after each
//     stalled window
//   - the curve ends up to es_patience epochs after the best
//     epoch; those trailing epochs were not kept

use std::{fs, path::{Path, PathBuf}};

use crate::domain::history::LossHistory;
use crate::error::TuneResult;

pub const HISTORY_FILE: &str = "training_history.csv";

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    pub fn new(dir: impl AsRef<Path>) -> TuneResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self { csv_path: dir.join(HISTORY_FILE) })
    }

    /// Replace the CSV with one row per epoch of `history`.
    pub fn write_history(&self, history: &LossHistory) -> TuneResult<()> {
        let mut writer = csv::Writer::from_path(&self.csv_path)?;
        for record in &history.epochs {
            writer.serialize(record)?;
        }
        writer.flush()?;

        tracing::info!(
            "Wrote {} epochs of loss history to '{}' (best epoch {})",
            history.len(),
            self.csv_path.display(),
            history.best_epoch,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
