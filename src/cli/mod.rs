// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `tune`    — search, retrain the best trial, save artifacts
//   2. `predict` — load the artifacts and predict for new quotes
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TuneArgs};

#[derive(Parser, Debug)]
#[command(
    name = "heston-tuner",
    version,
    about = "Tune and train a feed-forward regressor from option quotes to Heston parameters."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Tune(args)    => run_tune(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_tune(args: TuneArgs) -> Result<()> {
    use heston_tuner::application::tune_use_case::TuneUseCase;

    let report = TuneUseCase::new(args.into()).execute()?;

    println!(
        "Search: {} trials ({} failed, {:?}); best trial {} {} with val_loss {:.6}",
        report.trials_run,
        report.failed_trials,
        report.stop_reason,
        report.best_trial.id,
        report.best_trial.config,
        report.best_trial.ranking_fitness(),
    );
    println!(
        "MSE: {:.6}, R^2: {:.4}, MAE: {:.6}",
        report.metrics.mse, report.metrics.r2, report.metrics.mae
    );
    println!("Artifacts saved to {}", report.artifact_dir.display());
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use heston_tuner::application::predict_use_case::PredictUseCase;

    let rows = PredictUseCase::new(&args.artifact_dir)?.execute(&args.input, &args.output)?;
    println!("Wrote {} predictions to {}", rows, args.output);
    Ok(())
}
