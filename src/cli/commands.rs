// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `tune` and `predict`, and all
// their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, SamplerKind, ...)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use heston_tuner::application::tune_use_case::{SamplerKind, TuneConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search hyperparameters, retrain the best configuration and save it
    Tune(TuneArgs),

    /// Predict Heston parameters for a quotes CSV with a saved model
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct TuneArgs {
    /// CSV with Strike, Time_to_Maturity, Log_Return, Volatility, Last Price, Bid, Ask
    #[arg(long, default_value = "data/options.csv")]
    pub data: String,

    /// Row-aligned CSV of calibrated kappa,theta,sigma,rho,v0.
    /// Without it every row gets the placeholder Heston vector.
    #[arg(long)]
    pub targets: Option<String>,

    /// Where the model, scaler, manifest and reports are written
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Share of rows held out for validation
    #[arg(long, default_value_t = 0.2)]
    pub validation_fraction: f64,

    #[arg(long, default_value_t = 42)]
    pub split_seed: u64,

    /// Number of search trials
    #[arg(long, default_value_t = 100)]
    pub trials: usize,

    /// Stop starting new trials after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// tpe or random
    #[arg(long, default_value = "tpe")]
    pub sampler: SamplerKind,

    #[arg(long, default_value_t = 42)]
    pub sampler_seed: u64,

    /// Upper bound on epochs per fit
    #[arg(long, default_value_t = 100)]
    pub max_epochs: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Initial Adam learning rate
    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// Epochs without improvement before training stops
    #[arg(long, default_value_t = 10)]
    pub es_patience: usize,

    /// Epochs without improvement before the learning rate is cut
    #[arg(long, default_value_t = 5)]
    pub lr_patience: usize,

    #[arg(long, default_value_t = 0.2)]
    pub lr_factor: f64,

    /// The learning rate is never cut below this
    #[arg(long, default_value_t = 0.001)]
    pub min_lr: f64,

    /// Fix the batch shuffle order of every fit
    #[arg(long)]
    pub shuffle_seed: Option<u64>,
}

/// Boundary between Layer 1 and Layer 2: the application layer never sees clap types.
impl From<TuneArgs> for TuneConfig {
    fn from(a: TuneArgs) -> Self {
        TuneConfig {
            data_path:           a.data,
            targets_path:        a.targets,
            artifact_dir:        a.artifact_dir,
            validation_fraction: a.validation_fraction,
            split_seed:          a.split_seed,
            trials:              a.trials,
            timeout_secs:        a.timeout_secs,
            sampler:             a.sampler,
            sampler_seed:        a.sampler_seed,
            max_epochs:          a.max_epochs,
            batch_size:          a.batch_size,
            learning_rate:       a.lr,
            es_patience:         a.es_patience,
            lr_patience:         a.lr_patience,
            lr_factor:           a.lr_factor,
            min_lr:              a.min_lr,
            shuffle_seed:        a.shuffle_seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Quotes to predict for (same columns as the training CSV)
    #[arg(long)]
    pub input: String,

    /// Output CSV: row,kappa,theta,sigma,rho,v0,feller
    #[arg(long, default_value = "predictions.csv")]
    pub output: String,

    /// Directory written by `tune`
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_tune_defaults_match_config_defaults() {
        let cli = Cli::parse_from(["heston-tuner", "tune"]);
        let Commands::Tune(args) = cli.command else { panic!("expected tune") };
        let cfg: TuneConfig = args.into();
        let def = TuneConfig::default();
        assert_eq!(cfg.trials, def.trials);
        assert_eq!(cfg.max_epochs, def.max_epochs);
        assert_eq!(cfg.sampler, def.sampler);
        assert!((cfg.learning_rate - def.learning_rate).abs() < 1e-15);
    }

    #[test]
    fn test_sampler_flag_parses() {
        let cli = Cli::parse_from(["heston-tuner", "tune", "--sampler", "random", "--trials", "3"]);
        let Commands::Tune(args) = cli.command else { panic!("expected tune") };
        assert_eq!(args.sampler, SamplerKind::Random);
        assert_eq!(args.trials, 3);
    }

    #[test]
    fn test_predict_requires_input() {
        assert!(Cli::try_parse_from(["heston-tuner", "predict"]).is_err());
    }
}
