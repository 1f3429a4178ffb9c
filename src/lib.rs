//! Hyperparameter search and training for a feed-forward regressor that maps
//! option-quote features to Heston model parameters.
//!
//! The pipeline is exposed as a library; the `heston-tuner` binary is a thin
//! clap front-end over [`application::tune_use_case::TuneUseCase`] and
//! [`application::predict_use_case::PredictUseCase`].

#![recursion_limit = "256"]

pub mod application;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;
pub mod ml;
pub mod search;
