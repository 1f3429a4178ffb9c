// ============================================================
// Search — Search Controller
// ============================================================
// Drives the trial loop:
//
//   Init ──▶ Proposing ──▶ Evaluating ──▶ Recording ──┐
//               ▲                                     │
//               └──────────── budget left ────────────┤
//                                                     ▼
//                                                   Done
//
// Budget, deadline and cancellation are checked only between
// trials; an in-flight trial always runs to completion, so the
// best trial recorded so far stays valid after an early stop.
//
// The best index moves only on a strictly lower finite
// fitness. Failed trials rank as +∞ and can never be best;
// among equal fitnesses the earliest trial keeps the spot.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::domain::trial::Trial;
use crate::error::{TuneError, TuneResult};
use crate::search::objective::Objective;
use crate::search::sampler::ConfigurationSampler;
use crate::search::space::SearchSpace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Init,
    Proposing,
    Evaluating,
    Recording,
    Done,
}

/// Why the controller reached Done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    BudgetExhausted,
    DeadlineReached,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    pub max_trials: usize,
    /// Wall-clock limit measured from the start of `run`
    pub deadline:   Option<Duration>,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self { max_trials: 100, deadline: None }
    }
}

/// Cloneable flag that asks a running search to stop after the current trial.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub trials:      Vec<Trial>,
    /// Index into `trials`; None when no trial finished with a finite fitness
    pub best:        Option<usize>,
    pub stop_reason: StopReason,
    pub elapsed:     Duration,
}

impl SearchOutcome {
    pub fn best_trial(&self) -> Option<&Trial> {
        self.best.map(|i| &self.trials[i])
    }

    pub fn completed_count(&self) -> usize {
        self.trials.iter().filter(|t| t.is_completed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.trials.len() - self.completed_count()
    }
}

pub struct SearchController {
    space:   SearchSpace,
    sampler: Box<dyn ConfigurationSampler>,
    budget:  SearchBudget,
    cancel:  CancelHandle,
    phase:   SearchPhase,
    trials:  Vec<Trial>,
    best:    Option<usize>,
}

impl SearchController {
    pub fn new(space: SearchSpace, sampler: Box<dyn ConfigurationSampler>, budget: SearchBudget) -> TuneResult<Self> {
        space.validate()?;
        if budget.max_trials == 0 {
            return Err(TuneError::InvalidConfig("trial budget must be at least 1".into()));
        }
        Ok(Self {
            space,
            sampler,
            budget,
            cancel: CancelHandle::default(),
            phase:  SearchPhase::Init,
            trials: Vec::new(),
            best:   None,
        })
    }

    /// Share an existing flag instead of the controller's own.
    pub fn with_cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancel = handle;
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn best_trial(&self) -> Option<&Trial> {
        self.best.map(|i| &self.trials[i])
    }

    /// Run trials until the budget, the deadline or a cancel request ends the search.
    pub fn run(&mut self, objective: &mut dyn Objective) -> TuneResult<SearchOutcome> {
        if self.phase != SearchPhase::Init {
            return Err(TuneError::InvalidConfig("search controller has already run".into()));
        }
        let started = Instant::now();
        tracing::info!(
            "Starting search: sampler={}, max_trials={}, deadline={:?}",
            self.sampler.name(), self.budget.max_trials, self.budget.deadline,
        );

        let stop_reason = loop {
            if let Some(reason) = self.stop_condition(started) {
                break reason;
            }

            // ── Proposing ─────────────────────────────────────────────────────
            self.phase = SearchPhase::Proposing;
            let id     = self.trials.len();
            let config = self.sampler.propose(&self.space, &self.trials)?;

            // ── Evaluating ────────────────────────────────────────────────────
            self.phase = SearchPhase::Evaluating;
            let trial_start = Instant::now();
            let trial = match objective.evaluate(&config) {
                Ok(eval) => Trial::completed(id, config, eval.fitness, eval.history),
                Err(e) if e.is_recoverable_trial_failure() => {
                    tracing::warn!("Trial {} failed: {}", id, e);
                    Trial::failed(id, config, e.to_string())
                }
                Err(e) => return Err(e),
            };

            // ── Recording ─────────────────────────────────────────────────────
            self.phase = SearchPhase::Recording;
            self.record(trial);

            let trial = &self.trials[id];
            if trial.is_completed() {
                tracing::info!(
                    "Trial {:>3}/{} | {} | fitness={:.6} | epochs={} | {:.1}s",
                    id + 1,
                    self.budget.max_trials,
                    trial.config,
                    trial.ranking_fitness(),
                    trial.epochs_run(),
                    trial_start.elapsed().as_secs_f64(),
                );
            }
        };

        self.phase = SearchPhase::Done;
        let outcome = SearchOutcome {
            trials: self.trials.clone(),
            best: self.best,
            stop_reason,
            elapsed: started.elapsed(),
        };

        match outcome.best_trial() {
            Some(best) => tracing::info!(
                "Search finished ({:?}) after {} trials ({} failed); best trial {} {} fitness={:.6}",
                stop_reason, outcome.trials.len(), outcome.failed_count(), best.id, best.config, best.ranking_fitness(),
            ),
            None => tracing::warn!(
                "Search finished ({:?}) after {} trials without a viable trial",
                stop_reason, outcome.trials.len(),
            ),
        }
        Ok(outcome)
    }

    fn stop_condition(&self, started: Instant) -> Option<StopReason> {
        if self.cancel.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        if self.budget.deadline.is_some_and(|d| started.elapsed() >= d) {
            return Some(StopReason::DeadlineReached);
        }
        if self.trials.len() >= self.budget.max_trials {
            return Some(StopReason::BudgetExhausted);
        }
        None
    }

    fn record(&mut self, trial: Trial) {
        let fitness = trial.ranking_fitness();
        let improves = fitness.is_finite()
            && self
                .best
                .map_or(true, |b| fitness < self.trials[b].ranking_fitness());
        if improves {
            self.best = Some(trial.id);
        }
        self.trials.push(trial);
    }
}
