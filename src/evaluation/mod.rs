//! Precision/sensitivity metrics and the acceptance state machine.
//!
//! Each tuning iteration produces a relevant/non-relevant split of a
//! candidate batch. From it this module computes
//!
//! - sensitivity = R / (R + G) * 100
//! - precision   = R / (R + N) * 100
//!
//! (R relevant, N non-relevant, G goal set size) and decides whether the
//! configuration behind the batch replaces the best one accepted so far.
//!
//! The tracker has two states. In [`AcceptanceState::Unset`] the first
//! evaluation is accepted unconditionally. In
//! [`AcceptanceState::Established`] two hard gates apply first (a sensitivity
//! floor that cannot be lost once reached, and a precision ceiling), followed
//! by a magnitude comparison against the accepted metrics. Note that in that
//! comparison a *lower* precision counts as the improvement.
//!
//! Rejected runs never touch the accepted state; their metrics remain
//! available through [`AcceptanceTracker::last_attempt`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::ClassifierConfig;

/// Errors for inputs on which the metrics are undefined.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvaluationError {
    /// No candidate papers, so precision would divide by zero
    #[error("Candidate batch is empty; precision is undefined")]
    EmptyBatch,

    /// No goal papers, so sensitivity would be meaningless
    #[error("Goal set is empty; sensitivity is undefined")]
    EmptyGoalSet,
}

/// Result type for evaluation operations.
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Precision and sensitivity of one batch, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub precision: f64,
    pub sensitivity: f64,
}

impl Metrics {
    /// Compute the metrics of a batch.
    ///
    /// # Arguments
    /// * `relevant` - Candidates classified relevant (R)
    /// * `non_relevant` - Candidates classified non-relevant (N)
    /// * `goal_size` - Size of the goal set (G)
    ///
    /// # Errors
    /// Returns `EvaluationError::EmptyGoalSet` when `goal_size` is zero and
    /// `EvaluationError::EmptyBatch` when `relevant + non_relevant` is zero
    pub fn compute(relevant: usize, non_relevant: usize, goal_size: usize) -> EvaluationResult<Self> {
        if goal_size == 0 {
            return Err(EvaluationError::EmptyGoalSet);
        }
        if relevant + non_relevant == 0 {
            return Err(EvaluationError::EmptyBatch);
        }

        let r = relevant as f64;
        Ok(Self {
            sensitivity: r / (r + goal_size as f64) * 100.0,
            precision: r / (r + non_relevant as f64) * 100.0,
        })
    }
}

/// The accepted-so-far best configuration outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestState {
    /// Accepted precision, in percent
    pub precision: f64,

    /// Accepted sensitivity, in percent
    pub sensitivity: f64,

    /// Relevant candidates of the accepted run
    pub relevant_count: usize,

    /// Non-relevant candidates of the accepted run
    pub non_relevant_count: usize,
}

/// Whether a configuration has been accepted yet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AcceptanceState {
    /// Nothing accepted yet
    #[default]
    Unset,

    /// A configuration has been accepted
    Established(BestState),
}

/// Why a configuration was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// First evaluation; always accepted
    FirstEvaluation,

    /// Sensitivity rose and precision fell
    BothImproved,

    /// Only sensitivity improved, by more than precision moved
    SensitivityGainOutweighs,

    /// Only precision improved, by more than sensitivity moved
    PrecisionGainOutweighs,

    /// Sensitivity dropped below the floor it had reached before
    BelowSensitivityFloor,

    /// Precision crossed the ceiling while the accepted one was below it
    AbovePrecisionCeiling,

    /// Neither metric improved enough
    NotImproved,
}

impl Decision {
    pub fn is_accepted(self) -> bool {
        matches!(
            self,
            Decision::FirstEvaluation
                | Decision::BothImproved
                | Decision::SensitivityGainOutweighs
                | Decision::PrecisionGainOutweighs
        )
    }

    /// Short human-readable label.
    pub fn describe(self) -> &'static str {
        match self {
            Decision::FirstEvaluation => "accepted: first evaluation",
            Decision::BothImproved => "accepted: both metrics improved",
            Decision::SensitivityGainOutweighs => "accepted: sensitivity gain outweighs",
            Decision::PrecisionGainOutweighs => "accepted: precision gain outweighs",
            Decision::BelowSensitivityFloor => "rejected: sensitivity fell below floor",
            Decision::AbovePrecisionCeiling => "rejected: precision crossed ceiling",
            Decision::NotImproved => "rejected: not an improvement",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Compare a batch against the accepted metrics, gates included.
///
/// # Arguments
/// * `best` - Currently accepted state
/// * `metrics` - Metrics of the new batch
/// * `sensitivity_floor` - Recall floor in percent (80 by default)
/// * `precision_ceiling` - Precision ceiling in percent (60 by default)
pub fn compare(
    best: &BestState,
    metrics: &Metrics,
    sensitivity_floor: f64,
    precision_ceiling: f64,
) -> Decision {
    if metrics.sensitivity < sensitivity_floor && best.sensitivity >= sensitivity_floor {
        return Decision::BelowSensitivityFloor;
    }
    if metrics.precision >= precision_ceiling && best.precision < precision_ceiling {
        return Decision::AbovePrecisionCeiling;
    }

    let precision_diff = metrics.precision - best.precision;
    let sensitivity_diff = metrics.sensitivity - best.sensitivity;

    let sensitivity_better = sensitivity_diff > 0.0;
    let precision_better = precision_diff < 0.0;

    match (sensitivity_better, precision_better) {
        (true, true) => Decision::BothImproved,
        (true, false) if sensitivity_diff > precision_diff => Decision::SensitivityGainOutweighs,
        (false, true) if precision_diff.abs() > sensitivity_diff.abs() => {
            Decision::PrecisionGainOutweighs
        }
        _ => Decision::NotImproved,
    }
}

/// Holds the accepted state across tuning iterations.
///
/// One tracker belongs to one tuning session; independent sessions use
/// independent trackers.
#[derive(Debug, Clone)]
pub struct AcceptanceTracker {
    state: AcceptanceState,
    sensitivity_floor: f64,
    precision_ceiling: f64,
    last_attempt: Option<Metrics>,
    evaluations: usize,
}

impl AcceptanceTracker {
    /// Create a tracker in the `Unset` state.
    pub fn new(sensitivity_floor: f64, precision_ceiling: f64) -> Self {
        Self {
            state: AcceptanceState::Unset,
            sensitivity_floor,
            precision_ceiling,
            last_attempt: None,
            evaluations: 0,
        }
    }

    /// Create a tracker with the gates of a classifier configuration.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.sensitivity_floor, config.precision_ceiling)
    }

    /// Decide on a batch without recording anything.
    pub fn decide(&self, metrics: &Metrics) -> Decision {
        match &self.state {
            AcceptanceState::Unset => Decision::FirstEvaluation,
            AcceptanceState::Established(best) => {
                compare(best, metrics, self.sensitivity_floor, self.precision_ceiling)
            }
        }
    }

    /// Decide on a batch and, if accepted, make it the new best.
    ///
    /// The metrics are kept as the last attempt either way.
    pub fn record(&mut self, metrics: Metrics, relevant: usize, non_relevant: usize) -> Decision {
        let decision = self.decide(&metrics);
        self.evaluations += 1;
        self.last_attempt = Some(metrics);

        debug!(
            precision = metrics.precision,
            sensitivity = metrics.sensitivity,
            relevant,
            non_relevant,
            "evaluated batch"
        );

        if decision.is_accepted() {
            self.state = AcceptanceState::Established(BestState {
                precision: metrics.precision,
                sensitivity: metrics.sensitivity,
                relevant_count: relevant,
                non_relevant_count: non_relevant,
            });
        }

        info!(
            "Evaluation #{}: precision {:.2}%, sensitivity {:.2}% ({})",
            self.evaluations, metrics.precision, metrics.sensitivity, decision
        );

        decision
    }

    pub fn state(&self) -> &AcceptanceState {
        &self.state
    }

    /// The accepted state, if any.
    pub fn best(&self) -> Option<&BestState> {
        match &self.state {
            AcceptanceState::Unset => None,
            AcceptanceState::Established(best) => Some(best),
        }
    }

    /// Metrics of the most recent evaluation, accepted or not.
    pub fn last_attempt(&self) -> Option<&Metrics> {
        self.last_attempt.as_ref()
    }

    /// Number of evaluations recorded so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}
