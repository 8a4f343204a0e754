use crate::error::{ObjectiveError, SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// A bound (or any other objective) to be minimized over a parameter vector.
///
/// Implementations must be pure functions of `params`: strategies call them
/// many times, in any order.
pub trait Objective {
    fn value(&self, params: &[f64]) -> Result<f64, ObjectiveError>;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> Result<f64, ObjectiveError>,
{
    fn value(&self, params: &[f64]) -> Result<f64, ObjectiveError> {
        self(params)
    }
}

/// How the evaluator treats floating-point exceptions and non-finite results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonFinitePolicy {
    /// Every failure becomes `+inf` at the offending point.
    #[default]
    Infeasible,
    /// Out-of-bounds and overflow still become `+inf`, but floating-point
    /// exceptions and non-finite values abort the whole strategy run.
    AbortSearch,
}

/// Feasibility-safe wrapper around an [`Objective`]
///
/// This is the only place where objective failures are normalized; all
/// strategies see a total function that returns `+inf` on infeasible input.
pub struct Evaluator<'a> {
    objective: &'a dyn Objective,
    policy: NonFinitePolicy,
    evaluations: Cell<usize>,
}

impl<'a> Evaluator<'a> {
    pub fn new(objective: &'a dyn Objective, policy: NonFinitePolicy) -> Self {
        Self {
            objective,
            policy,
            evaluations: Cell::new(0),
        }
    }

    /// Number of objective calls made so far
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    /// Evaluate the objective, mapping infeasibility to `+inf`.
    ///
    /// Finite values are passed through unchanged. Only returns `Err` under
    /// [`NonFinitePolicy::AbortSearch`].
    pub fn eval(&self, params: &[f64]) -> SearchResult<f64> {
        self.evaluations.set(self.evaluations.get() + 1);

        match self.objective.value(params) {
            Ok(value) if value.is_finite() => Ok(value),
            Ok(value) => match self.policy {
                NonFinitePolicy::Infeasible => Ok(f64::INFINITY),
                NonFinitePolicy::AbortSearch => Err(SearchError::NonFinite {
                    reason: format!("objective returned {value} at {params:?}"),
                }),
            },
            Err(ObjectiveError::ParameterOutOfBounds(_)) | Err(ObjectiveError::Overflow(_)) => {
                Ok(f64::INFINITY)
            }
            Err(ObjectiveError::FloatingPoint(reason)) => match self.policy {
                NonFinitePolicy::Infeasible => Ok(f64::INFINITY),
                NonFinitePolicy::AbortSearch => Err(SearchError::NonFinite { reason }),
            },
        }
    }
}
