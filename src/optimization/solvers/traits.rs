use crate::error::SearchResult;
use crate::optimization::callback::SearchCallback;
use crate::optimization::problem::Evaluator;
use crate::types::Outcome;
use rand::rngs::StdRng;

/// Search strategy interface
///
/// A solver owns its tuning parameters (bounds, step sizes, schedule, ...)
/// and minimizes whatever the evaluator wraps. Deterministic solvers ignore
/// `rng`.
pub trait Solver {
    fn name(&self) -> &str;

    /// Run the search to completion.
    ///
    /// Configuration problems come back as `Err`; a search that never found a
    /// feasible point returns `Ok` with a `+inf` outcome.
    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        rng: &mut StdRng,
        callback: &mut dyn SearchCallback,
    ) -> SearchResult<Outcome>;
}

/// Best point seen so far, shared by the from-scratch strategies.
#[derive(Debug, Clone)]
pub(crate) struct Incumbent {
    pub params: Vec<f64>,
    pub value: f64,
}

impl Incumbent {
    pub fn new(params: Vec<f64>, value: f64) -> Self {
        Self { params, value }
    }

    /// Replace the incumbent if `value` is strictly better; reports the
    /// improvement to `callback`.
    pub fn offer(
        &mut self,
        params: &[f64],
        value: f64,
        iteration: u64,
        callback: &mut dyn SearchCallback,
    ) -> bool {
        if value < self.value {
            self.params.clear();
            self.params.extend_from_slice(params);
            self.value = value;
            callback.on_improvement(iteration, params, value);
            true
        } else {
            false
        }
    }
}
