use super::adapter::{ArgminAdapter, Param, finish_run};
use super::traits::Solver;
use crate::core::validate_start;
use crate::error::SearchResult;
use crate::optimization::callback::SearchCallback;
use crate::optimization::problem::Evaluator;
use crate::types::Outcome;
use argmin::core::{Executor, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::BFGS;
use rand::rngs::StdRng;

const GRADIENT_TOLERANCE: f64 = 1e-5;

fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

/// Run argmin's BFGS from `start` and fold the result into an [`Outcome`].
///
/// Shared by [`Bfgs`] and the local phase of basin hopping. Improvements
/// seen along the way are replayed to `callback` once the run is over.
pub(crate) fn minimize_locally(
    evaluator: &Evaluator<'_>,
    start: &[f64],
    max_iters: u64,
    callback: &mut dyn SearchCallback,
) -> SearchResult<Outcome> {
    let adapter = ArgminAdapter::new(evaluator);
    let linesearch: MoreThuenteLineSearch<Param, Param, f64> = MoreThuenteLineSearch::new();
    let solver: BFGS<_, f64> = BFGS::new(linesearch).with_tolerance_grad(GRADIENT_TOLERANCE)?;

    let init_param: Param = start.to_vec();
    let init_hessian = identity(start.len());

    let run = Executor::new(&adapter, solver)
        .configure(|state| {
            state
                .param(init_param)
                .inv_hessian(init_hessian)
                .max_iters(max_iters)
        })
        .run()
        .map(|res| {
            let state = res.state();
            (state.get_best_param().cloned(), state.get_best_cost(), state.get_iter())
        });

    let outcome = finish_run(run, &adapter, start, "BFGS")?;
    adapter.replay(callback);
    Ok(outcome)
}

/// Quasi-Newton minimization with finite-difference gradients
///
/// Needs only a starting point. Whatever stops the run (converged gradient,
/// failed line search, gradient across an infeasibility edge) the outcome is
/// the lowest point evaluated so far.
pub struct Bfgs {
    start: Vec<f64>,
    max_iterations: Option<u64>,
}

impl Bfgs {
    pub fn new(start: Vec<f64>) -> Self {
        Self {
            start,
            max_iterations: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

impl Solver for Bfgs {
    fn name(&self) -> &str {
        "BFGS"
    }

    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        _rng: &mut StdRng,
        callback: &mut dyn SearchCallback,
    ) -> SearchResult<Outcome> {
        validate_start(&self.start)?;
        let max_iters = self
            .max_iterations
            .unwrap_or(200 * self.start.len() as u64);

        minimize_locally(evaluator, &self.start, max_iters, callback)
    }
}
