use super::adapter::{ArgminAdapter, Param, finish_run};
use super::traits::Solver;
use crate::core::validate_step;
use crate::error::SearchResult;
use crate::optimization::callback::SearchCallback;
use crate::optimization::problem::Evaluator;
use crate::optimization::simplex::Simplex;
use crate::types::Outcome;
use argmin::core::{Executor, State};
use argmin::solver::neldermead::NelderMead;
use rand::rngs::StdRng;

/// Nelder-Mead backed by `argmin`, seeded with an explicit simplex
///
/// Stops once the standard deviation of the vertex costs falls below
/// `tolerance`, or after `200 * d` iterations.
pub struct SimplexSearch {
    simplex: Simplex,
    tolerance: f64,
    max_iterations: Option<u64>,
}

impl SimplexSearch {
    pub fn new(simplex: Simplex, tolerance: f64) -> Self {
        Self {
            simplex,
            tolerance,
            max_iterations: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    fn iteration_cap(&self) -> u64 {
        self.max_iterations
            .unwrap_or(200 * self.simplex.dimension() as u64)
    }
}

impl Solver for SimplexSearch {
    fn name(&self) -> &str {
        "Nelder-Mead"
    }

    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        _rng: &mut StdRng,
        callback: &mut dyn SearchCallback,
    ) -> SearchResult<Outcome> {
        validate_step("tolerance", self.tolerance)?;

        let vertices: Vec<Param> = self.simplex.vertices().to_vec();
        let start = vertices[0].clone();
        let max_iters = self.iteration_cap();

        let adapter = ArgminAdapter::new(evaluator);
        let solver: NelderMead<Param, f64> =
            NelderMead::new(vertices).with_sd_tolerance(self.tolerance)?;

        let run = Executor::new(&adapter, solver)
            .configure(|state| state.max_iters(max_iters))
            .run()
            .map(|res| {
                let state = res.state();
                (state.get_best_param().cloned(), state.get_best_cost(), state.get_iter())
            });

        let outcome = finish_run(run, &adapter, &start, self.name())?;
        adapter.replay(callback);
        Ok(outcome)
    }
}
