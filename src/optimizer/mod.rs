mod compare;
mod config;
mod lyapunov;

pub use compare::{
    Improvement, OptMethod, Overhead, compute_improvement, compute_improvements_par,
    compute_overhead, improvement_report,
};
pub use config::{ComparisonConfig, OptimizerConfig};
pub use lyapunov::{LyapunovBound, Setting, SettingNew, StandardBound};

use crate::error::{ObjectiveError, SearchResult};
use crate::optimization::{
    BasinHopping, Bfgs, ClassicNelderMead, DifferentialEvolution, Evaluator, GridSearch,
    NoopCallback, Objective, PatternSearch, SearchCallback, Simplex, SimplexSearch,
    SimulatedAnnealing, Solver,
};
use crate::types::{
    BasinHoppingConfig, DifferentialEvolutionConfig, NelderMeadParameters, Outcome,
    SimulatedAnnealingSchedule,
};

/// Entry point for minimizing one objective with any of the strategies
///
/// Holds the objective and the diagnostic switches. Every strategy call
/// builds a fresh evaluator (and a fresh generator for the stochastic ones),
/// so calls never share state.
pub struct Optimize<O: Objective> {
    objective: O,
    config: OptimizerConfig,
}

impl<O: Objective> Optimize<O> {
    pub fn new(objective: O) -> Self {
        Self::with_config(objective, OptimizerConfig::default())
    }

    pub fn with_config(objective: O, config: OptimizerConfig) -> Self {
        Self { objective, config }
    }

    pub fn print_x(mut self, print_x: bool) -> Self {
        self.config.print_x = print_x;
        self
    }

    pub fn show_warnings(mut self, show_warnings: bool) -> Self {
        self.config.show_warnings = show_warnings;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// The objective itself, without the infeasible-to-infinity mapping.
    pub fn evaluate(&self, params: &[f64]) -> Result<f64, ObjectiveError> {
        self.objective.value(params)
    }

    /// The objective as the strategies see it: infeasible points are `+inf`.
    pub fn evaluate_safe(&self, params: &[f64]) -> SearchResult<f64> {
        Evaluator::new(&self.objective, self.config.non_finite).eval(params)
    }

    pub fn grid_search(&self, bounds: &[(f64, f64)], delta: f64) -> SearchResult<Outcome> {
        self.run(&mut GridSearch::new(bounds.to_vec(), delta))
    }

    pub fn pattern_search(&self, start: &[f64], delta: f64, delta_min: f64) -> SearchResult<Outcome> {
        self.run(&mut PatternSearch::new(start.to_vec(), delta, delta_min))
    }

    pub fn nelder_mead(&self, simplex: Simplex, tolerance: f64) -> SearchResult<Outcome> {
        self.run(&mut SimplexSearch::new(simplex, tolerance))
    }

    pub fn nelder_mead_classic(
        &self,
        simplex: Simplex,
        parameters: NelderMeadParameters,
    ) -> SearchResult<Outcome> {
        self.run(&mut ClassicNelderMead::new(simplex, parameters))
    }

    pub fn simulated_annealing(
        &self,
        start: &[f64],
        schedule: SimulatedAnnealingSchedule,
    ) -> SearchResult<Outcome> {
        self.run(&mut SimulatedAnnealing::new(start.to_vec(), schedule))
    }

    pub fn basin_hopping(&self, start: &[f64]) -> SearchResult<Outcome> {
        self.basin_hopping_with(start, BasinHoppingConfig::default())
    }

    pub fn basin_hopping_with(&self, start: &[f64], config: BasinHoppingConfig) -> SearchResult<Outcome> {
        self.run(&mut BasinHopping::new(start.to_vec(), config))
    }

    pub fn differential_evolution(&self, bounds: &[(f64, f64)]) -> SearchResult<Outcome> {
        self.differential_evolution_with(bounds, DifferentialEvolutionConfig::default())
    }

    pub fn differential_evolution_with(
        &self,
        bounds: &[(f64, f64)],
        config: DifferentialEvolutionConfig,
    ) -> SearchResult<Outcome> {
        self.run(&mut DifferentialEvolution::new(bounds.to_vec(), config))
    }

    pub fn bfgs(&self, start: &[f64]) -> SearchResult<Outcome> {
        self.run(&mut Bfgs::new(start.to_vec()))
    }

    fn run(&self, solver: &mut dyn Solver) -> SearchResult<Outcome> {
        self.solve_with(solver, &mut NoopCallback)
    }

    /// Run any strategy against this objective.
    ///
    /// A run aborted by [`NonFinitePolicy::AbortSearch`](crate::optimization::NonFinitePolicy)
    /// comes back as a `+inf` outcome with empty `params`; configuration
    /// errors are returned as they are.
    pub fn solve_with(
        &self,
        solver: &mut dyn Solver,
        callback: &mut dyn SearchCallback,
    ) -> SearchResult<Outcome> {
        let evaluator = Evaluator::new(&self.objective, self.config.non_finite);
        let mut rng = self.config.rng();

        let outcome = match solver.solve(&evaluator, &mut rng, callback) {
            Ok(outcome) => outcome,
            Err(err) if err.is_non_finite() => {
                tracing::debug!(solver = solver.name(), error = %err, "run aborted on non-finite value");
                Outcome::infeasible(Vec::new(), evaluator.evaluations(), 0).with_message(err.to_string())
            }
            Err(err) => return Err(err),
        };

        self.report(solver.name(), &outcome);
        Ok(outcome)
    }

    fn report(&self, solver: &str, outcome: &Outcome) {
        if self.config.print_x {
            tracing::info!(solver, x = ?outcome.params, value = outcome.value, "{solver} optimal x");
        }
        if self.config.show_warnings && outcome.on_boundary() {
            tracing::warn!(
                solver,
                x = ?outcome.params,
                dimensions = ?outcome.boundary,
                "optimal x is on the boundary, consider widening the search interval"
            );
        }
    }
}
