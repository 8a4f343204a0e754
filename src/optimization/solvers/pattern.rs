use super::traits::Solver;
use crate::core::{validate_start, validate_step};
use crate::error::{SearchError, SearchResult};
use crate::optimization::callback::SearchCallback;
use crate::optimization::problem::Evaluator;
use crate::types::Outcome;
use rand::rngs::StdRng;

/// Hooke-Jeeves pattern search
///
/// Exploratory moves of `+-delta` along each axis, followed by a pattern step
/// `2 * new - old` after every successful exploration. `delta` is halved
/// whenever exploration fails; the search ends at `delta <= delta_min`.
pub struct PatternSearch {
    start: Vec<f64>,
    delta: f64,
    delta_min: f64,
    max_iterations: u64,
}

impl PatternSearch {
    pub fn new(start: Vec<f64>, delta: f64, delta_min: f64) -> Self {
        Self {
            start,
            delta,
            delta_min,
            max_iterations: 10_000,
        }
    }

    /// Cap on outer iterations, for objectives that keep improving forever.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// One exploratory sweep around `base`. Returns the explored point and its value.
    fn explore(
        &self,
        evaluator: &Evaluator<'_>,
        base: &[f64],
        base_value: f64,
        delta: f64,
    ) -> SearchResult<(Vec<f64>, f64)> {
        let mut explored = base.to_vec();
        let mut explored_value = base_value;

        for i in 0..base.len() {
            let value = base[i];

            explored[i] = value + delta;
            let candidate_plus = evaluator.eval(&explored)?;

            explored[i] = value - delta;
            let candidate_minus = evaluator.eval(&explored)?;

            if candidate_plus < explored_value {
                explored[i] = value + delta;
                explored_value = candidate_plus;
            } else if candidate_minus < explored_value {
                explored[i] = value - delta;
                explored_value = candidate_minus;
            } else {
                explored[i] = value;
            }
        }

        Ok((explored, explored_value))
    }
}

impl Solver for PatternSearch {
    fn name(&self) -> &str {
        "pattern search"
    }

    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        _rng: &mut StdRng,
        callback: &mut dyn SearchCallback,
    ) -> SearchResult<Outcome> {
        validate_start(&self.start)?;
        validate_step("delta", self.delta)?;
        validate_step("delta_min", self.delta_min)?;
        if self.max_iterations == 0 {
            return Err(SearchError::InvalidConfig(
                "pattern search needs at least one iteration".into(),
            ));
        }

        let mut base = self.start.clone();
        let mut base_value = evaluator.eval(&base)?;
        if base_value.is_finite() {
            callback.on_improvement(0, &base, base_value);
        }

        let mut delta = self.delta;
        let mut iterations = 0u64;

        while delta > self.delta_min && iterations < self.max_iterations {
            iterations += 1;

            let (explored, explored_value) = self.explore(evaluator, &base, base_value, delta)?;

            if explored_value < base_value {
                // exploration succeeded, try to extrapolate along the same direction
                let pattern: Vec<f64> = explored
                    .iter()
                    .zip(&base)
                    .map(|(new, old)| 2.0 * new - old)
                    .collect();

                base = explored;
                base_value = explored_value;

                let pattern_value = evaluator.eval(&pattern)?;
                if pattern_value < base_value {
                    base = pattern;
                    base_value = pattern_value;
                }
                callback.on_improvement(iterations, &base, base_value);
            } else {
                delta *= 0.5;
                tracing::trace!(delta, "pattern search halved step");
            }

            if callback.should_stop() {
                break;
            }
        }

        Ok(Outcome::new(base, base_value, evaluator.evaluations(), iterations))
    }
}
