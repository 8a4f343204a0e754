use super::traits::Solver;
use crate::error::SearchResult;
use crate::optimization::callback::SearchCallback;
use crate::optimization::problem::Evaluator;
use crate::optimization::simplex::{Simplex, centroid_without, combine, sample_std, shrink_towards};
use crate::types::{NelderMeadParameters, Outcome};
use rand::rngs::StdRng;

/// Which move produced the next simplex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Reflection,
    Expansion,
    Contraction,
    Shrink,
}

/// Immutable snapshot of the simplex and its vertex values
#[derive(Clone, Debug, PartialEq)]
pub struct SimplexState {
    pub vertices: Vec<Vec<f64>>,
    pub values: Vec<f64>,
}

impl SimplexState {
    pub fn evaluate(simplex: &Simplex, evaluator: &Evaluator<'_>) -> SearchResult<Self> {
        let vertices = simplex.vertices().to_vec();
        let values = vertices
            .iter()
            .map(|v| evaluator.eval(v))
            .collect::<SearchResult<Vec<f64>>>()?;
        Ok(Self { vertices, values })
    }

    /// Vertex indices ordered by value, best first. Ties keep index order.
    fn order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| self.values[a].total_cmp(&self.values[b]));
        order
    }

    pub fn best_index(&self) -> usize {
        self.order()[0]
    }

    pub fn best_value(&self) -> f64 {
        self.values[self.best_index()]
    }

    pub fn spread(&self) -> f64 {
        sample_std(&self.values)
    }

    /// A simplex with an infeasible vertex has no finite spread and keeps iterating.
    pub fn converged(&self, sd_min: f64) -> bool {
        let sd = self.spread();
        sd.is_finite() && sd <= sd_min
    }

    fn replace(&self, index: usize, vertex: Vec<f64>, value: f64) -> Self {
        let mut next = self.clone();
        next.vertices[index] = vertex;
        next.values[index] = value;
        next
    }

    /// One Nelder-Mead iteration. `self` is left untouched.
    pub fn step(
        &self,
        coefficients: &NelderMeadParameters,
        evaluator: &Evaluator<'_>,
    ) -> SearchResult<(Self, Transition)> {
        let alpha = coefficients.reflection_alpha;
        let gamma = coefficients.expansion_gamma;
        let beta = coefficients.contraction_beta;
        let sigma = coefficients.shrink_sigma;

        let order = self.order();
        let n = order.len();
        let best = order[0];
        let second_worst = order[n - 2];
        let worst = order[n - 1];

        let centroid = centroid_without(&self.vertices, worst);
        let reflected = combine(1.0 + alpha, &centroid, -alpha, &self.vertices[worst]);
        let y_reflected = evaluator.eval(&reflected)?;

        if y_reflected < self.values[best] {
            let expanded = combine(gamma, &reflected, 1.0 - gamma, &centroid);
            let y_expanded = evaluator.eval(&expanded)?;

            return Ok(if y_expanded < y_reflected {
                (self.replace(worst, expanded, y_expanded), Transition::Expansion)
            } else {
                (self.replace(worst, reflected, y_reflected), Transition::Reflection)
            });
        }

        if y_reflected <= self.values[second_worst] {
            return Ok((self.replace(worst, reflected, y_reflected), Transition::Reflection));
        }

        // Reflection is worse than the second-worst vertex: contract.
        let base = if y_reflected < self.values[worst] {
            self.replace(worst, reflected, y_reflected)
        } else {
            self.clone()
        };

        let contracted = combine(beta, &base.vertices[worst], 1.0 - beta, &centroid);
        let y_contracted = evaluator.eval(&contracted)?;

        if y_contracted < base.values[worst] {
            return Ok((base.replace(worst, contracted, y_contracted), Transition::Contraction));
        }

        let vertices = shrink_towards(&base.vertices, best, sigma);
        let mut values = Vec::with_capacity(n);
        for (i, vertex) in vertices.iter().enumerate() {
            // the best vertex does not move
            if i == best {
                values.push(base.values[best]);
            } else {
                values.push(evaluator.eval(vertex)?);
            }
        }

        Ok((Self { vertices, values }, Transition::Shrink))
    }
}

/// From-scratch Nelder-Mead with explicit reflection/expansion/contraction/shrink coefficients
pub struct ClassicNelderMead {
    simplex: Simplex,
    coefficients: NelderMeadParameters,
}

impl ClassicNelderMead {
    pub fn new(simplex: Simplex, coefficients: NelderMeadParameters) -> Self {
        Self {
            simplex,
            coefficients,
        }
    }
}

impl Solver for ClassicNelderMead {
    fn name(&self) -> &str {
        "Nelder-Mead classic"
    }

    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        _rng: &mut StdRng,
        callback: &mut dyn SearchCallback,
    ) -> SearchResult<Outcome> {
        self.coefficients.validate()?;

        let mut state = SimplexState::evaluate(&self.simplex, evaluator)?;
        let mut best_value = state.best_value();
        if best_value.is_finite() {
            callback.on_improvement(0, &state.vertices[state.best_index()], best_value);
        }

        let mut iterations = 0u64;
        while !state.converged(self.coefficients.sd_min)
            && iterations < self.coefficients.max_iterations
        {
            let (next, transition) = state.step(&self.coefficients, evaluator)?;
            iterations += 1;
            tracing::trace!(iteration = iterations, ?transition, spread = next.spread(), "simplex step");
            state = next;

            let value = state.best_value();
            if value < best_value {
                best_value = value;
                callback.on_improvement(iterations, &state.vertices[state.best_index()], value);
            }
            if callback.should_stop() {
                break;
            }
        }

        let best = state.best_index();
        Ok(Outcome::new(
            state.vertices[best].clone(),
            state.values[best],
            evaluator.evaluations(),
            iterations,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObjectiveError;
    use crate::optimization::callback::HistoryCallback;
    use crate::optimization::problem::NonFinitePolicy;
    use crate::optimization::simplex::InitialSimplex;
    use rand::SeedableRng;

    fn bowl(p: &[f64]) -> Result<f64, ObjectiveError> {
        Ok((p[0] - 1.0).powi(2) + (p[1] - 2.0).powi(2) + 0.5)
    }

    #[test]
    fn step_never_worsens_the_best_vertex() {
        let evaluator = Evaluator::new(&bowl, NonFinitePolicy::Infeasible);
        let simplex = Simplex::new(vec![vec![0.1, 2.0], vec![0.3, 1.2], vec![0.4, 1.1]]).unwrap();
        let coefficients = NelderMeadParameters::default();
        let mut state = SimplexState::evaluate(&simplex, &evaluator).unwrap();

        for _ in 0..50 {
            let before = state.clone();
            let (next, _) = state.step(&coefficients, &evaluator).unwrap();
            assert!(next.best_value() <= before.best_value());
            // the previous snapshot is untouched
            assert_eq!(before, state);
            state = next;
        }
    }

    #[test]
    fn reflection_toward_minimum_expands() {
        let evaluator = Evaluator::new(&bowl, NonFinitePolicy::Infeasible);
        let simplex = Simplex::new(vec![vec![-2.0, -1.0], vec![-1.9, -1.0], vec![-2.0, -0.9]]).unwrap();
        let state = SimplexState::evaluate(&simplex, &evaluator).unwrap();

        let (_, transition) = state.step(&NelderMeadParameters::default(), &evaluator).unwrap();

        assert_eq!(transition, Transition::Expansion);
    }

    #[test]
    fn converges_to_bowl_minimum() {
        let evaluator = Evaluator::new(&bowl, NonFinitePolicy::Infeasible);
        let simplex = InitialSimplex::new(2).gao_han(&[0.5, 1.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut history = HistoryCallback::new();

        let outcome = ClassicNelderMead::new(simplex, NelderMeadParameters::default().with_sd_min(1e-8))
            .solve(&evaluator, &mut rng, &mut history)
            .unwrap();

        assert!((outcome.value - 0.5).abs() < 1e-4);
        assert!((outcome.params[0] - 1.0).abs() < 1e-2);
        assert!((outcome.params[1] - 2.0).abs() < 1e-2);
        assert!(history.is_monotone());
    }

    #[test]
    fn infeasible_vertex_is_pushed_out() {
        let f = |p: &[f64]| -> Result<f64, ObjectiveError> {
            if p[0] <= 0.0 {
                Err(ObjectiveError::ParameterOutOfBounds("theta must be positive".into()))
            } else {
                Ok((p[0] - 1.0).powi(2))
            }
        };
        let evaluator = Evaluator::new(&f, NonFinitePolicy::Infeasible);
        // asymmetric around the minimum, so no reflection lands on a mirror value
        let simplex = Simplex::new(vec![vec![-0.5], vec![0.3]]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = ClassicNelderMead::new(simplex, NelderMeadParameters::default())
            .solve(&evaluator, &mut rng, &mut HistoryCallback::new())
            .unwrap();

        assert!(outcome.is_feasible());
        assert!((outcome.params[0] - 1.0).abs() < 0.2);
    }
}
