use super::bfgs::minimize_locally;
use super::traits::{Incumbent, Solver};
use crate::core::validate_start;
use crate::error::SearchResult;
use crate::optimization::callback::{NoopCallback, SearchCallback};
use crate::optimization::neighbor::sample_neighbor;
use crate::optimization::problem::Evaluator;
use crate::types::{BasinHoppingConfig, Outcome};
use rand::Rng;
use rand::rngs::StdRng;

/// Basin hopping: random jumps followed by a local BFGS descent
///
/// A hop is kept by the Metropolis rule at `temperature`. Every `interval`
/// hops the jump size is scaled by `step_factor` to steer the acceptance rate
/// toward `target_accept_rate`.
pub struct BasinHopping {
    start: Vec<f64>,
    config: BasinHoppingConfig,
}

impl BasinHopping {
    pub fn new(start: Vec<f64>, config: BasinHoppingConfig) -> Self {
        Self { start, config }
    }

    fn local_iterations(&self) -> u64 {
        200 * self.start.len() as u64
    }
}

/// Metropolis criterion; `u` is uniform on `[0, 1)`.
///
/// A hop between two infeasible points (`inf - inf`) is rejected.
fn metropolis_accepts(current: f64, trial: f64, temperature: f64, u: f64) -> bool {
    if trial < current {
        return true;
    }
    let rise = trial - current;
    if rise.is_nan() {
        return false;
    }
    let w = (-rise / temperature).min(0.0).exp();
    w >= u
}

impl Solver for BasinHopping {
    fn name(&self) -> &str {
        "basin hopping"
    }

    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        rng: &mut StdRng,
        callback: &mut dyn SearchCallback,
    ) -> SearchResult<Outcome> {
        validate_start(&self.start)?;
        self.config.validate()?;
        let config = self.config;
        let local_iters = self.local_iterations();

        let first = minimize_locally(evaluator, &self.start, local_iters, &mut NoopCallback)?;
        let mut current = first.params;
        let mut current_value = first.value;

        let mut best = Incumbent::new(current.clone(), f64::INFINITY);
        best.offer(&current, current_value, 0, callback);

        let mut stepsize = config.stepsize;
        let mut accepted_in_window = 0usize;
        let mut hops = 0u64;

        for hop in 1..=config.niter {
            hops = hop as u64;

            let jumped = sample_neighbor(&current, stepsize, rng);
            let trial = minimize_locally(evaluator, &jumped, local_iters, &mut NoopCallback)?;

            let u = rng.r#gen::<f64>();
            if metropolis_accepts(current_value, trial.value, config.temperature, u) {
                current = trial.params;
                current_value = trial.value;
                accepted_in_window += 1;
                best.offer(&current, current_value, hops, callback);
            }

            if hop % config.interval == 0 {
                let rate = accepted_in_window as f64 / config.interval as f64;
                if rate > config.target_accept_rate {
                    stepsize /= config.step_factor;
                } else {
                    stepsize *= config.step_factor;
                }
                accepted_in_window = 0;
                tracing::debug!(hop, rate, stepsize, "basin hopping adjusted step size");
            }

            if callback.should_stop() {
                break;
            }
        }

        Ok(Outcome::new(best.params, best.value, evaluator.evaluations(), hops))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObjectiveError;
    use crate::optimization::callback::HistoryCallback;
    use crate::optimization::problem::NonFinitePolicy;
    use rand::SeedableRng;

    #[test]
    fn metropolis_always_takes_downhill_moves() {
        assert!(metropolis_accepts(1.0, 0.5, 1.0, 0.999));
        assert!(!metropolis_accepts(1.0, f64::INFINITY, 1.0, 0.1));
    }

    #[test]
    fn metropolis_rejects_hops_between_infeasible_points() {
        assert!(!metropolis_accepts(f64::INFINITY, f64::INFINITY, 1.0, 0.1));
        assert!(!metropolis_accepts(f64::INFINITY, f64::INFINITY, 1.0, 0.0));
        assert!(metropolis_accepts(f64::INFINITY, 2.0, 1.0, 0.99));
    }

    #[test]
    fn escapes_local_minimum_of_double_well() {
        // local minimum near x = 0.96, global near x = -1.04
        let f = |p: &[f64]| -> Result<f64, ObjectiveError> {
            let x = p[0];
            Ok((x * x - 1.0).powi(2) + 0.3 * x)
        };
        let evaluator = Evaluator::new(&f, NonFinitePolicy::Infeasible);
        let mut rng = StdRng::seed_from_u64(11);
        let mut history = HistoryCallback::new();
        let config = BasinHoppingConfig {
            stepsize: 1.5,
            ..BasinHoppingConfig::default()
        }
        .with_niter(30);

        let outcome = BasinHopping::new(vec![1.0], config)
            .solve(&evaluator, &mut rng, &mut history)
            .unwrap();

        assert!(outcome.params[0] < 0.0);
        assert!(history.is_monotone());
        assert_eq!(outcome.iterations, 30);
    }

    #[test]
    fn fully_infeasible_objective_returns_infinity() {
        let f = |_: &[f64]| -> Result<f64, ObjectiveError> {
            Err(ObjectiveError::Overflow("exp".into()))
        };
        let evaluator = Evaluator::new(&f, NonFinitePolicy::Infeasible);
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = BasinHopping::new(vec![0.3, 0.7], BasinHoppingConfig::default().with_niter(5))
            .solve(&evaluator, &mut rng, &mut HistoryCallback::new())
            .unwrap();

        assert!(!outcome.is_feasible());
        assert_eq!(outcome.params, vec![0.3, 0.7]);
    }
}
