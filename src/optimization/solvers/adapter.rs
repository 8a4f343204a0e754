//! Adapter that exposes an [`Evaluator`] as an `argmin` problem.
//!
//! The traits are implemented on `&ArgminAdapter` so an executor can borrow
//! the adapter and the caller still owns it once the run is over.
//!
//! The adapter remembers the best point it has been asked to evaluate. When
//! an argmin run fails half way (a line search stepping into an infeasible
//! region, a non-finite gradient) the caller can still report that point
//! instead of losing the whole run.
use std::cell::RefCell;

use crate::error::{SearchError, SearchResult};
use crate::optimization::callback::SearchCallback;
use crate::optimization::problem::Evaluator;
use crate::types::Outcome;
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

pub type Param = Vec<f64>;

pub struct ArgminAdapter<'e, 'a> {
    evaluator: &'e Evaluator<'a>,
    best: RefCell<Option<(Param, f64)>>,
    /// Every strict improvement of a finite best value, tagged with the
    /// evaluation count at which it was seen.
    trail: RefCell<Vec<(u64, Param, f64)>>,
}

impl<'e, 'a> ArgminAdapter<'e, 'a> {
    pub fn new(evaluator: &'e Evaluator<'a>) -> Self {
        Self {
            evaluator,
            best: RefCell::new(None),
            trail: RefCell::new(Vec::new()),
        }
    }

    fn record(&self, params: &Param, value: f64) {
        let mut best = self.best.borrow_mut();
        let improves = match best.as_ref() {
            Some((_, v)) => value < *v,
            None => true,
        };
        if improves {
            *best = Some((params.clone(), value));
            if value.is_finite() {
                let evaluations = self.evaluator.evaluations() as u64;
                self.trail.borrow_mut().push((evaluations, params.clone(), value));
            }
        }
    }

    /// Hand the recorded improvements to `callback`, oldest first.
    pub fn replay(&self, callback: &mut dyn SearchCallback) {
        for (evaluation, params, value) in self.trail.borrow().iter() {
            callback.on_improvement(*evaluation, params, *value);
        }
    }

    /// Best evaluated point, or `fallback` with `+inf` if nothing was evaluated.
    pub fn best_or(&self, fallback: &[f64]) -> (Param, f64) {
        self.best
            .borrow()
            .clone()
            .unwrap_or_else(|| (fallback.to_vec(), f64::INFINITY))
    }
}

impl CostFunction for &ArgminAdapter<'_, '_> {
    type Param = Param;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, Error> {
        let value = self.evaluator.eval(params)?;
        self.record(params, value);
        Ok(value)
    }
}

impl Gradient for &ArgminAdapter<'_, '_> {
    type Param = Param;
    type Gradient = Param;

    /// Central finite differences of the cost.
    ///
    /// The FD closure must return `f64`, so evaluation errors are parked in
    /// a slot and re-raised afterwards. A gradient with non-finite entries
    /// means the stencil touched an infeasible point; that ends the run.
    fn gradient(&self, params: &Self::Param) -> Result<Self::Gradient, Error> {
        let closure_err: RefCell<Option<SearchError>> = RefCell::new(None);
        let cost_func = |p: &Param| -> f64 {
            match self.evaluator.eval(p) {
                Ok(v) => v,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };

        let grad = params.central_diff(&cost_func);
        if let Some(err) = closure_err.take() {
            return Err(err.into());
        }
        if let Some((index, value)) = grad.iter().enumerate().find(|(_, g)| !g.is_finite()) {
            return Err(SearchError::Backend {
                text: format!("non-finite gradient component {index}: {value}"),
            }
            .into());
        }
        Ok(grad)
    }
}

/// Turn an argmin run into an [`Outcome`].
///
/// A finished run reports its best state; a failed run falls back to the
/// best point the adapter saw. Non-finite aborts are passed on untouched so
/// the facade can apply its policy.
pub fn finish_run(
    run: Result<(Option<Param>, f64, u64), Error>,
    adapter: &ArgminAdapter<'_, '_>,
    start: &[f64],
    solver_name: &str,
) -> SearchResult<Outcome> {
    let evaluations = adapter.evaluator.evaluations();
    match run {
        Ok((best_param, best_cost, iterations)) => {
            let (seen_params, seen_value) = adapter.best_or(start);
            // Prefer whichever is lower; argmin's best state can lag behind
            // points probed by a line search.
            let (params, value) = match best_param {
                Some(p) if best_cost <= seen_value => (p, best_cost),
                _ => (seen_params, seen_value),
            };
            Ok(Outcome::new(params, value, evaluations, iterations))
        }
        Err(err) => {
            let err = SearchError::from(err);
            if err.is_non_finite() {
                return Err(err);
            }
            tracing::debug!(solver = solver_name, error = %err, "backend stopped early, using best observed point");
            let (params, value) = adapter.best_or(start);
            Ok(Outcome::new(params, value, evaluations, 0)
                .with_message(format!("Stopped early: {err}")))
        }
    }
}
