use super::traits::{Incumbent, Solver};
use crate::core::{boundary_hits, validate_bounds, validate_step};
use crate::error::{SearchError, SearchResult};
use crate::optimization::callback::SearchCallback;
use crate::optimization::problem::Evaluator;
use crate::types::Outcome;
use rand::rngs::StdRng;

/// Tolerance added to the upper end so that `hi` itself is tested when it
/// lies on the grid.
const GRID_SLACK: f64 = 1e-10;

/// Largest number of points a single grid may contain.
pub const MAX_GRID_POINTS: usize = 100_000_000;

/// Exhaustive search over the Cartesian product of
/// `lo, lo + delta, lo + 2 delta, ... <= hi` in every dimension
pub struct GridSearch {
    bounds: Vec<(f64, f64)>,
    delta: f64,
}

impl GridSearch {
    pub fn new(bounds: Vec<(f64, f64)>, delta: f64) -> Self {
        Self { bounds, delta }
    }

    /// Number of grid points in each dimension.
    ///
    /// Fails when `delta` is so small that the grid would exceed
    /// [`MAX_GRID_POINTS`].
    pub fn axis_lengths(&self) -> SearchResult<Vec<usize>> {
        let too_fine = || SearchError::InvalidStep {
            name: "delta",
            value: self.delta,
            reason: "grid would exceed the maximum number of points",
        };

        let mut total: usize = 1;
        let mut lengths = Vec::with_capacity(self.bounds.len());
        for &(lo, hi) in &self.bounds {
            let steps = ((hi - lo) / self.delta + GRID_SLACK).floor();
            if !steps.is_finite() || steps >= MAX_GRID_POINTS as f64 {
                return Err(too_fine());
            }
            let len = (steps as usize).checked_add(1).ok_or_else(too_fine)?;
            total = total
                .checked_mul(len)
                .filter(|&t| t <= MAX_GRID_POINTS)
                .ok_or_else(too_fine)?;
            lengths.push(len);
        }
        Ok(lengths)
    }

    #[inline]
    fn point(&self, index: &[usize], out: &mut [f64]) {
        for ((x, &(lo, _)), &k) in out.iter_mut().zip(&self.bounds).zip(index) {
            *x = lo + k as f64 * self.delta;
        }
    }
}

/// Advance a mixed-radix counter, last dimension fastest. Returns false on wrap-around.
fn next_index(index: &mut [usize], lengths: &[usize]) -> bool {
    for (k, &len) in index.iter_mut().zip(lengths).rev() {
        *k += 1;
        if *k < len {
            return true;
        }
        *k = 0;
    }
    false
}

impl Solver for GridSearch {
    fn name(&self) -> &str {
        "grid search"
    }

    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        _rng: &mut StdRng,
        callback: &mut dyn SearchCallback,
    ) -> SearchResult<Outcome> {
        validate_bounds(&self.bounds)?;
        validate_step("delta", self.delta)?;

        let lengths = self.axis_lengths()?;
        let mut index = vec![0usize; self.bounds.len()];
        let mut point = vec![0.0; self.bounds.len()];
        self.point(&index, &mut point);

        let mut best = Incumbent::new(point.clone(), f64::INFINITY);
        let mut tested = 0u64;

        loop {
            self.point(&index, &mut point);
            let value = evaluator.eval(&point)?;
            tested += 1;
            best.offer(&point, value, tested, callback);

            if callback.should_stop() || !next_index(&mut index, &lengths) {
                break;
            }
        }

        let boundary = if best.value.is_finite() {
            boundary_hits(&best.params, &self.bounds)
        } else {
            Vec::new()
        };

        Ok(Outcome::new(best.params, best.value, evaluator.evaluations(), tested)
            .with_boundary(boundary))
    }
}
