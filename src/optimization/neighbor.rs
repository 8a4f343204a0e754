use crate::error::SearchResult;
use crate::optimization::problem::Evaluator;
use rand::Rng;

/// A proposed point together with its already-computed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub params: Vec<f64>,
    pub value: f64,
}

/// Uniform sample from the box of half-width `radius` around `center`.
pub fn sample_neighbor<R: Rng + ?Sized>(center: &[f64], radius: f64, rng: &mut R) -> Vec<f64> {
    center
        .iter()
        .map(|c| c + rng.gen_range(-radius..=radius))
        .collect()
}

/// Draw neighbors of `center` until one is feasible or the budget runs out.
///
/// When every attempt is infeasible the last draw is returned with value
/// `+inf`, so callers always get a candidate back.
pub fn search_feasible_neighbor<R: Rng + ?Sized>(
    evaluator: &Evaluator<'_>,
    center: &[f64],
    radius: f64,
    max_attempts: usize,
    rng: &mut R,
) -> SearchResult<Candidate> {
    let mut last = Candidate {
        params: center.to_vec(),
        value: f64::INFINITY,
    };

    for _ in 0..max_attempts.max(1) {
        let params = sample_neighbor(center, radius, rng);
        let value = evaluator.eval(&params)?;
        if value.is_finite() {
            return Ok(Candidate { params, value });
        }
        last = Candidate { params, value };
    }

    tracing::debug!(max_attempts, ?center, "no feasible neighbor found");
    Ok(last)
}
