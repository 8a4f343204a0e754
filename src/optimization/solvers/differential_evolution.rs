use super::library_simplex::SimplexSearch;
use super::traits::{Incumbent, Solver};
use crate::core::{boundary_hits, validate_bounds};
use crate::error::SearchResult;
use crate::optimization::callback::{NoopCallback, SearchCallback};
use crate::optimization::problem::Evaluator;
use crate::optimization::simplex::InitialSimplex;
use crate::types::{DifferentialEvolutionConfig, Outcome};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Smallest population regardless of `popsize * d`.
const MIN_POPULATION: usize = 5;

const POLISH_TOLERANCE: f64 = 1e-10;

/// Differential evolution, `best/1/bin` with dithered mutation
///
/// The population lives in the unit cube and is scaled onto the bounds for
/// evaluation. Trial coordinates that leave the cube are resampled uniformly.
/// Improvements replace their parent immediately, so later trials of the
/// same generation already mutate around the new best member.
pub struct DifferentialEvolution {
    bounds: Vec<(f64, f64)>,
    config: DifferentialEvolutionConfig,
}

impl DifferentialEvolution {
    pub fn new(bounds: Vec<(f64, f64)>, config: DifferentialEvolutionConfig) -> Self {
        Self { bounds, config }
    }

    fn population_size(&self) -> usize {
        (self.config.popsize * self.bounds.len()).max(MIN_POPULATION)
    }

    fn scale(&self, unit: &[f64]) -> Vec<f64> {
        unit.iter()
            .zip(&self.bounds)
            .map(|(u, &(lo, hi))| lo + u * (hi - lo))
            .collect()
    }

    fn within_bounds(&self, params: &[f64]) -> bool {
        params
            .iter()
            .zip(&self.bounds)
            .all(|(x, &(lo, hi))| lo <= *x && *x <= hi)
    }

    /// Polish the best member with a simplex search; kept only if it is
    /// lower and still inside the bounds.
    fn polish(
        &self,
        evaluator: &Evaluator<'_>,
        rng: &mut StdRng,
        best: &Incumbent,
    ) -> SearchResult<Option<(Vec<f64>, f64)>> {
        let simplex = InitialSimplex::new(best.params.len()).gao_han(&best.params)?;
        let polished = SimplexSearch::new(simplex, POLISH_TOLERANCE).solve(evaluator, rng, &mut NoopCallback)?;

        if polished.value < best.value && self.within_bounds(&polished.params) {
            Ok(Some((polished.params, polished.value)))
        } else {
            Ok(None)
        }
    }
}

/// Latin hypercube sample of `n` points in the `d`-dimensional unit cube.
fn latin_hypercube(n: usize, d: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let segment = 1.0 / n as f64;
    let mut population = vec![vec![0.0; d]; n];

    for j in 0..d {
        let mut strata: Vec<usize> = (0..n).collect();
        strata.shuffle(rng);
        for (member, stratum) in population.iter_mut().zip(strata) {
            member[j] = (stratum as f64 + rng.r#gen::<f64>()) * segment;
        }
    }
    population
}

/// `k` distinct member indices, none equal to `exclude`.
fn distinct_indices(rng: &mut StdRng, n: usize, exclude: usize, k: usize) -> Vec<usize> {
    let mut picked = Vec::with_capacity(k);
    while picked.len() < k {
        let r = rng.gen_range(0..n);
        if r != exclude && !picked.contains(&r) {
            picked.push(r);
        }
    }
    picked
}

/// Population standard deviation and mean; NaN when any energy is infinite.
fn energy_spread(energies: &[f64]) -> (f64, f64) {
    let n = energies.len() as f64;
    let mean = energies.iter().sum::<f64>() / n;
    let var = energies.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
    (var.sqrt(), mean)
}

impl Solver for DifferentialEvolution {
    fn name(&self) -> &str {
        "differential evolution"
    }

    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        rng: &mut StdRng,
        callback: &mut dyn SearchCallback,
    ) -> SearchResult<Outcome> {
        validate_bounds(&self.bounds)?;
        self.config.validate()?;
        let config = self.config;

        let d = self.bounds.len();
        let n = self.population_size();

        let mut population = latin_hypercube(n, d, rng);
        let mut energies = population
            .iter()
            .map(|member| evaluator.eval(&self.scale(member)))
            .collect::<SearchResult<Vec<f64>>>()?;

        let mut best_index = 0;
        for (i, &e) in energies.iter().enumerate() {
            if e < energies[best_index] {
                best_index = i;
            }
        }

        let mut best = Incumbent::new(self.scale(&population[best_index]), f64::INFINITY);
        best.offer(&self.scale(&population[best_index]), energies[best_index], 0, callback);

        let mut generations = 0u64;
        for generation in 1..=config.max_generations {
            generations = generation as u64;

            let mutation = if config.mutation_min < config.mutation_max {
                rng.gen_range(config.mutation_min..config.mutation_max)
            } else {
                config.mutation_min
            };

            for i in 0..n {
                let r = distinct_indices(rng, n, i, 2);
                let fill_point = rng.gen_range(0..d);

                let mut trial = population[i].clone();
                for j in 0..d {
                    if j == fill_point || rng.r#gen::<f64>() < config.recombination {
                        trial[j] = population[best_index][j]
                            + mutation * (population[r[0]][j] - population[r[1]][j]);
                    }
                }
                for x in trial.iter_mut() {
                    if !(0.0..=1.0).contains(x) {
                        *x = rng.r#gen::<f64>();
                    }
                }

                let scaled = self.scale(&trial);
                let energy = evaluator.eval(&scaled)?;
                if energy <= energies[i] {
                    population[i] = trial;
                    energies[i] = energy;
                    if energy < energies[best_index] {
                        best_index = i;
                    }
                    best.offer(&scaled, energy, generations, callback);
                }
            }

            let (spread, mean) = energy_spread(&energies);
            tracing::trace!(generation, spread, best = best.value, "differential evolution generation");
            if spread <= config.atol + config.tol * mean.abs() {
                break;
            }
            if callback.should_stop() {
                break;
            }
        }

        let mut message = None;
        if config.polish && best.value.is_finite() {
            if let Some((params, value)) = self.polish(evaluator, rng, &best)? {
                tracing::debug!(before = best.value, after = value, "polish improved the best member");
                best.offer(&params, value, generations, callback);
            } else {
                message = Some("Converged; polish did not improve the best member");
            }
        }

        let boundary = if best.value.is_finite() {
            boundary_hits(&best.params, &self.bounds)
        } else {
            Vec::new()
        };

        let mut outcome = Outcome::new(best.params, best.value, evaluator.evaluations(), generations)
            .with_boundary(boundary);
        if let Some(message) = message {
            outcome = outcome.with_message(message);
        }
        Ok(outcome)
    }
}
