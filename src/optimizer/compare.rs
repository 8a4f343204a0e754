//! Standard bound vs. Lyapunov bound, per optimization method.
use std::fmt;
use std::iter;
use std::time::Instant;

use super::lyapunov::SettingNew;
use super::{ComparisonConfig, Optimize, OptimizerConfig};
use crate::error::{SearchError, SearchResult};
use crate::optimization::InitialSimplex;
use crate::types::SimulatedAnnealingSchedule;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const THETA_BOUNDS: (f64, f64) = (0.1, 4.0);
const L_BOUNDS: (f64, f64) = (0.9, 4.0);
const THETA_BOUNDS_DE: (f64, f64) = (0.1, 8.0);
const L_BOUNDS_DE: (f64, f64) = (0.9, 8.0);
const GRID_DELTA: f64 = 0.1;
const THETA_START: f64 = 0.5;
const L_START: f64 = 1.0;
const PATTERN_DELTA: f64 = 3.0;
const PATTERN_DELTA_MIN: f64 = 0.01;
const SD_MIN: f64 = 1e-2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptMethod {
    GridSearch,
    PatternSearch,
    NelderMead,
    BasinHopping,
    SimulatedAnnealing,
    DifferentialEvolution,
}

impl OptMethod {
    pub const ALL: [OptMethod; 6] = [
        OptMethod::GridSearch,
        OptMethod::PatternSearch,
        OptMethod::NelderMead,
        OptMethod::BasinHopping,
        OptMethod::SimulatedAnnealing,
        OptMethod::DifferentialEvolution,
    ];
}

impl fmt::Display for OptMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptMethod::GridSearch => "grid_search",
            OptMethod::PatternSearch => "pattern_search",
            OptMethod::NelderMead => "nelder_mead",
            OptMethod::BasinHopping => "basin_hopping",
            OptMethod::SimulatedAnnealing => "simulated_annealing",
            OptMethod::DifferentialEvolution => "differential_evolution",
        };
        f.write_str(name)
    }
}

/// Optimized standard and Lyapunov bound for one scenario
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    pub standard: f64,
    pub new: f64,
}

impl Improvement {
    /// Apply the comparison rules to two raw optimization results.
    ///
    /// The Lyapunov bound is never worse than the standard one in exact
    /// arithmetic, so a larger `new` is clamped down to `standard`. This hides
    /// search imprecision; it is not a correctness guarantee. A bound of
    /// exactly 0 makes the pair meaningless and both become NaN.
    pub fn clamped(standard: f64, new: f64) -> Self {
        let new = if new > standard { standard } else { new };
        if standard == 0.0 || new == 0.0 {
            return Self {
                standard: f64::NAN,
                new: f64::NAN,
            };
        }
        Self { standard, new }
    }

    /// `standard / new`; above 1 when the Lyapunov bound is tighter.
    pub fn ratio(&self) -> f64 {
        self.standard / self.new
    }
}

/// Wall-clock seconds spent on each half of a comparison
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overhead {
    pub standard: f64,
    pub lyapunov: f64,
}

fn require_lyapunov_exponents(number_l: usize) -> SearchResult<()> {
    if number_l == 0 {
        return Err(SearchError::InvalidConfig(
            "a Lyapunov comparison needs at least one extra exponent".into(),
        ));
    }
    Ok(())
}

fn extended_bounds(theta: (f64, f64), l: (f64, f64), number_l: usize) -> Vec<(f64, f64)> {
    iter::once(theta).chain(iter::repeat(l).take(number_l)).collect()
}

fn extended_start(number_l: usize) -> Vec<f64> {
    iter::once(THETA_START)
        .chain(iter::repeat(L_START).take(number_l))
        .collect()
}

/// Optimize both bounds of `setting` with `method` and compare them.
pub fn compute_improvement<S: SettingNew + ?Sized>(
    setting: &S,
    method: OptMethod,
    number_l: usize,
    config: &OptimizerConfig,
) -> SearchResult<Improvement> {
    require_lyapunov_exponents(number_l)?;

    let standard_opt = Optimize::standard(setting, config.clone());
    let new_opt = Optimize::lyapunov(setting, config.clone());
    let start = [THETA_START];
    let start_new = extended_start(number_l);

    let (standard, new) = match method {
        OptMethod::GridSearch => (
            standard_opt.grid_search(&[THETA_BOUNDS], GRID_DELTA)?.value,
            new_opt
                .grid_search(&extended_bounds(THETA_BOUNDS, L_BOUNDS, number_l), GRID_DELTA)?
                .value,
        ),
        OptMethod::PatternSearch => (
            standard_opt
                .pattern_search(&start, PATTERN_DELTA, PATTERN_DELTA_MIN)?
                .value,
            new_opt
                .pattern_search(&start_new, PATTERN_DELTA, PATTERN_DELTA_MIN)?
                .value,
        ),
        OptMethod::NelderMead => {
            let simplex = InitialSimplex::new(1).gao_han(&start)?;
            let simplex_new = InitialSimplex::new(number_l + 1).gao_han(&start_new)?;
            (
                standard_opt.nelder_mead(simplex, SD_MIN)?.value,
                new_opt.nelder_mead(simplex_new, SD_MIN)?.value,
            )
        }
        OptMethod::BasinHopping => (
            standard_opt.basin_hopping(&start)?.value,
            new_opt.basin_hopping(&start_new)?.value,
        ),
        OptMethod::SimulatedAnnealing => {
            let schedule = SimulatedAnnealingSchedule::default();
            (
                standard_opt.simulated_annealing(&start, schedule)?.value,
                new_opt.simulated_annealing(&start_new, schedule)?.value,
            )
        }
        OptMethod::DifferentialEvolution => (
            standard_opt.differential_evolution(&[THETA_BOUNDS_DE])?.value,
            new_opt
                .differential_evolution(&extended_bounds(THETA_BOUNDS_DE, L_BOUNDS_DE, number_l))?
                .value,
        ),
    };

    tracing::debug!(%method, standard, new, "bounds computed");
    Ok(Improvement::clamped(standard, new))
}

/// Time the standard and the Lyapunov run of `method` on `setting`.
///
/// Only the deterministic-budget methods are timed: grid search, pattern
/// search and Nelder-Mead (from a random simplex).
pub fn compute_overhead<S: SettingNew + ?Sized>(
    setting: &S,
    method: OptMethod,
    number_l: usize,
    config: &OptimizerConfig,
) -> SearchResult<Overhead> {
    require_lyapunov_exponents(number_l)?;

    let standard_opt = Optimize::standard(setting, config.clone());
    let new_opt = Optimize::lyapunov(setting, config.clone());

    let overhead = match method {
        OptMethod::GridSearch => {
            let timer = Instant::now();
            standard_opt.grid_search(&[THETA_BOUNDS], GRID_DELTA)?;
            let standard = timer.elapsed().as_secs_f64();

            let bounds = extended_bounds(THETA_BOUNDS, L_BOUNDS, number_l);
            let timer = Instant::now();
            new_opt.grid_search(&bounds, GRID_DELTA)?;
            Overhead {
                standard,
                lyapunov: timer.elapsed().as_secs_f64(),
            }
        }
        OptMethod::PatternSearch => {
            let timer = Instant::now();
            standard_opt.pattern_search(&[THETA_START], PATTERN_DELTA, PATTERN_DELTA_MIN)?;
            let standard = timer.elapsed().as_secs_f64();

            let start_new = extended_start(number_l);
            let timer = Instant::now();
            new_opt.pattern_search(&start_new, PATTERN_DELTA, PATTERN_DELTA_MIN)?;
            Overhead {
                standard,
                lyapunov: timer.elapsed().as_secs_f64(),
            }
        }
        OptMethod::NelderMead => {
            let mut rng = config.rng();
            let simplex = InitialSimplex::new(1).uniform_dist(1.0, 2.0, &mut rng)?;
            let simplex_new = InitialSimplex::new(number_l + 1).uniform_dist(1.0, 2.0, &mut rng)?;

            let timer = Instant::now();
            standard_opt.nelder_mead(simplex, SD_MIN)?;
            let standard = timer.elapsed().as_secs_f64();

            let timer = Instant::now();
            new_opt.nelder_mead(simplex_new, SD_MIN)?;
            Overhead {
                standard,
                lyapunov: timer.elapsed().as_secs_f64(),
            }
        }
        other => {
            return Err(SearchError::UnsupportedMethod {
                method: other.to_string(),
            });
        }
    };

    Ok(overhead)
}

/// [`compute_improvement`] over many independent settings in parallel.
///
/// Results keep the order of `settings`.
pub fn compute_improvements_par<S: SettingNew + Sync>(
    settings: &[S],
    method: OptMethod,
    number_l: usize,
    config: &ComparisonConfig,
) -> SearchResult<Vec<Improvement>> {
    let threads = config.thread_count();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| SearchError::ThreadPool(e.to_string()))?;

    tracing::debug!(settings = settings.len(), threads, %method, "starting batch comparison");

    pool.install(|| {
        settings
            .par_iter()
            .map(|setting| compute_improvement(setting, method, number_l, &config.optimizer))
            .collect()
    })
}

/// Every method's comparison for one setting, in [`OptMethod::ALL`] order.
pub fn improvement_report<S: SettingNew + ?Sized>(
    setting: &S,
    number_l: usize,
    config: &OptimizerConfig,
) -> SearchResult<IndexMap<OptMethod, Improvement>> {
    OptMethod::ALL
        .iter()
        .map(|&method| Ok((method, compute_improvement(setting, method, number_l, config)?)))
        .collect()
}
