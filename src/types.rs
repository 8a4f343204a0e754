use crate::core::validate_step;
use crate::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};

// ===== RESULTS =====

/// Externally visible outcome of a strategy run
///
/// `value` is either finite and achieved at `params`, or `+inf` when no
/// feasible point was found within the search budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub params: Vec<f64>,
    pub value: f64,
    pub evaluations: usize,
    pub iterations: u64,
    /// Dimensions whose optimal coordinate lies on an interval end.
    pub boundary: Vec<usize>,
    pub message: String,
}

impl Outcome {
    pub fn new(params: Vec<f64>, value: f64, evaluations: usize, iterations: u64) -> Self {
        let message = if value.is_finite() {
            "Converged".to_string()
        } else {
            "No feasible point found".to_string()
        };
        Self {
            params,
            value,
            evaluations,
            iterations,
            boundary: Vec::new(),
            message,
        }
    }

    /// Outcome of a run that never saw a feasible point.
    pub fn infeasible(params: Vec<f64>, evaluations: usize, iterations: u64) -> Self {
        Self::new(params, f64::INFINITY, evaluations, iterations)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_boundary(mut self, boundary: Vec<usize>) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn is_feasible(&self) -> bool {
        self.value.is_finite()
    }

    pub fn on_boundary(&self) -> bool {
        !self.boundary.is_empty()
    }
}

// ===== STRATEGY PARAMETERS =====

/// Coefficients of the from-scratch Nelder-Mead simplex.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadParameters {
    pub reflection_alpha: f64,
    pub expansion_gamma: f64,
    pub contraction_beta: f64,
    pub shrink_sigma: f64,
    /// Stop once the sample standard deviation of vertex values drops below this.
    pub sd_min: f64,
    pub max_iterations: u64,
}

impl Default for NelderMeadParameters {
    fn default() -> Self {
        Self {
            reflection_alpha: 1.0,
            expansion_gamma: 2.0,
            contraction_beta: 0.5,
            shrink_sigma: 0.5,
            sd_min: 1e-2,
            max_iterations: 10_000,
        }
    }
}

impl NelderMeadParameters {
    pub fn with_coefficients(
        mut self,
        reflection_alpha: f64,
        expansion_gamma: f64,
        contraction_beta: f64,
        shrink_sigma: f64,
    ) -> Self {
        self.reflection_alpha = reflection_alpha;
        self.expansion_gamma = expansion_gamma;
        self.contraction_beta = contraction_beta;
        self.shrink_sigma = shrink_sigma;
        self
    }

    pub fn with_sd_min(mut self, sd_min: f64) -> Self {
        self.sd_min = sd_min;
        self
    }

    pub fn validate(&self) -> SearchResult<()> {
        validate_step("reflection_alpha", self.reflection_alpha)?;
        validate_step("sd_min", self.sd_min)?;
        if !(self.expansion_gamma > 1.0) {
            return Err(SearchError::InvalidStep {
                name: "expansion_gamma",
                value: self.expansion_gamma,
                reason: "must exceed 1",
            });
        }
        for (name, value) in [
            ("contraction_beta", self.contraction_beta),
            ("shrink_sigma", self.shrink_sigma),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(SearchError::InvalidStep {
                    name,
                    value,
                    reason: "must lie in (0, 1)",
                });
            }
        }
        Ok(())
    }
}

/// Temperature schedule for simulated annealing
///
/// Constructed once per run and read-only afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedAnnealingSchedule {
    pub temp_start: f64,
    pub cooling_factor: f64,
    /// Proposals per temperature level.
    pub rep_max: usize,
    pub search_radius: f64,
    /// Resampling budget when looking for a feasible neighbor.
    pub max_neighbor_attempts: usize,
    /// Hard cap on temperature levels; the run normally ends earlier, on the
    /// first level without any accepted move.
    pub max_levels: u64,
}

impl Default for SimulatedAnnealingSchedule {
    fn default() -> Self {
        Self {
            temp_start: 1000.0,
            cooling_factor: 0.95,
            rep_max: 10,
            search_radius: 0.8,
            max_neighbor_attempts: 100,
            max_levels: 100_000,
        }
    }
}

impl SimulatedAnnealingSchedule {
    pub fn new(temp_start: f64, cooling_factor: f64, rep_max: usize, search_radius: f64) -> Self {
        Self {
            temp_start,
            cooling_factor,
            rep_max,
            search_radius,
            ..Self::default()
        }
    }

    pub fn with_max_neighbor_attempts(mut self, attempts: usize) -> Self {
        self.max_neighbor_attempts = attempts;
        self
    }

    pub fn with_max_levels(mut self, levels: u64) -> Self {
        self.max_levels = levels;
        self
    }

    pub fn validate(&self) -> SearchResult<()> {
        if !(self.temp_start.is_finite() && self.temp_start > 0.0) {
            return Err(SearchError::InvalidSchedule {
                field: "temp_start",
                value: self.temp_start,
                reason: "must be finite and positive",
            });
        }
        if !(self.cooling_factor > 0.0 && self.cooling_factor < 1.0) {
            return Err(SearchError::InvalidSchedule {
                field: "cooling_factor",
                value: self.cooling_factor,
                reason: "must lie in (0, 1)",
            });
        }
        if self.rep_max == 0 {
            return Err(SearchError::InvalidSchedule {
                field: "rep_max",
                value: 0.0,
                reason: "at least one proposal per level is required",
            });
        }
        if self.max_neighbor_attempts == 0 {
            return Err(SearchError::InvalidSchedule {
                field: "max_neighbor_attempts",
                value: 0.0,
                reason: "at least one attempt is required",
            });
        }
        if !(self.search_radius.is_finite() && self.search_radius > 0.0) {
            return Err(SearchError::InvalidSchedule {
                field: "search_radius",
                value: self.search_radius,
                reason: "must be finite and positive",
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasinHoppingConfig {
    pub niter: usize,
    pub temperature: f64,
    pub stepsize: f64,
    /// Hops between step size adjustments.
    pub interval: usize,
    pub target_accept_rate: f64,
    pub step_factor: f64,
}

impl Default for BasinHoppingConfig {
    fn default() -> Self {
        Self {
            niter: 100,
            temperature: 1.0,
            stepsize: 0.5,
            interval: 50,
            target_accept_rate: 0.5,
            step_factor: 0.9,
        }
    }
}

impl BasinHoppingConfig {
    pub fn with_niter(mut self, niter: usize) -> Self {
        self.niter = niter;
        self
    }

    pub fn validate(&self) -> SearchResult<()> {
        validate_step("temperature", self.temperature)?;
        validate_step("stepsize", self.stepsize)?;
        if !(self.step_factor > 0.0 && self.step_factor < 1.0) {
            return Err(SearchError::InvalidStep {
                name: "step_factor",
                value: self.step_factor,
                reason: "must lie in (0, 1)",
            });
        }
        if self.interval == 0 {
            return Err(SearchError::InvalidConfig(
                "basin hopping interval must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifferentialEvolutionConfig {
    /// Population size is `popsize * dimension`.
    pub popsize: usize,
    pub max_generations: usize,
    /// Mutation factor is drawn from `[mutation_min, mutation_max)` every generation.
    pub mutation_min: f64,
    pub mutation_max: f64,
    pub recombination: f64,
    pub tol: f64,
    pub atol: f64,
    pub polish: bool,
}

impl Default for DifferentialEvolutionConfig {
    fn default() -> Self {
        Self {
            popsize: 15,
            max_generations: 1000,
            mutation_min: 0.5,
            mutation_max: 1.0,
            recombination: 0.7,
            tol: 0.01,
            atol: 0.0,
            polish: true,
        }
    }
}

impl DifferentialEvolutionConfig {
    pub fn with_max_generations(mut self, max_generations: usize) -> Self {
        self.max_generations = max_generations;
        self
    }

    pub fn with_polish(mut self, polish: bool) -> Self {
        self.polish = polish;
        self
    }

    pub fn validate(&self) -> SearchResult<()> {
        if self.popsize == 0 {
            return Err(SearchError::InvalidConfig(
                "differential evolution popsize must be positive".into(),
            ));
        }
        if !(0.0 <= self.mutation_min && self.mutation_min <= self.mutation_max && self.mutation_max <= 2.0) {
            return Err(SearchError::InvalidStep {
                name: "mutation",
                value: self.mutation_min,
                reason: "mutation range must satisfy 0 <= min <= max <= 2",
            });
        }
        if !(0.0..=1.0).contains(&self.recombination) {
            return Err(SearchError::InvalidStep {
                name: "recombination",
                value: self.recombination,
                reason: "must lie in [0, 1]",
            });
        }
        if !(self.tol >= 0.0 && self.atol >= 0.0) {
            return Err(SearchError::InvalidStep {
                name: "tol",
                value: self.tol,
                reason: "tolerances must be non-negative",
            });
        }
        Ok(())
    }
}
