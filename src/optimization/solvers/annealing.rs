use super::traits::{Incumbent, Solver};
use crate::core::validate_start;
use crate::error::SearchResult;
use crate::optimization::callback::SearchCallback;
use crate::optimization::neighbor::search_feasible_neighbor;
use crate::optimization::problem::Evaluator;
use crate::types::{Outcome, SimulatedAnnealingSchedule};
use rand::Rng;
use rand::rngs::StdRng;

/// Simulated annealing with a geometric cooling schedule
///
/// Every temperature level makes `rep_max` proposals. A proposal that improves
/// on the current point is always accepted; a worse one is accepted when
/// `exp((current - candidate) / T)` exceeds a uniform threshold drawn at the
/// start of the level. The run ends after the first level in which no
/// proposal was accepted (or at `max_levels`).
pub struct SimulatedAnnealing {
    start: Vec<f64>,
    schedule: SimulatedAnnealingSchedule,
}

impl SimulatedAnnealing {
    pub fn new(start: Vec<f64>, schedule: SimulatedAnnealingSchedule) -> Self {
        Self { start, schedule }
    }
}

impl Solver for SimulatedAnnealing {
    fn name(&self) -> &str {
        "simulated annealing"
    }

    fn solve(
        &mut self,
        evaluator: &Evaluator<'_>,
        rng: &mut StdRng,
        callback: &mut dyn SearchCallback,
    ) -> SearchResult<Outcome> {
        validate_start(&self.start)?;
        self.schedule.validate()?;
        let schedule = self.schedule;

        let mut current = self.start.clone();
        let mut current_value = evaluator.eval(&current)?;

        let mut best = Incumbent::new(current.clone(), f64::INFINITY);
        best.offer(&current, current_value, 0, callback);

        let mut temperature = schedule.temp_start;
        let mut levels = 0u64;
        let mut changed = true;

        while changed && levels < schedule.max_levels {
            changed = false;
            levels += 1;

            let thresholds: Vec<f64> = (0..schedule.rep_max).map(|_| rng.r#gen::<f64>()).collect();

            for threshold in thresholds {
                let candidate = search_feasible_neighbor(
                    evaluator,
                    &current,
                    schedule.search_radius,
                    schedule.max_neighbor_attempts,
                    rng,
                )?;

                if candidate.value < current_value {
                    current = candidate.params;
                    current_value = candidate.value;
                    changed = true;
                    best.offer(&current, current_value, levels, callback);
                } else if ((current_value - candidate.value) / temperature).exp() > threshold {
                    // uphill move; inf - inf is NaN and never passes
                    current = candidate.params;
                    current_value = candidate.value;
                    changed = true;
                }
            }

            temperature *= schedule.cooling_factor;
            tracing::trace!(level = levels, temperature, current_value, best = best.value, "annealing level done");

            if callback.should_stop() {
                break;
            }
        }

        if changed && levels >= schedule.max_levels {
            tracing::debug!(levels, "simulated annealing stopped at the level cap");
        }

        Ok(Outcome::new(best.params, best.value, evaluator.evaluations(), levels))
    }
}
