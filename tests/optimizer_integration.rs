use ncoptimizer::{
    ComparisonConfig, InitialSimplex, NelderMeadParameters, ObjectiveError, OptMethod, Optimize,
    OptimizerConfig, SearchError, Setting, SettingNew, SimulatedAnnealingSchedule,
    compute_improvement, compute_improvements_par, compute_overhead, improvement_report,
};
use ObjectiveError::ParameterOutOfBounds;

/// Delay-probability bound of a single constant-rate server fed by i.i.d.
/// exponential increments, as a function of theta (and one Lyapunov exponent).
struct SingleServer {
    lambda: f64,
    rate: f64,
    delay: f64,
}

impl SingleServer {
    fn new(lambda: f64) -> Self {
        Self {
            lambda,
            rate: 2.0,
            delay: 4.0,
        }
    }

    /// Effective bandwidth of the exponential arrivals.
    fn rho_arrival(&self, theta: f64) -> Result<f64, ObjectiveError> {
        if theta <= 0.0 || theta >= self.lambda {
            return Err(ParameterOutOfBounds(format!("theta = {theta} outside (0, lambda)")));
        }
        Ok((self.lambda / (self.lambda - theta)).ln() / theta)
    }

    fn sigma(&self, theta: f64) -> Result<f64, ObjectiveError> {
        let rho = self.rho_arrival(theta)?;
        if rho >= self.rate {
            return Err(ParameterOutOfBounds("arrival rate >= service rate".into()));
        }
        Ok(1.0 / (1.0 - (theta * (rho - self.rate)).exp()))
    }

    fn decay(&self, theta: f64) -> f64 {
        (-theta * self.rate * self.delay).exp()
    }
}

impl Setting for SingleServer {
    fn bound(&self, param_list: &[f64]) -> Result<f64, ObjectiveError> {
        let theta = param_list[0];
        Ok(self.decay(theta) * self.sigma(theta)?)
    }
}

impl SettingNew for SingleServer {
    fn new_bound(&self, param_l_list: &[f64]) -> Result<f64, ObjectiveError> {
        let (theta, l) = (param_l_list[0], param_l_list[1]);
        if l <= 0.0 {
            return Err(ParameterOutOfBounds("Lyapunov exponent must be positive".into()));
        }
        Ok(self.decay(theta) * self.sigma(theta)?.powf(1.0 / l) * l.sqrt())
    }
}

/// A setting whose Lyapunov search lands above the standard bound.
struct Pessimistic(SingleServer);

impl Setting for Pessimistic {
    fn bound(&self, param_list: &[f64]) -> Result<f64, ObjectiveError> {
        self.0.bound(param_list)
    }
}

impl SettingNew for Pessimistic {
    fn new_bound(&self, param_l_list: &[f64]) -> Result<f64, ObjectiveError> {
        let l = param_l_list[1];
        Ok(1.5 * self.0.bound(&param_l_list[..1])? + (l - 1.0).powi(2))
    }
}

/// Lyapunov bound that is identically zero.
struct Degenerate(SingleServer);

impl Setting for Degenerate {
    fn bound(&self, param_list: &[f64]) -> Result<f64, ObjectiveError> {
        self.0.bound(param_list)
    }
}

impl SettingNew for Degenerate {
    fn new_bound(&self, _param_l_list: &[f64]) -> Result<f64, ObjectiveError> {
        Ok(0.0)
    }
}

const GRID_OPTIMUM: f64 = 0.020773334192682;

fn seeded() -> OptimizerConfig {
    OptimizerConfig::default().with_seed(7)
}

// ---- grid search scenarios ----

#[test]
fn parabola_grid_finds_interior_minimum() {
    let optimize = Optimize::new(|p: &[f64]| -> Result<f64, ObjectiveError> { Ok((p[0] - 2.0).powi(2)) })
        .show_warnings(true);

    let outcome = optimize.grid_search(&[(0.0, 5.0)], 0.1).unwrap();

    assert!((outcome.params[0] - 2.0).abs() < 1e-9);
    assert!(outcome.value < 1e-12);
    assert!(!outcome.on_boundary());
}

#[test]
fn pole_at_one_is_skipped_without_error() {
    let optimize = Optimize::new(|p: &[f64]| -> Result<f64, ObjectiveError> {
        if p[0] <= 1.0 {
            Err(ParameterOutOfBounds("x <= 1".into()))
        } else {
            Ok(1.0 / (p[0] - 1.0))
        }
    })
    .show_warnings(true);

    let outcome = optimize.grid_search(&[(0.0, 5.0)], 0.5).unwrap();

    // the upper end is on the grid, so the optimum lands on it
    assert_eq!(outcome.params, vec![5.0]);
    assert_eq!(outcome.value, 0.25);
    assert_eq!(outcome.boundary, vec![0]);
}

#[test]
fn fully_infeasible_grid_returns_infinity() {
    let optimize = Optimize::new(|_: &[f64]| -> Result<f64, ObjectiveError> {
        Err(ParameterOutOfBounds("unstable".into()))
    });

    let outcome = optimize.grid_search(&[(0.0, 5.0), (1.0, 2.0)], 0.5).unwrap();

    assert_eq!(outcome.value, f64::INFINITY);
    assert!(!outcome.is_feasible());
}

#[test]
fn grid_search_is_bit_reproducible() {
    let setting = SingleServer::new(1.0);
    let optimize = Optimize::standard(&setting, OptimizerConfig::default());

    let first = optimize.grid_search(&[(0.1, 4.0)], 0.1).unwrap();
    let second = optimize.grid_search(&[(0.1, 4.0)], 0.1).unwrap();

    assert_eq!(first.value.to_bits(), second.value.to_bits());
    assert_eq!(first.params, second.params);
    assert!((first.value - GRID_OPTIMUM).abs() < 1e-9);
}

// ---- the strategy set on an MGF bound ----

#[test]
fn every_strategy_beats_the_starting_point() {
    let setting = SingleServer::new(1.0);
    let optimize = Optimize::standard(&setting, seeded());
    let start = [0.5];
    let start_value = setting.bound(&start).unwrap();
    let simplex = || InitialSimplex::new(1).gao_han(&start).unwrap();

    let outcomes = [
        optimize.grid_search(&[(0.1, 4.0)], 0.1).unwrap(),
        optimize.pattern_search(&start, 3.0, 0.01).unwrap(),
        optimize.nelder_mead(simplex(), 1e-2).unwrap(),
        optimize
            .nelder_mead_classic(simplex(), NelderMeadParameters::default().with_sd_min(1e-8))
            .unwrap(),
        optimize
            .simulated_annealing(&start, SimulatedAnnealingSchedule::default())
            .unwrap(),
        optimize.basin_hopping(&start).unwrap(),
        optimize.differential_evolution(&[(0.1, 4.0)]).unwrap(),
        optimize.bfgs(&start).unwrap(),
    ];

    for outcome in &outcomes {
        assert!(outcome.is_feasible(), "{outcome:?}");
        assert!(outcome.value <= start_value, "{outcome:?}");
        assert!(outcome.params[0] > 0.0 && outcome.params[0] < 1.0);
    }
}

#[test]
fn global_and_fine_local_strategies_reach_the_grid_optimum() {
    let setting = SingleServer::new(1.0);
    let optimize = Optimize::standard(&setting, seeded());
    let simplex = InitialSimplex::new(1).gao_han(&[0.5]).unwrap();

    let values = [
        optimize.pattern_search(&[0.5], 3.0, 1e-4).unwrap().value,
        optimize
            .nelder_mead_classic(simplex, NelderMeadParameters::default().with_sd_min(1e-10))
            .unwrap()
            .value,
        optimize
            .simulated_annealing(&[0.5], SimulatedAnnealingSchedule::default())
            .unwrap()
            .value,
        optimize.differential_evolution(&[(0.1, 4.0)]).unwrap().value,
    ];

    for value in values {
        assert!(value <= GRID_OPTIMUM + 1e-9, "{value}");
    }
}

#[test]
fn abort_policy_reports_infinity_instead_of_failing() {
    let config = seeded().with_policy(ncoptimizer::NonFinitePolicy::AbortSearch);
    let optimize = Optimize::with_config(
        |p: &[f64]| -> Result<f64, ObjectiveError> { Ok(1.0 / p[0]) },
        config,
    );

    // 1 / 0 is +inf, which aborts the run
    let outcome = optimize.grid_search(&[(0.0, 1.0)], 0.5).unwrap();

    assert_eq!(outcome.value, f64::INFINITY);
}

#[test]
fn malformed_simplex_is_a_configuration_error() {
    let err = ncoptimizer::Simplex::new(vec![vec![0.1, 2.0], vec![0.3, 1.2]]).unwrap_err();
    assert!(matches!(err, SearchError::SimplexShape { rows: 2, cols: 2 }));
}

// ---- Lyapunov comparisons ----

#[test]
fn lyapunov_grid_search_improves_on_standard() {
    let setting = SingleServer::new(1.0);

    let improvement = compute_improvement(&setting, OptMethod::GridSearch, 1, &seeded()).unwrap();

    assert!((improvement.standard - GRID_OPTIMUM).abs() < 1e-9);
    assert!(improvement.new < improvement.standard);
    assert!(improvement.ratio() > 1.0);
}

#[test]
fn worse_lyapunov_result_is_clamped_to_standard() {
    let setting = Pessimistic(SingleServer::new(1.0));

    let improvement = compute_improvement(&setting, OptMethod::GridSearch, 1, &seeded()).unwrap();

    assert_eq!(improvement.new, improvement.standard);
    assert!((improvement.standard - GRID_OPTIMUM).abs() < 1e-9);
}

#[test]
fn zero_bound_makes_the_comparison_nan() {
    let setting = Degenerate(SingleServer::new(1.0));

    let improvement = compute_improvement(&setting, OptMethod::PatternSearch, 1, &seeded()).unwrap();

    assert!(improvement.standard.is_nan());
    assert!(improvement.new.is_nan());
}

#[test]
fn comparison_needs_a_lyapunov_exponent() {
    let setting = SingleServer::new(1.0);
    let result = compute_improvement(&setting, OptMethod::GridSearch, 0, &seeded());
    assert!(matches!(result, Err(SearchError::InvalidConfig(_))));
}

#[test]
fn overhead_is_only_measured_for_budgeted_methods() {
    let setting = SingleServer::new(1.0);

    let overhead = compute_overhead(&setting, OptMethod::GridSearch, 1, &seeded()).unwrap();
    assert!(overhead.standard >= 0.0 && overhead.lyapunov >= 0.0);

    assert!(compute_overhead(&setting, OptMethod::NelderMead, 1, &seeded()).is_ok());

    let err = compute_overhead(&setting, OptMethod::BasinHopping, 1, &seeded()).unwrap_err();
    assert!(matches!(err, SearchError::UnsupportedMethod { ref method } if method == "basin_hopping"));
}

#[test]
fn parallel_batch_matches_sequential_runs() {
    let settings: Vec<SingleServer> = [1.0, 1.5, 2.0].into_iter().map(SingleServer::new).collect();
    let config = ComparisonConfig {
        optimizer: seeded(),
        threads: Some(2),
    };

    let batch = compute_improvements_par(&settings, OptMethod::GridSearch, 1, &config).unwrap();

    assert_eq!(batch.len(), settings.len());
    for (setting, improvement) in settings.iter().zip(&batch) {
        let single = compute_improvement(setting, OptMethod::GridSearch, 1, &config.optimizer).unwrap();
        assert_eq!(improvement, &single);
    }
}

#[test]
fn report_lists_every_method_in_order() {
    let setting = SingleServer::new(1.0);

    let report = improvement_report(&setting, 1, &seeded()).unwrap();

    let methods: Vec<OptMethod> = report.keys().copied().collect();
    assert_eq!(methods, OptMethod::ALL.to_vec());
    for improvement in report.values() {
        assert!(improvement.new <= improvement.standard);
    }
    assert!(serde_json::to_string(&report).unwrap().contains("differential_evolution"));
}

#[test]
fn config_file_round_trip() {
    let path = std::env::temp_dir().join("ncoptimizer_config_test.json");
    std::fs::write(&path, r#"{"print_x": true, "show_warnings": true, "seed": 11}"#).unwrap();

    let config = OptimizerConfig::from_path(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(config.print_x && config.show_warnings);
    let setting = SingleServer::new(1.0);
    let outcome = Optimize::standard(&setting, config).grid_search(&[(0.1, 4.0)], 0.1).unwrap();
    assert!((outcome.value - GRID_OPTIMUM).abs() < 1e-9);
}
