use std::path::Path;

use crate::error::SearchResult;
use crate::optimization::NonFinitePolicy;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Facade switches
///
/// `print_x` and `show_warnings` only control logging; they never change a
/// returned value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Log the optimal parameter vector of every run at `info`.
    pub print_x: bool,
    /// Log a warning when an optimum sits on an interval end.
    pub show_warnings: bool,
    pub non_finite: NonFinitePolicy,
    /// Fixed seed for the stochastic strategies; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl OptimizerConfig {
    pub fn from_json_str(json: &str) -> SearchResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SearchResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_print_x(mut self, print_x: bool) -> Self {
        self.print_x = print_x;
        self
    }

    pub fn with_show_warnings(mut self, show_warnings: bool) -> Self {
        self.show_warnings = show_warnings;
        self
    }

    pub fn with_policy(mut self, policy: NonFinitePolicy) -> Self {
        self.non_finite = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fresh generator for one strategy run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Settings for standard-vs-Lyapunov comparisons
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub optimizer: OptimizerConfig,
    /// Worker threads for batch comparisons; defaults to the number of CPUs.
    pub threads: Option<usize>,
}

impl ComparisonConfig {
    pub fn from_json_str(json: &str) -> SearchResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SearchResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use rand::Rng;

    #[test]
    fn empty_json_gives_defaults() {
        let config = OptimizerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, OptimizerConfig::default());
        assert_eq!(config.non_finite, NonFinitePolicy::Infeasible);
    }

    #[test]
    fn policy_is_snake_case() {
        let config = OptimizerConfig::from_json_str(
            r#"{"print_x": true, "non_finite": "abort_search", "seed": 3}"#,
        )
        .unwrap();
        assert!(config.print_x);
        assert_eq!(config.non_finite, NonFinitePolicy::AbortSearch);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let config = OptimizerConfig::default().with_seed(9);
        let a: f64 = config.rng().r#gen();
        let b: f64 = config.rng().r#gen();
        assert_eq!(a, b);
    }

    #[test]
    fn comparison_config_nests_optimizer_settings() {
        let config = ComparisonConfig::from_json_str(
            r#"{"optimizer": {"show_warnings": true}, "threads": 2}"#,
        )
        .unwrap();
        assert!(config.optimizer.show_warnings);
        assert_eq!(config.thread_count(), 2);
        assert!(ComparisonConfig::default().thread_count() >= 1);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = OptimizerConfig::from_json_str("{print_x: }").unwrap_err();
        assert!(matches!(err, SearchError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = OptimizerConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SearchError::Io(_)));
    }
}
