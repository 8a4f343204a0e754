/// Callback interface for optimization progress
///
/// Strategies call `on_improvement` whenever their best-ever value strictly
/// decreases, so a recorded history is monotonically non-increasing.
pub trait SearchCallback {
    fn on_improvement(&mut self, iteration: u64, params: &[f64], value: f64);

    /// Check if optimization should stop early
    fn should_stop(&self) -> bool {
        false
    }
}

/// Callback that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallback;

impl SearchCallback for NoopCallback {
    fn on_improvement(&mut self, _iteration: u64, _params: &[f64], _value: f64) {}
}

/// Iteration result for tracking optimization progress
#[derive(Debug, Clone, PartialEq)]
pub struct IterationResult {
    pub iteration: u64,
    pub params: Vec<f64>,
    pub value: f64,
}

/// Records every improvement and optionally stops after a fixed number of them
#[derive(Debug, Default, Clone)]
pub struct HistoryCallback {
    history: Vec<IterationResult>,
    max_improvements: Option<usize>,
}

impl HistoryCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the strategy once `limit` improvements have been recorded.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            history: Vec::new(),
            max_improvements: Some(limit),
        }
    }

    pub fn history(&self) -> &[IterationResult] {
        &self.history
    }

    pub fn best(&self) -> Option<&IterationResult> {
        self.history.last()
    }

    /// True if recorded values never increase.
    pub fn is_monotone(&self) -> bool {
        self.history.windows(2).all(|w| w[1].value <= w[0].value)
    }
}

impl SearchCallback for HistoryCallback {
    fn on_improvement(&mut self, iteration: u64, params: &[f64], value: f64) {
        tracing::trace!(iteration, value, ?params, "improvement");
        self.history.push(IterationResult {
            iteration,
            params: params.to_vec(),
            value,
        });
    }

    fn should_stop(&self) -> bool {
        self.max_improvements
            .is_some_and(|limit| self.history.len() >= limit)
    }
}
