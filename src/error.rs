use argmin::core::ArgminError;
use thiserror::Error;

/// Crate-wide result alias for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Failures raised by an objective (bound) evaluation.
///
/// All three are recoverable: the evaluator turns them into an infeasible
/// (`+inf`) value unless the evaluator's policy says otherwise.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjectiveError {
    /// The parameter vector violates a precondition of the bound,
    /// e.g. arrival rate >= service rate.
    #[error("parameter out of bounds: {0}")]
    ParameterOutOfBounds(String),

    /// Exponential terms exceeded the representable range.
    #[error("numeric overflow: {0}")]
    Overflow(String),

    /// Arithmetic produced a floating-point exception (division by zero,
    /// invalid operation).
    #[error("floating point error: {0}")]
    FloatingPoint(String),
}

#[derive(Debug, Error)]
pub enum SearchError {
    // ---- Configuration ----
    #[error("invalid bounds for dimension {dim}: ({lo}, {hi}) {reason}")]
    InvalidBounds {
        dim: usize,
        lo: f64,
        hi: f64,
        reason: &'static str,
    },

    #[error("invalid step '{name}' = {value}: {reason}")]
    InvalidStep {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("array argument is not a simplex, rows: {rows}, columns: {cols}")]
    SimplexShape { rows: usize, cols: usize },

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("starting point must contain at least one parameter")]
    EmptyStart,

    #[error("invalid schedule field '{field}' = {value}: {reason}")]
    InvalidSchedule {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ---- Evaluation ----
    /// Raised by the evaluator under `NonFinitePolicy::AbortSearch`.
    #[error("objective produced a non-finite result: {reason}")]
    NonFinite { reason: String },

    // ---- Backend / runtime ----
    #[error("argmin backend error: {text}")]
    Backend { text: String },

    #[error("optimization method {method} is not supported here")]
    UnsupportedMethod { method: String },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl SearchError {
    /// True for errors that mean "this run hit non-finite arithmetic" rather
    /// than "the caller configured something wrong".
    pub fn is_non_finite(&self) -> bool {
        matches!(self, SearchError::NonFinite { .. })
    }
}

impl From<argmin::core::Error> for SearchError {
    fn from(original_err: argmin::core::Error) -> Self {
        // Our own errors travel through argmin untouched; unwrap them first.
        let original_err = match original_err.downcast::<SearchError>() {
            Ok(search_err) => return search_err,
            Err(err) => err,
        };
        match original_err.downcast::<ArgminError>() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => SearchError::InvalidConfig(text),
                ArgminError::NotImplemented { text }
                | ArgminError::NotInitialized { text }
                | ArgminError::ConditionViolated { text }
                | ArgminError::CheckpointNotFound { text }
                | ArgminError::PotentialBug { text }
                | ArgminError::ImpossibleError { text } => SearchError::Backend { text },
                other => SearchError::Backend { text: other.to_string() },
            },
            Err(err) => SearchError::Backend { text: err.to_string() },
        }
    }
}
