//! Derivative-free minimization of MGF network-calculus bounds.
//!
//! Bounds are partial functions of their free exponents: outside the
//! stability region they fail, near poles they overflow. Every strategy here
//! goes through a feasibility-safe evaluator that turns those failures into
//! `+inf`, so a search never aborts on an infeasible probe.

pub mod core;
pub mod error;
pub mod optimization;
pub mod optimizer;
pub mod types;

pub use error::{ObjectiveError, SearchError, SearchResult};
pub use optimization::*;
pub use optimizer::{
    ComparisonConfig, Improvement, LyapunovBound, OptMethod, Optimize, OptimizerConfig, Overhead,
    Setting, SettingNew, StandardBound, compute_improvement, compute_improvements_par,
    compute_overhead, improvement_report,
};
pub use types::*;
