mod adapter;
mod annealing;
mod basin_hopping;
mod bfgs;
mod differential_evolution;
mod grid;
mod library_simplex;
mod nelder_mead;
mod pattern;
pub mod traits;

pub use traits::Solver;
pub use annealing::SimulatedAnnealing;
pub use basin_hopping::BasinHopping;
pub use bfgs::Bfgs;
pub use differential_evolution::DifferentialEvolution;
pub use grid::GridSearch;
pub use library_simplex::SimplexSearch;
pub use nelder_mead::{ClassicNelderMead, SimplexState, Transition};
pub use pattern::PatternSearch;
