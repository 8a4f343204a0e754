pub mod callback;
pub mod neighbor;
pub mod problem;
pub mod simplex;
pub mod solvers;

pub use callback::{HistoryCallback, IterationResult, NoopCallback, SearchCallback};
pub use neighbor::{Candidate, search_feasible_neighbor};
pub use problem::{Evaluator, NonFinitePolicy, Objective};
pub use simplex::{InitialSimplex, Simplex};
pub use solvers::{
    BasinHopping, Bfgs, ClassicNelderMead, DifferentialEvolution, GridSearch, PatternSearch,
    SimplexSearch, SimplexState, SimulatedAnnealing, Solver, Transition,
};
