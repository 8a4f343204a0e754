pub mod domain;

pub use domain::{
    EPSILON, boundary_hits, is_equal, validate_bounds, validate_start, validate_step,
};
