pub mod synthetic;

pub use synthetic::{generate_problem, SyntheticProblem, SyntheticSpec};
