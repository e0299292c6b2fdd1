//! Domain types used throughout the solver.
//!
//! This module defines:
//!
//! - the strategy selector (`Strategy`) and SVD rank policy (`RankPolicy`)
//! - solver configuration (`SolverConfig`), including environment loading

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
