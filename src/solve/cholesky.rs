//! Cholesky pipeline: `AᵀA = L Lᵀ`, then `L y = Aᵀb` and `Lᵀ x = y`.
//!
//! Of the five strategies this one is the least robust numerically: forming
//! `AᵀA` squares the condition number, and a rank-deficient (or nearly so)
//! `A` makes the factorization itself fail with `NotPositiveDefinite`.

use crate::domain::{SolverConfig, Strategy};
use crate::error::Result;
use crate::factor::Cholesky;
use crate::math::{check_design, check_system, gram, project, Matrix, Vector};
use crate::solve::{check_rhs, LeastSquaresFactor};

/// Reusable Cholesky factor of `AᵀA`.
///
/// Keeps an owned copy of `A` because every new `b` needs `Aᵀb`.
#[derive(Debug, Clone)]
pub struct CholeskyFactor {
    a: Matrix,
    chol: Cholesky,
    tol: f64,
}

impl CholeskyFactor {
    pub fn cholesky(&self) -> &Cholesky {
        &self.chol
    }
}

impl LeastSquaresFactor for CholeskyFactor {
    fn strategy(&self) -> Strategy {
        Strategy::Cholesky
    }

    fn shape(&self) -> (usize, usize) {
        self.a.shape()
    }

    fn solve(&self, b: &Vector) -> Result<Vector> {
        check_rhs(self.a.nrows(), b)?;
        self.chol.solve(&project(&self.a, b), self.tol)
    }
}

pub fn factorize_cholesky(a: &Matrix) -> Result<CholeskyFactor> {
    factorize_cholesky_with(a, &SolverConfig::default())
}

pub fn factorize_cholesky_with(a: &Matrix, config: &SolverConfig) -> Result<CholeskyFactor> {
    check_design(a)?;
    config.validate()?;
    let chol = Cholesky::decompose(&gram(a), config.pivot_tolerance)?;
    Ok(CholeskyFactor {
        a: a.clone(),
        chol,
        tol: config.pivot_tolerance,
    })
}

pub fn solve_cholesky(a: &Matrix, b: &Vector) -> Result<Vector> {
    solve_cholesky_with(a, b, &SolverConfig::default())
}

pub fn solve_cholesky_with(a: &Matrix, b: &Vector, config: &SolverConfig) -> Result<Vector> {
    check_system(a, b)?;
    config.validate()?;
    let chol = Cholesky::decompose(&gram(a), config.pivot_tolerance)?;
    chol.solve(&project(a, b), config.pivot_tolerance)
}
