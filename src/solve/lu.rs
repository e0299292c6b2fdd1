//! LU pipeline: `AᵀA = P L U`, then gather `Aᵀb` by the pivot order,
//! forward-solve the unit-lower `L` and back-solve `U`.

use crate::domain::{SolverConfig, Strategy};
use crate::error::Result;
use crate::factor::Lu;
use crate::math::{check_design, check_system, gram, project, Matrix, Vector};
use crate::solve::{check_rhs, LeastSquaresFactor};

/// Reusable LU factor of `AᵀA` (with an owned copy of `A` for `Aᵀb`).
#[derive(Debug, Clone)]
pub struct LuFactor {
    a: Matrix,
    lu: Lu,
    tol: f64,
}

impl LuFactor {
    pub fn lu(&self) -> &Lu {
        &self.lu
    }
}

impl LeastSquaresFactor for LuFactor {
    fn strategy(&self) -> Strategy {
        Strategy::Lu
    }

    fn shape(&self) -> (usize, usize) {
        self.a.shape()
    }

    fn solve(&self, b: &Vector) -> Result<Vector> {
        check_rhs(self.a.nrows(), b)?;
        self.lu.solve(&project(&self.a, b), self.tol)
    }
}

pub fn factorize_lu(a: &Matrix) -> Result<LuFactor> {
    factorize_lu_with(a, &SolverConfig::default())
}

pub fn factorize_lu_with(a: &Matrix, config: &SolverConfig) -> Result<LuFactor> {
    check_design(a)?;
    config.validate()?;
    let lu = Lu::decompose(&gram(a), config.pivot_tolerance)?;
    Ok(LuFactor {
        a: a.clone(),
        lu,
        tol: config.pivot_tolerance,
    })
}

pub fn solve_lu(a: &Matrix, b: &Vector) -> Result<Vector> {
    solve_lu_with(a, b, &SolverConfig::default())
}

pub fn solve_lu_with(a: &Matrix, b: &Vector, config: &SolverConfig) -> Result<Vector> {
    check_system(a, b)?;
    config.validate()?;
    let lu = Lu::decompose(&gram(a), config.pivot_tolerance)?;
    lu.solve(&project(a, b), config.pivot_tolerance)
}
