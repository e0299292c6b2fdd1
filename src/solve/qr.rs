//! QR pipeline: `A = Q R`, then `R x = Qᵀb`.
//!
//! This is the recommended default. `A` is factored directly, so the
//! condition number is not squared, and the only triangular solve is against
//! `R`, whose diagonal doubles as a column-rank check.

use crate::domain::{SolverConfig, Strategy};
use crate::error::{Result, SolveError, Stage};
use crate::factor::Qr;
use crate::math::{check_system, Matrix, Vector};
use crate::solve::{check_rhs, LeastSquaresFactor};

/// Reusable QR factor of `A` with full column rank.
#[derive(Debug, Clone)]
pub struct QrFactor {
    qr: Qr,
    tol: f64,
}

impl QrFactor {
    pub fn qr(&self) -> &Qr {
        &self.qr
    }
}

impl LeastSquaresFactor for QrFactor {
    fn strategy(&self) -> Strategy {
        Strategy::Qr
    }

    fn shape(&self) -> (usize, usize) {
        self.qr.shape()
    }

    fn solve(&self, b: &Vector) -> Result<Vector> {
        check_rhs(self.qr.q().nrows(), b)?;
        self.qr.solve(b, self.tol)
    }
}

pub fn factorize_qr(a: &Matrix) -> Result<QrFactor> {
    factorize_qr_with(a, &SolverConfig::default())
}

/// Factor `A` and reject it if any `|R_kk|` is below the rank tolerance.
pub fn factorize_qr_with(a: &Matrix, config: &SolverConfig) -> Result<QrFactor> {
    config.validate()?;
    let qr = Qr::decompose(a)?;

    let columns = qr.dependent_columns(config.rank_tolerance);
    if !columns.is_empty() {
        return Err(SolveError::RankDeficient {
            stage: Stage::QrFactorization,
            rank: a.ncols() - columns.len(),
            columns,
        });
    }

    Ok(QrFactor {
        qr,
        tol: config.pivot_tolerance,
    })
}

pub fn solve_qr(a: &Matrix, b: &Vector) -> Result<Vector> {
    solve_qr_with(a, b, &SolverConfig::default())
}

pub fn solve_qr_with(a: &Matrix, b: &Vector, config: &SolverConfig) -> Result<Vector> {
    check_system(a, b)?;
    factorize_qr_with(a, config)?.solve(b)
}
