//! Cholesky factorization of a symmetric positive definite matrix.
//!
//! Cholesky–Banachiewicz, row by row. The running diagonal
//! `d_k = G_kk − Σ_j L_kj²` is compared against `tol · G_kk`: when it drops to
//! (or below) that level, `G` is not numerically positive definite and the
//! factorization stops with `NotPositiveDefinite` at column `k`.

use crate::error::{Result, SolveError, Stage};
use crate::math::{check_square, solve_lower, solve_lower_transposed, Diagonal, Matrix, Vector};

/// `G = L Lᵀ` with `L` lower triangular and a positive diagonal.
#[derive(Debug, Clone)]
pub struct Cholesky {
    l: Matrix,
}

impl Cholesky {
    /// Factor the symmetric matrix `g`. Only the lower triangle is read.
    pub fn decompose(g: &Matrix, tol: f64) -> Result<Self> {
        let p = check_square(g, Stage::CholeskyFactorization)?;
        let mut l = Matrix::zeros(p, p);

        for i in 0..p {
            for j in 0..=i {
                let mut sum = 0.0;
                for k in 0..j {
                    sum += l[(i, k)] * l[(j, k)];
                }

                if i == j {
                    let d = g[(i, i)] - sum;
                    // Written so that NaN also fails.
                    if !(d > tol * g[(i, i)].abs() && d > 0.0) {
                        return Err(SolveError::NotPositiveDefinite {
                            stage: Stage::CholeskyFactorization,
                            column: i,
                            pivot: d,
                        });
                    }
                    l[(i, i)] = d.sqrt();
                } else {
                    l[(i, j)] = (g[(i, j)] - sum) / l[(j, j)];
                }
            }
        }

        log::debug!(
            "cholesky: factored {p}x{p}, min diag {:.3e}",
            (0..p).map(|i| l[(i, i)]).fold(f64::INFINITY, f64::min)
        );
        Ok(Self { l })
    }

    /// The lower-triangular factor.
    pub fn l(&self) -> &Matrix {
        &self.l
    }

    pub fn dim(&self) -> usize {
        self.l.nrows()
    }

    /// Solve `G x = rhs` via `L y = rhs`, then `Lᵀ x = y`.
    pub fn solve(&self, rhs: &Vector, tol: f64) -> Result<Vector> {
        let y = solve_lower(&self.l, rhs, Diagonal::NonUnit, tol)?;
        solve_lower_transposed(&self.l, &y, tol)
    }

    /// `L Lᵀ`.
    pub fn reconstruct(&self) -> Matrix {
        &self.l * self.l.transpose()
    }
}
