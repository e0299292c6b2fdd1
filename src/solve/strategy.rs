//! Uniform dispatch over the five pipelines.
//!
//! Callers pick a [`Strategy`] explicitly; a failure is returned as-is and is
//! never retried with a different strategy.

use crate::domain::{SolverConfig, Strategy};
use crate::error::{Result, SolveError};
use crate::math::{Matrix, Vector};
use crate::solve::{
    factorize_cholesky_with, factorize_lu_with, factorize_qr_with, factorize_svd_with,
    solve_cholesky_with, solve_lu_with, solve_normal_equations_with, solve_qr_with,
    solve_svd_with, LeastSquaresFactor,
};

impl Strategy {
    /// Minimize `‖Ax − b‖₂` with this strategy.
    ///
    /// The SVD pipeline takes its rank policy from `config.rank_policy`.
    pub fn solve(self, a: &Matrix, b: &Vector, config: &SolverConfig) -> Result<Vector> {
        log::debug!("{self}: solving {}x{} system", a.nrows(), a.ncols());
        match self {
            Strategy::NormalEquations => solve_normal_equations_with(a, b, config),
            Strategy::Cholesky => solve_cholesky_with(a, b, config),
            Strategy::Lu => solve_lu_with(a, b, config),
            Strategy::Qr => solve_qr_with(a, b, config),
            Strategy::Svd => solve_svd_with(a, b, config),
        }
    }

    /// Build a reusable factor of `A` for this strategy.
    ///
    /// The normal-equations strategy has no factor to reuse and returns
    /// `InvalidConfig`.
    pub fn factorize(
        self,
        a: &Matrix,
        config: &SolverConfig,
    ) -> Result<Box<dyn LeastSquaresFactor>> {
        let factor: Box<dyn LeastSquaresFactor> = match self {
            Strategy::NormalEquations => {
                return Err(SolveError::InvalidConfig(
                    "the normal-equations strategy has no reusable factor; use Cholesky or LU"
                        .into(),
                ));
            }
            Strategy::Cholesky => Box::new(factorize_cholesky_with(a, config)?),
            Strategy::Lu => Box::new(factorize_lu_with(a, config)?),
            Strategy::Qr => Box::new(factorize_qr_with(a, config)?),
            Strategy::Svd => Box::new(factorize_svd_with(a, config)?),
        };
        Ok(factor)
    }
}
