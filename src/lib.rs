//! `dense-lstsq`: dense linear least squares, five ways.
//!
//! Minimizes `‖Ax − b‖₂` for a tall `A` (n ≥ p) with one of five strategies:
//!
//! - normal equations with an explicit inverse of `AᵀA`
//! - Cholesky of `AᵀA`
//! - LU (partial pivoting) of `AᵀA`
//! - Householder QR of `A` (the recommended default)
//! - one-sided Jacobi SVD of `A`, with strict or truncating rank handling
//!
//! The strategies trade speed for robustness: the first three square the
//! condition number of `A`, QR and SVD do not. [`diagnostics`] reports
//! residuals, conditioning and cross-strategy agreement for a solution.
//!
//! ```no_run
//! use dense_lstsq::{Matrix, SolverConfig, Strategy, Vector};
//!
//! let a = Matrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
//! let b = Vector::from_vec(vec![2.0, 5.0, 8.0]);
//! let x = Strategy::Qr.solve(&a, &b, &SolverConfig::default())?;
//! # Ok::<(), dense_lstsq::SolveError>(())
//! ```

pub mod data;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod factor;
pub mod math;
pub mod solve;

pub use diagnostics::{
    check_orthogonality, compare_strategies, condition_number, diagnose, Diagnostics,
    StrategyComparison,
};
pub use domain::{RankPolicy, SolverConfig, Strategy};
pub use error::{Result, SolveError, Stage};
pub use math::{Matrix, Vector};
pub use solve::{
    factorize_cholesky, factorize_lu, factorize_qr, factorize_svd, solve_cholesky, solve_lu,
    solve_normal_equations, solve_qr, solve_svd, LeastSquaresFactor,
};
