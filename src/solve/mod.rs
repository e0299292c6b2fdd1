//! Least-squares solve pipelines.
//!
//! Responsibilities:
//!
//! - one pipeline per strategy (normal equations, Cholesky, LU, QR, SVD)
//! - a factor-reuse API for the four strategies with a factor of `A`
//! - dispatch through [`Strategy`](crate::domain::Strategy)
//!
//! Each `solve_*` function has a `_with` form taking a [`SolverConfig`];
//! the plain form uses `SolverConfig::default()`.
//!
//! [`SolverConfig`]: crate::domain::SolverConfig

use rayon::prelude::*;

use crate::domain::Strategy;
use crate::error::{Result, SolveError, Stage};
use crate::math::Vector;

pub mod cholesky;
pub mod lu;
pub mod normal;
pub mod qr;
pub mod strategy;
pub mod svd;

pub use cholesky::*;
pub use lu::*;
pub use normal::{solve_normal_equations, solve_normal_equations_with};
pub use qr::*;
pub use svd::*;

/// A factorization of `A` that can solve for any number of `b`.
///
/// Factors are immutable once built, so one factor can serve many threads.
pub trait LeastSquaresFactor: Send + Sync + std::fmt::Debug {
    fn strategy(&self) -> Strategy;

    /// `(n, p)` of the factored `A`.
    fn shape(&self) -> (usize, usize);

    /// Least-squares solution for one right-hand side (length n).
    fn solve(&self, b: &Vector) -> Result<Vector>;

    fn nrows(&self) -> usize {
        self.shape().0
    }

    fn ncols(&self) -> usize {
        self.shape().1
    }

    /// Solve for every `b` in parallel; the first error wins.
    fn solve_many(&self, rhs: &[Vector]) -> Result<Vec<Vector>> {
        rhs.par_iter().map(|b| self.solve(b)).collect()
    }
}

pub(crate) fn check_rhs(n: usize, b: &Vector) -> Result<()> {
    if b.len() != n {
        return Err(SolveError::dimension(
            Stage::Input,
            format!("b has {} entries, factor expects {n}", b.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_relative_eq;

    use super::*;
    use crate::data::synthetic::{generate_problem, SyntheticSpec};
    use crate::domain::{RankPolicy, SolverConfig};
    use crate::math::{check_system, relative_difference, Matrix};

    fn reference_solution(a: &Matrix, b: &Vector) -> Vector {
        // nalgebra's own SVD solve is the trusted reference.
        let svd = a.clone().svd(true, true);
        svd.solve(b, 1e-12).unwrap()
    }

    fn well_conditioned() -> (Matrix, Vector) {
        let a = Matrix::from_row_slice(
            6,
            3,
            &[
                1.0, 0.5, -1.0, //
                2.0, -1.0, 0.0, //
                0.0, 1.5, 2.0, //
                1.0, 1.0, 1.0, //
                -1.0, 2.0, 0.5, //
                3.0, 0.0, -2.0,
            ],
        );
        let b = Vector::from_vec(vec![1.0, -2.0, 0.5, 3.0, 1.0, -1.0]);
        (a, b)
    }

    /// `A` with column 3 duplicated into column 5.
    fn duplicated_column() -> (Matrix, Vector) {
        let problem = generate_problem(&SyntheticSpec {
            rows: 40,
            cols: 6,
            noise_sigma: 0.1,
            seed: 7,
            collinearity: None,
        })
        .unwrap();
        let mut a = problem.a;
        let dup = a.column(3).clone_owned();
        a.set_column(5, &dup);
        (a, problem.b)
    }

    #[test]
    fn all_strategies_agree_with_reference() {
        let (a, b) = well_conditioned();
        let reference = reference_solution(&a, &b);
        let config = SolverConfig::default();

        for strategy in Strategy::ALL {
            let x = strategy.solve(&a, &b, &config).unwrap();
            let err = relative_difference(&x, &reference);
            assert!(err < 1e-10, "{strategy}: relative error {err:e}");
        }
    }

    #[test]
    fn free_functions_match_dispatch() {
        let (a, b) = well_conditioned();
        let config = SolverConfig::default();
        let pairs = [
            (solve_normal_equations(&a, &b).unwrap(), Strategy::NormalEquations),
            (solve_cholesky(&a, &b).unwrap(), Strategy::Cholesky),
            (solve_lu(&a, &b).unwrap(), Strategy::Lu),
            (solve_qr(&a, &b).unwrap(), Strategy::Qr),
            (solve_svd(&a, &b, RankPolicy::Strict).unwrap(), Strategy::Svd),
        ];
        for (x, strategy) in pairs {
            assert_eq!(x, strategy.solve(&a, &b, &config).unwrap());
        }
    }

    #[test]
    fn exact_fit_is_recovered() {
        // y = 2 + 3x on x = [0, 1, 2]
        let a = Matrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let b = Vector::from_vec(vec![2.0, 5.0, 8.0]);
        for strategy in Strategy::ALL {
            let x = strategy.solve(&a, &b, &SolverConfig::default()).unwrap();
            assert_relative_eq!(x[0], 2.0, epsilon = 1e-10);
            assert_relative_eq!(x[1], 3.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn dimension_mismatch_is_reported_by_every_strategy() {
        let a = Matrix::zeros(4, 2);
        let short_b = Vector::zeros(3);
        let wide = Matrix::zeros(2, 3);
        let b2 = Vector::zeros(2);
        for strategy in Strategy::ALL {
            let config = SolverConfig::default();
            assert!(strategy.solve(&a, &short_b, &config).unwrap_err().is_dimension_error());
            assert!(strategy.solve(&wide, &b2, &config).unwrap_err().is_dimension_error());
        }
        assert!(check_system(&a, &short_b).is_err());
    }

    #[test]
    fn duplicated_column_cholesky_is_not_positive_definite() {
        let (a, b) = duplicated_column();
        let err = solve_cholesky(&a, &b).unwrap_err();
        assert!(
            matches!(err, SolveError::NotPositiveDefinite { column: 5, .. }),
            "{err}"
        );
    }

    #[test]
    fn duplicated_column_lu_and_normal_are_singular() {
        let (a, b) = duplicated_column();
        let err = solve_lu(&a, &b).unwrap_err();
        assert!(
            matches!(err, SolveError::SingularSystem { stage: Stage::LuFactorization, .. }),
            "{err}"
        );
        let err = solve_normal_equations(&a, &b).unwrap_err();
        assert!(
            matches!(err, SolveError::SingularSystem { stage: Stage::Inversion, .. }),
            "{err}"
        );
    }

    #[test]
    fn duplicated_column_qr_is_rank_deficient() {
        let (a, b) = duplicated_column();
        match solve_qr(&a, &b).unwrap_err() {
            SolveError::RankDeficient { stage, columns, rank } => {
                assert_eq!(stage, Stage::QrFactorization);
                assert_eq!(columns, vec![5]);
                assert_eq!(rank, 5);
            }
            other => panic!("expected RankDeficient, got {other}"),
        }
    }

    #[test]
    fn duplicated_column_svd_strict_is_rank_deficient() {
        let (a, b) = duplicated_column();
        match solve_svd(&a, &b, RankPolicy::Strict).unwrap_err() {
            SolveError::RankDeficient { stage, columns, rank } => {
                assert_eq!(stage, Stage::SvdFactorization);
                assert_eq!(columns, vec![3, 5]);
                assert_eq!(rank, 5);
            }
            other => panic!("expected RankDeficient, got {other}"),
        }
    }

    #[test]
    fn duplicated_column_svd_truncate_gives_minimum_norm_solution() {
        let (a, b) = duplicated_column();
        let x = solve_svd(&a, &b, RankPolicy::Truncate(1e-10)).unwrap();

        // Minimum norm splits the shared coefficient evenly.
        assert_relative_eq!(x[3], x[5], epsilon = 1e-8);

        let svd = a.clone().svd(true, true);
        let sigma_max = svd.singular_values.max();
        let reference = svd.solve(&b, 1e-10 * sigma_max).unwrap();
        assert!(relative_difference(&x, &reference) < 1e-8);

        // Still a least-squares minimizer.
        let normal = a.tr_mul(&(&a * &x - &b));
        assert!(normal.norm() < 1e-8 * a.norm() * b.norm());
    }

    #[test]
    fn factors_are_reusable_across_right_hand_sides() {
        let (a, _) = well_conditioned();
        let config = SolverConfig::default();
        let rhs: Vec<Vector> = (0..8)
            .map(|k| Vector::from_fn(6, |i, _| ((i + 1) * (k + 2)) as f64 % 5.0 - 2.0))
            .collect();

        for strategy in Strategy::ALL.into_iter().filter(|s| s.is_reusable()) {
            let factor = strategy.factorize(&a, &config).unwrap();
            assert_eq!(factor.strategy(), strategy);
            assert_eq!((factor.nrows(), factor.ncols()), (6, 3));

            let batch = factor.solve_many(&rhs).unwrap();
            for (b, x) in rhs.iter().zip(batch.iter()) {
                let direct = strategy.solve(&a, b, &config).unwrap();
                assert!(relative_difference(x, &direct) < 1e-12);
            }
        }
    }

    #[test]
    fn normal_equations_have_no_factor() {
        let (a, _) = well_conditioned();
        let err = Strategy::NormalEquations
            .factorize(&a, &SolverConfig::default())
            .unwrap_err();
        assert!(matches!(err, SolveError::InvalidConfig(_)));
    }

    #[test]
    fn shared_factor_solves_from_many_threads() {
        let (a, b) = well_conditioned();
        let factor = Arc::new(factorize_qr(&a).unwrap());
        let expected = factor.solve(&b).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let factor = Arc::clone(&factor);
                let b = b.clone();
                std::thread::spawn(move || factor.solve(&b).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn factor_rejects_wrong_length_rhs() {
        let (a, _) = well_conditioned();
        let factor = factorize_lu(&a).unwrap();
        let err = factor.solve(&Vector::zeros(5)).unwrap_err();
        assert!(err.is_dimension_error());
    }

    #[test]
    fn inputs_are_not_mutated() {
        let (a, b) = well_conditioned();
        let (a0, b0) = (a.clone(), b.clone());
        for strategy in Strategy::ALL {
            strategy.solve(&a, &b, &SolverConfig::default()).unwrap();
        }
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }
}
