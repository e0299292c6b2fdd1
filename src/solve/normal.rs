//! Normal equations in their textbook form: `x = (AᵀA)⁻¹ Aᵀb`.
//!
//! The gram matrix is inverted explicitly by Gauss–Jordan elimination with
//! partial pivoting. This is the most direct transcription of the closed-form
//! OLS estimator and also the least careful one: it squares `κ(A)` and adds
//! the rounding of a full inverse on top.

use crate::domain::SolverConfig;
use crate::error::{Result, SolveError, Stage};
use crate::math::{check_square, check_system, gram, project, Matrix, Vector};

/// Solve with the default configuration.
pub fn solve_normal_equations(a: &Matrix, b: &Vector) -> Result<Vector> {
    solve_normal_equations_with(a, b, &SolverConfig::default())
}

pub fn solve_normal_equations_with(a: &Matrix, b: &Vector, config: &SolverConfig) -> Result<Vector> {
    check_system(a, b)?;
    config.validate()?;

    let g = gram(a);
    let g_inv = invert(&g, config.pivot_tolerance)?;
    Ok(g_inv * project(a, b))
}

/// Gauss–Jordan inverse of a square matrix.
///
/// A pivot `<= tol · max|G_ij|` after the row exchange is a singular system.
pub fn invert(g: &Matrix, tol: f64) -> Result<Matrix> {
    let p = check_square(g, Stage::Inversion)?;
    let mut work = g.clone();
    let mut inv = Matrix::identity(p, p);
    let threshold = tol * g.amax();

    for col in 0..p {
        let mut pivot_row = col;
        let mut max_val = work[(col, col)].abs();
        for row in (col + 1)..p {
            let val = work[(row, col)].abs();
            if val > max_val {
                max_val = val;
                pivot_row = row;
            }
        }
        if max_val == 0.0 || !max_val.is_finite() || max_val <= threshold {
            return Err(SolveError::SingularSystem {
                stage: Stage::Inversion,
                index: col,
                pivot: work[(pivot_row, col)],
            });
        }
        if pivot_row != col {
            work.swap_rows(col, pivot_row);
            inv.swap_rows(col, pivot_row);
        }

        let pivot = work[(col, col)];
        for j in 0..p {
            work[(col, j)] /= pivot;
            inv[(col, j)] /= pivot;
        }

        for row in 0..p {
            if row == col {
                continue;
            }
            let factor = work[(row, col)];
            if factor == 0.0 {
                continue;
            }
            for j in 0..p {
                let (w, v) = (work[(col, j)], inv[(col, j)]);
                work[(row, j)] -= factor * w;
                inv[(row, j)] -= factor * v;
            }
        }
    }

    Ok(inv)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn inverse_times_matrix_is_identity() {
        let g = Matrix::from_row_slice(3, 3, &[4.0, 1.0, 2.0, 1.0, 3.0, 0.0, 2.0, 0.0, 5.0]);
        let inv = invert(&g, 1e-12).unwrap();
        let eye = &g * &inv;
        assert_relative_eq!((eye - Matrix::identity(3, 3)).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn inversion_needs_pivoting() {
        // Zero in the leading position.
        let g = Matrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);
        let inv = invert(&g, 1e-12).unwrap();
        assert_eq!(inv, g);
    }

    #[test]
    fn singular_gram_is_rejected() {
        let g = Matrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let err = invert(&g, 1e-12).unwrap_err();
        assert!(matches!(
            err,
            SolveError::SingularSystem {
                stage: Stage::Inversion,
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn fits_a_line() {
        // y = 2 + 3x on x = [0, 1, 2]
        let a = Matrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let b = Vector::from_vec(vec![2.0, 5.0, 8.0]);
        let x = solve_normal_equations(&a, &b).unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-10);
    }
}
