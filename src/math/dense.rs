//! Dense matrix/vector primitives shared by every pipeline.
//!
//! Storage, multiplication and the (logical) transpose come from nalgebra.
//! This module adds the handful of least-squares specific building blocks on
//! top: shape validation, `AᵀA`, `Aᵀb`, residuals, norms and index
//! permutations.

use nalgebra::{DMatrix, DVector};

use crate::error::{Result, SolveError, Stage};

/// Dense, owned, real matrix.
pub type Matrix = DMatrix<f64>;

/// Dense, owned, real vector.
pub type Vector = DVector<f64>;

/// Validate the shapes of a least-squares system `A x ≈ b`.
///
/// Requires `p >= 1`, `n >= p` and `len(b) == n`.
pub fn check_system(a: &Matrix, b: &Vector) -> Result<()> {
    check_design(a)?;
    if b.len() != a.nrows() {
        return Err(SolveError::dimension(
            Stage::Input,
            format!("b has {} entries, A has {} rows", b.len(), a.nrows()),
        ));
    }
    Ok(())
}

/// Validate the shape of a design matrix on its own (for factor-only calls).
pub fn check_design(a: &Matrix) -> Result<()> {
    let (n, p) = a.shape();
    if p == 0 {
        return Err(SolveError::dimension(Stage::Input, "A has no columns"));
    }
    if n < p {
        return Err(SolveError::dimension(
            Stage::Input,
            format!("A is {n}x{p}; least squares needs rows >= columns"),
        ));
    }
    Ok(())
}

/// Validate that `m` is square, reporting against `stage`.
pub fn check_square(m: &Matrix, stage: Stage) -> Result<usize> {
    let (r, c) = m.shape();
    if r != c {
        return Err(SolveError::dimension(
            stage,
            format!("expected a square matrix, got {r}x{c}"),
        ));
    }
    Ok(r)
}

/// `AᵀA`, exactly symmetric.
///
/// Only the upper triangle is computed; the lower one is mirrored so that
/// downstream factorizations see bit-identical `G_ij` and `G_ji`.
pub fn gram(a: &Matrix) -> Matrix {
    let p = a.ncols();
    let mut g = Matrix::zeros(p, p);
    for i in 0..p {
        let ci = a.column(i);
        for j in i..p {
            let v = ci.dot(&a.column(j));
            g[(i, j)] = v;
            g[(j, i)] = v;
        }
    }
    g
}

/// `Aᵀb` without materializing the transpose.
pub fn project(a: &Matrix, b: &Vector) -> Vector {
    a.tr_mul(b)
}

/// `Ax − b`.
pub fn residual(a: &Matrix, x: &Vector, b: &Vector) -> Vector {
    a * x - b
}

/// Euclidean norm for vectors, Frobenius norm for matrices.
pub fn frobenius_norm(m: &Matrix) -> f64 {
    m.norm()
}

/// `‖x − reference‖ / ‖reference‖`, falling back to the absolute difference
/// when the reference is (numerically) zero.
pub fn relative_difference(x: &Vector, reference: &Vector) -> f64 {
    let diff = (x - reference).norm();
    let scale = reference.norm();
    if scale > f64::MIN_POSITIVE {
        diff / scale
    } else {
        diff
    }
}

/// `max_i |M_ii|` of a square matrix.
pub fn max_abs_diagonal(m: &Matrix) -> f64 {
    let k = m.nrows().min(m.ncols());
    (0..k).map(|i| m[(i, i)].abs()).fold(0.0, f64::max)
}

/// `out[i] = v[perm[i]]`.
pub fn gather(v: &Vector, perm: &[usize]) -> Vector {
    debug_assert_eq!(v.len(), perm.len());
    Vector::from_iterator(perm.len(), perm.iter().map(|&src| v[src]))
}

/// Inverse of [`gather`]: `out[perm[i]] = v[i]`.
pub fn scatter(v: &Vector, perm: &[usize]) -> Vector {
    debug_assert_eq!(v.len(), perm.len());
    let mut out = Vector::zeros(v.len());
    for (i, &dst) in perm.iter().enumerate() {
        out[dst] = v[i];
    }
    out
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn gram_matches_explicit_product() {
        let a = Matrix::from_row_slice(4, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let g = gram(&a);
        let expected = a.transpose() * &a;
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(g[(i, j)], expected[(i, j)], epsilon = 1e-12);
            }
        }
        assert_eq!(g[(0, 1)], g[(1, 0)]);
    }

    #[test]
    fn check_system_rejects_bad_shapes() {
        let a = Matrix::zeros(2, 3);
        let b = Vector::zeros(2);
        assert!(check_system(&a, &b).unwrap_err().is_dimension_error());

        let a = Matrix::zeros(3, 2);
        let b = Vector::zeros(4);
        assert!(check_system(&a, &b).unwrap_err().is_dimension_error());

        let a = Matrix::zeros(3, 0);
        let b = Vector::zeros(3);
        assert!(check_system(&a, &b).is_err());

        let a = Matrix::zeros(3, 3);
        let b = Vector::zeros(3);
        assert!(check_system(&a, &b).is_ok());
    }

    #[test]
    fn gather_and_scatter_are_inverse() {
        let v = Vector::from_vec(vec![10.0, 20.0, 30.0, 40.0]);
        let perm = [2, 0, 3, 1];
        let g = gather(&v, &perm);
        assert_eq!(g.as_slice(), &[30.0, 10.0, 40.0, 20.0]);
        assert_eq!(scatter(&g, &perm), v);
    }

    #[test]
    fn relative_difference_of_zero_reference_is_absolute() {
        let x = Vector::from_vec(vec![3.0, 4.0]);
        let zero = Vector::zeros(2);
        assert_relative_eq!(relative_difference(&x, &zero), 5.0);
        assert_relative_eq!(relative_difference(&x, &x), 0.0);
    }
}
