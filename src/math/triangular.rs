//! Forward and back substitution.
//!
//! Solves `T x = y` for square triangular `T` without pivoting or iteration.
//! Before any division the diagonal is screened: an entry with
//! `|T_ii| <= tol * max_j |T_jj|` (or exactly zero) is a singular system and is
//! reported instead of letting `Inf`/`NaN` leak into the solution.
//!
//! The same factor can be applied to many right-hand sides at once with
//! [`solve_triangular_many`]; the diagonal screen then runs only once.

use crate::error::{Result, SolveError, Stage};
use crate::math::dense::{check_square, max_abs_diagonal, Matrix, Vector};

/// Which side of the diagonal holds the non-zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triangle {
    Lower,
    Upper,
}

impl Triangle {
    fn stage(self) -> Stage {
        match self {
            Triangle::Lower => Stage::ForwardSubstitution,
            Triangle::Upper => Stage::BackSubstitution,
        }
    }
}

/// Whether the diagonal is implicitly all ones (packed LU storage).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagonal {
    Unit,
    NonUnit,
}

/// Solve `L x = y` by forward substitution.
pub fn solve_lower(l: &Matrix, y: &Vector, diag: Diagonal, tol: f64) -> Result<Vector> {
    solve_triangular(l, y, Triangle::Lower, diag, tol)
}

/// Solve `U x = y` by back substitution.
pub fn solve_upper(u: &Matrix, y: &Vector, diag: Diagonal, tol: f64) -> Result<Vector> {
    solve_triangular(u, y, Triangle::Upper, diag, tol)
}

/// Solve `Lᵀ x = y` reading the lower factor `L` in place.
pub fn solve_lower_transposed(l: &Matrix, y: &Vector, tol: f64) -> Result<Vector> {
    let p = check_rhs(l, y.len(), Stage::BackSubstitution)?;
    screen_diagonal(l, tol, Stage::BackSubstitution)?;

    let mut x = y.clone();
    for i in (0..p).rev() {
        let mut acc = x[i];
        for j in (i + 1)..p {
            acc -= l[(j, i)] * x[j];
        }
        x[i] = acc / l[(i, i)];
    }
    Ok(x)
}

/// Solve `T x = y` for a triangular `T`.
pub fn solve_triangular(
    t: &Matrix,
    y: &Vector,
    triangle: Triangle,
    diag: Diagonal,
    tol: f64,
) -> Result<Vector> {
    let stage = triangle.stage();
    check_rhs(t, y.len(), stage)?;
    if diag == Diagonal::NonUnit {
        screen_diagonal(t, tol, stage)?;
    }

    let mut x = y.clone();
    substitute(t, x.as_mut_slice(), triangle, diag);
    Ok(x)
}

/// Solve `T X = Y` column by column, reusing one diagonal screen.
pub fn solve_triangular_many(
    t: &Matrix,
    y: &Matrix,
    triangle: Triangle,
    diag: Diagonal,
    tol: f64,
) -> Result<Matrix> {
    let stage = triangle.stage();
    check_rhs(t, y.nrows(), stage)?;
    if diag == Diagonal::NonUnit {
        screen_diagonal(t, tol, stage)?;
    }

    let mut x = y.clone();
    let mut work = vec![0.0; t.nrows()];
    for j in 0..x.ncols() {
        for (i, w) in work.iter_mut().enumerate() {
            *w = x[(i, j)];
        }
        substitute(t, &mut work, triangle, diag);
        for (i, w) in work.iter().enumerate() {
            x[(i, j)] = *w;
        }
    }
    Ok(x)
}

fn substitute(t: &Matrix, x: &mut [f64], triangle: Triangle, diag: Diagonal) {
    let p = x.len();
    match triangle {
        Triangle::Lower => {
            for i in 0..p {
                let mut acc = x[i];
                for j in 0..i {
                    acc -= t[(i, j)] * x[j];
                }
                x[i] = match diag {
                    Diagonal::Unit => acc,
                    Diagonal::NonUnit => acc / t[(i, i)],
                };
            }
        }
        Triangle::Upper => {
            for i in (0..p).rev() {
                let mut acc = x[i];
                for j in (i + 1)..p {
                    acc -= t[(i, j)] * x[j];
                }
                x[i] = match diag {
                    Diagonal::Unit => acc,
                    Diagonal::NonUnit => acc / t[(i, i)],
                };
            }
        }
    }
}

fn check_rhs(t: &Matrix, rhs_len: usize, stage: Stage) -> Result<usize> {
    let p = check_square(t, stage)?;
    if rhs_len != p {
        return Err(SolveError::dimension(
            stage,
            format!("right-hand side has {rhs_len} rows, factor is {p}x{p}"),
        ));
    }
    Ok(p)
}

/// Reject exact-zero or below-tolerance diagonal entries (lowest index first).
fn screen_diagonal(t: &Matrix, tol: f64, stage: Stage) -> Result<()> {
    let threshold = tol * max_abs_diagonal(t);
    for i in 0..t.nrows() {
        let d = t[(i, i)];
        if d == 0.0 || !d.is_finite() || d.abs() <= threshold {
            return Err(SolveError::SingularSystem {
                stage,
                index: i,
                pivot: d,
            });
        }
    }
    Ok(())
}
