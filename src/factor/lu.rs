//! LU factorization with partial pivoting (Doolittle).
//!
//! At every elimination step the candidate with the largest magnitude in the
//! current column is swapped into the pivot position, which bounds the growth
//! of rounding error. The row exchanges are recorded as an index permutation
//! (`perm[i]` = original row now at position `i`); no dense `P` is ever built.
//!
//! Storage is packed: the strictly-lower part of `lu` holds the multipliers of
//! the unit-lower `L`, the upper part (diagonal included) holds `U`.

use crate::error::{Result, SolveError, Stage};
use crate::math::{
    check_square, gather, solve_lower, solve_upper, Diagonal, Matrix, Vector,
};

/// `G = P L U`, i.e. `(L U)[i, :] = G[perm[i], :]`.
#[derive(Debug, Clone)]
pub struct Lu {
    lu: Matrix,
    perm: Vec<usize>,
    swaps: usize,
}

impl Lu {
    /// Factor the square matrix `g`.
    ///
    /// A pivot with `|pivot| <= tol · max|G_ij|` after the best available row
    /// exchange means `g` is singular.
    pub fn decompose(g: &Matrix, tol: f64) -> Result<Self> {
        let p = check_square(g, Stage::LuFactorization)?;
        let mut lu = g.clone();
        let mut perm: Vec<usize> = (0..p).collect();
        let mut swaps = 0usize;
        let threshold = tol * g.amax();

        for col in 0..p {
            // Find pivot.
            let mut pivot_row = col;
            let mut max_val = lu[(col, col)].abs();
            for row in (col + 1)..p {
                let val = lu[(row, col)].abs();
                if val > max_val {
                    max_val = val;
                    pivot_row = row;
                }
            }

            if max_val == 0.0 || !max_val.is_finite() || max_val <= threshold {
                return Err(SolveError::SingularSystem {
                    stage: Stage::LuFactorization,
                    index: col,
                    pivot: lu[(pivot_row, col)],
                });
            }

            if pivot_row != col {
                lu.swap_rows(col, pivot_row);
                perm.swap(col, pivot_row);
                swaps += 1;
            }

            // Multipliers, then the trailing update.
            let pivot = lu[(col, col)];
            for row in (col + 1)..p {
                let mult = lu[(row, col)] / pivot;
                lu[(row, col)] = mult;
                if mult == 0.0 {
                    continue;
                }
                for j in (col + 1)..p {
                    let update = mult * lu[(col, j)];
                    lu[(row, j)] -= update;
                }
            }
        }

        log::debug!("lu: factored {p}x{p} with {swaps} row exchanges");
        Ok(Self { lu, perm, swaps })
    }

    pub fn dim(&self) -> usize {
        self.lu.nrows()
    }

    /// Row permutation as an index array.
    pub fn perm(&self) -> &[usize] {
        &self.perm
    }

    /// Number of row exchanges performed (parity of `P`).
    pub fn swaps(&self) -> usize {
        self.swaps
    }

    /// Packed `L\U` storage.
    pub fn packed(&self) -> &Matrix {
        &self.lu
    }

    /// Unit-lower factor `L`, materialized.
    pub fn l(&self) -> Matrix {
        let p = self.dim();
        Matrix::from_fn(p, p, |i, j| match i.cmp(&j) {
            std::cmp::Ordering::Greater => self.lu[(i, j)],
            std::cmp::Ordering::Equal => 1.0,
            std::cmp::Ordering::Less => 0.0,
        })
    }

    /// Upper factor `U`, materialized.
    pub fn u(&self) -> Matrix {
        self.lu.upper_triangle()
    }

    /// Solve `G x = rhs`: gather `rhs` by `perm`, then `L y = Pᵀrhs`, `U x = y`.
    pub fn solve(&self, rhs: &Vector, tol: f64) -> Result<Vector> {
        if rhs.len() != self.dim() {
            return Err(SolveError::dimension(
                Stage::LuFactorization,
                format!("right-hand side has {} rows, factor is {}", rhs.len(), self.dim()),
            ));
        }
        let permuted = gather(rhs, &self.perm);
        let y = solve_lower(&self.lu, &permuted, Diagonal::Unit, tol)?;
        solve_upper(&self.lu, &y, Diagonal::NonUnit, tol)
    }

    /// `P L U`, scattering the rows of `L U` back to their original positions.
    pub fn reconstruct(&self) -> Matrix {
        let prod = self.l() * self.u();
        let p = self.dim();
        let mut out = Matrix::zeros(p, p);
        for (i, &src) in self.perm.iter().enumerate() {
            out.set_row(src, &prod.row(i));
        }
        out
    }
}
