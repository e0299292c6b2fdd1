//! Thin SVD by one-sided Jacobi.
//!
//! Algorithm (n ≥ p):
//! 1. `W = A` (working copy), `V = I_p`.
//! 2. Sweep over all column pairs `(i, j)`: with `α = ‖w_i‖²`, `β = ‖w_j‖²`,
//!    `γ = w_i·w_j`, skip the pair when `|γ| <= tol·√(αβ)`, otherwise rotate
//!    both `W` and `V` so the two columns become orthogonal.
//! 3. Stop after the first sweep that rotates nothing.
//! 4. `σ_j = ‖w_j‖`, `u_j = w_j / σ_j` (left as zero when `σ_j = 0`).
//! 5. Sort `σ` descending and permute `U`, `V` to match.
//!
//! The pair tolerance is `n·ε`, which sits above the rounding noise of an
//! n-term dot product so that a converged sweep really rotates nothing.

use std::cmp::Ordering;

use crate::error::{Result, SolveError, Stage};
use crate::math::{check_design, Matrix, Vector};

/// `A = U Σ Vᵀ` with `U` n×p, `Σ` descending, `Vᵀ` p×p.
#[derive(Debug, Clone)]
pub struct Svd {
    u: Matrix,
    singular_values: Vector,
    v_t: Matrix,
    sweeps: usize,
}

/// Rotation `[w_i', w_j'] = [w_i, w_j] · [[c, s], [−s, c]]`.
#[derive(Debug, Clone, Copy)]
struct JacobiRotation {
    c: f64,
    s: f64,
}

impl JacobiRotation {
    /// Rotation that zeroes the off-diagonal of `[[a_ii, a_ij], [a_ij, a_jj]]`.
    ///
    /// ```text
    /// τ = (a_jj − a_ii) / (2 a_ij)
    /// t = sign(τ) / (|τ| + √(1 + τ²))
    /// c = 1 / √(1 + t²),  s = t c
    /// ```
    fn compute(a_ii: f64, a_jj: f64, a_ij: f64) -> Self {
        let den = 2.0 * a_ij;
        if den.abs() < f64::MIN_POSITIVE {
            return Self { c: 1.0, s: 0.0 };
        }
        let tau = (a_jj - a_ii) / den;
        let t = if tau >= 0.0 {
            1.0 / (tau + (1.0 + tau * tau).sqrt())
        } else {
            -1.0 / (-tau + (1.0 + tau * tau).sqrt())
        };
        let c = 1.0 / (1.0 + t * t).sqrt();
        Self { c, s: t * c }
    }

    fn apply(&self, m: &mut Matrix, i: usize, j: usize) {
        for r in 0..m.nrows() {
            let (wi, wj) = (m[(r, i)], m[(r, j)]);
            m[(r, i)] = self.c * wi - self.s * wj;
            m[(r, j)] = self.s * wi + self.c * wj;
        }
    }
}

impl Svd {
    pub fn decompose(a: &Matrix, max_sweeps: usize) -> Result<Self> {
        check_design(a)?;
        let (n, p) = a.shape();
        let mut w = a.clone();
        let mut v = Matrix::identity(p, p);
        let tol = n as f64 * f64::EPSILON;

        let mut sweeps = 0usize;
        let mut converged = false;
        while sweeps < max_sweeps {
            sweeps += 1;
            let mut rotated = false;

            for i in 0..p {
                for j in (i + 1)..p {
                    let alpha = w.column(i).norm_squared();
                    let beta = w.column(j).norm_squared();
                    let gamma = w.column(i).dot(&w.column(j));

                    if gamma.abs() <= tol * (alpha * beta).sqrt() || gamma.abs() < f64::MIN_POSITIVE {
                        continue;
                    }
                    rotated = true;

                    let rot = JacobiRotation::compute(alpha, beta, gamma);
                    rot.apply(&mut w, i, j);
                    rot.apply(&mut v, i, j);
                }
            }

            if !rotated {
                converged = true;
                break;
            }
        }

        if !converged {
            return Err(SolveError::NoConvergence {
                stage: Stage::SvdFactorization,
                sweeps,
            });
        }

        let sigma: Vec<f64> = (0..p).map(|j| w.column(j).norm()).collect();
        let mut order: Vec<usize> = (0..p).collect();
        order.sort_by(|&x, &y| sigma[y].partial_cmp(&sigma[x]).unwrap_or(Ordering::Equal));

        let mut u = Matrix::zeros(n, p);
        let mut v_t = Matrix::zeros(p, p);
        let mut singular_values = Vector::zeros(p);
        for (dst, &src) in order.iter().enumerate() {
            let s = sigma[src];
            singular_values[dst] = s;
            if s > 0.0 {
                for r in 0..n {
                    u[(r, dst)] = w[(r, src)] / s;
                }
            }
            for c in 0..p {
                v_t[(dst, c)] = v[(c, src)];
            }
        }

        log::debug!(
            "svd: factored {n}x{p} in {sweeps} sweeps, sigma range [{:.3e}, {:.3e}]",
            singular_values[p - 1],
            singular_values[0]
        );
        Ok(Self {
            u,
            singular_values,
            v_t,
            sweeps,
        })
    }

    /// Left singular vectors (n×p).
    pub fn u(&self) -> &Matrix {
        &self.u
    }

    /// Singular values, non-negative and descending.
    pub fn singular_values(&self) -> &Vector {
        &self.singular_values
    }

    /// Right singular vectors, transposed (p×p).
    pub fn v_t(&self) -> &Matrix {
        &self.v_t
    }

    /// Jacobi sweeps used, including the final rotation-free one.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    pub fn shape(&self) -> (usize, usize) {
        self.u.shape()
    }

    /// `σ_max / σ_min`, infinite when `σ_min = 0`.
    pub fn condition_number(&self) -> f64 {
        let p = self.singular_values.len();
        let (max, min) = (self.singular_values[0], self.singular_values[p - 1]);
        if min > 0.0 {
            max / min
        } else {
            f64::INFINITY
        }
    }

    /// Indices `k` with `σ_k <= tol · σ_max`.
    pub fn small_singular_values(&self, tol: f64) -> Vec<usize> {
        let threshold = tol * self.singular_values[0];
        self.singular_values
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == 0.0 || !s.is_finite() || s <= threshold)
            .map(|(k, _)| k)
            .collect()
    }

    /// `U diag(Σ) Vᵀ`.
    pub fn reconstruct(&self) -> Matrix {
        let mut us = self.u.clone();
        for (j, s) in self.singular_values.iter().enumerate() {
            us.column_mut(j).scale_mut(*s);
        }
        us * &self.v_t
    }
}
