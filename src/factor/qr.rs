//! Householder QR of a tall matrix.
//!
//! Column `k` of the working copy is reflected onto `∓‖x‖ e_k` with
//! `H_k = I − β v vᵀ`, `β = 2 / vᵀv`, choosing the sign that avoids
//! cancellation in `v_0 = x_0 ± ‖x‖`. `R` is the upper `p×p` block of the
//! reduced matrix; the thin `Q` is formed by applying the reflectors, in
//! reverse order, to the first `p` columns of the identity.
//!
//! There is no column pivoting: a (near) dependent column shows up as a tiny
//! `R_kk`, which [`Qr::dependent_columns`] reports.

use crate::error::{Result, SolveError, Stage};
use crate::math::{check_design, solve_upper, Diagonal, Matrix, Vector};

/// `A = Q R` with `Q` n×p (orthonormal columns) and `R` p×p upper triangular.
#[derive(Debug, Clone)]
pub struct Qr {
    q: Matrix,
    r: Matrix,
}

struct Reflector {
    v: Vec<f64>,
    beta: f64,
}

impl Reflector {
    /// Apply `I − β v vᵀ` to rows `k..` of column `j` of `m`.
    fn apply(&self, m: &mut Matrix, k: usize, j: usize) {
        let mut dot = 0.0;
        for (t, vt) in self.v.iter().enumerate() {
            dot += vt * m[(k + t, j)];
        }
        let s = self.beta * dot;
        if s == 0.0 {
            return;
        }
        for (t, vt) in self.v.iter().enumerate() {
            m[(k + t, j)] -= s * vt;
        }
    }
}

impl Qr {
    pub fn decompose(a: &Matrix) -> Result<Self> {
        check_design(a)?;
        let (n, p) = a.shape();
        let mut work = a.clone();
        let mut reflectors: Vec<Option<Reflector>> = Vec::with_capacity(p);

        for k in 0..p {
            let alpha = work.view((k, k), (n - k, 1)).norm();
            if alpha == 0.0 {
                // Column already zero below the diagonal.
                reflectors.push(None);
                continue;
            }

            let x0 = work[(k, k)];
            let sign = if x0 >= 0.0 { 1.0 } else { -1.0 };
            let mut v: Vec<f64> = (k..n).map(|i| work[(i, k)]).collect();
            v[0] += sign * alpha;
            let vtv: f64 = v.iter().map(|x| x * x).sum();
            let reflector = Reflector { v, beta: 2.0 / vtv };

            work[(k, k)] = -sign * alpha;
            for i in (k + 1)..n {
                work[(i, k)] = 0.0;
            }
            for j in (k + 1)..p {
                reflector.apply(&mut work, k, j);
            }
            reflectors.push(Some(reflector));
        }

        let r = work.view((0, 0), (p, p)).clone_owned().upper_triangle();

        let mut q = Matrix::identity(n, p);
        for (k, reflector) in reflectors.iter().enumerate().rev() {
            let Some(reflector) = reflector else {
                continue;
            };
            for j in 0..p {
                reflector.apply(&mut q, k, j);
            }
        }

        log::debug!("qr: factored {n}x{p}");
        Ok(Self { q, r })
    }

    /// Thin orthogonal factor (n×p).
    pub fn q(&self) -> &Matrix {
        &self.q
    }

    /// Upper-triangular factor (p×p).
    pub fn r(&self) -> &Matrix {
        &self.r
    }

    pub fn shape(&self) -> (usize, usize) {
        self.q.shape()
    }

    /// Columns `k` with `|R_kk| <= tol · max_j |R_jj|`.
    pub fn dependent_columns(&self, tol: f64) -> Vec<usize> {
        let p = self.r.nrows();
        let scale = (0..p).map(|k| self.r[(k, k)].abs()).fold(0.0, f64::max);
        let threshold = tol * scale;
        (0..p)
            .filter(|&k| {
                let d = self.r[(k, k)].abs();
                d == 0.0 || !d.is_finite() || d <= threshold
            })
            .collect()
    }

    /// `Qᵀ b`.
    pub fn apply_qt(&self, b: &Vector) -> Vector {
        self.q.tr_mul(b)
    }

    /// Solve `R x = Qᵀb`.
    pub fn solve(&self, b: &Vector, tol: f64) -> Result<Vector> {
        if b.len() != self.q.nrows() {
            return Err(SolveError::dimension(
                Stage::QrFactorization,
                format!("b has {} entries, Q has {} rows", b.len(), self.q.nrows()),
            ));
        }
        let qtb = self.apply_qt(b);
        solve_upper(&self.r, &qtb, Diagonal::NonUnit, tol)
    }

    /// `Q R`.
    pub fn reconstruct(&self) -> Matrix {
        &self.q * &self.r
    }
}
