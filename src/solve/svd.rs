//! SVD pipeline: `A = U Σ Vᵀ`, `y_i = (Uᵀb)_i / σ_i`, `x = V y`.
//!
//! The only strategy that degrades gracefully on rank-deficient input. With
//! [`RankPolicy::Strict`] small singular values are an error; with
//! [`RankPolicy::Truncate`] their components are dropped, which yields the
//! minimum-norm least-squares solution.

use crate::domain::{RankPolicy, SolverConfig, Strategy};
use crate::error::{Result, SolveError, Stage};
use crate::factor::Svd;
use crate::math::{check_system, Matrix, Vector};
use crate::solve::{check_rhs, LeastSquaresFactor};

/// Reusable SVD factor of `A` plus the rank policy to solve with.
#[derive(Debug, Clone)]
pub struct SvdFactor {
    svd: Svd,
    policy: RankPolicy,
}

impl SvdFactor {
    pub fn svd(&self) -> &Svd {
        &self.svd
    }

    pub fn policy(&self) -> RankPolicy {
        self.policy
    }

    /// Number of singular components the solve actually uses.
    pub fn effective_rank(&self) -> usize {
        match self.policy {
            RankPolicy::Strict => self.svd.singular_values().len(),
            RankPolicy::Truncate(eps) => {
                self.svd.singular_values().len() - self.svd.small_singular_values(eps).len()
            }
        }
    }
}

impl LeastSquaresFactor for SvdFactor {
    fn strategy(&self) -> Strategy {
        Strategy::Svd
    }

    fn shape(&self) -> (usize, usize) {
        self.svd.shape()
    }

    fn solve(&self, b: &Vector) -> Result<Vector> {
        check_rhs(self.svd.u().nrows(), b)?;

        let sigma = self.svd.singular_values();
        let cutoff = match self.policy {
            RankPolicy::Strict => None,
            RankPolicy::Truncate(eps) => Some(eps * sigma[0]),
        };

        let utb = self.svd.u().tr_mul(b);
        let mut y = Vector::zeros(sigma.len());
        for (i, &s) in sigma.iter().enumerate() {
            if cutoff.is_some_and(|c| s <= c) {
                continue;
            }
            if s == 0.0 || !s.is_finite() {
                return Err(SolveError::SingularSystem {
                    stage: Stage::SingularValueScaling,
                    index: i,
                    pivot: s,
                });
            }
            y[i] = utb[i] / s;
        }

        Ok(self.svd.v_t().tr_mul(&y))
    }
}

pub fn factorize_svd(a: &Matrix, policy: RankPolicy) -> Result<SvdFactor> {
    factorize_svd_with(a, &SolverConfig::default().with_rank_policy(policy))
}

/// Factor `A`; under the strict policy, reject it when any
/// `σ_k <= rank_tolerance · σ_max`.
///
/// `RankDeficient::columns` lists the columns taking part in each near-null
/// direction: those whose weight in the matching right singular vector is at
/// least half of that vector's largest weight.
pub fn factorize_svd_with(a: &Matrix, config: &SolverConfig) -> Result<SvdFactor> {
    config.validate()?;
    let svd = Svd::decompose(a, config.max_sweeps)?;

    match config.rank_policy {
        RankPolicy::Strict => {
            let small = svd.small_singular_values(config.rank_tolerance);
            if !small.is_empty() {
                return Err(SolveError::RankDeficient {
                    stage: Stage::SvdFactorization,
                    rank: a.ncols() - small.len(),
                    columns: null_direction_columns(&svd, &small),
                });
            }
        }
        RankPolicy::Truncate(eps) => {
            let dropped = svd.small_singular_values(eps).len();
            if dropped > 0 {
                log::warn!(
                    "svd: truncating {dropped} of {} singular values below {eps:e} relative",
                    a.ncols()
                );
            }
        }
    }

    Ok(SvdFactor {
        svd,
        policy: config.rank_policy,
    })
}

pub fn solve_svd(a: &Matrix, b: &Vector, policy: RankPolicy) -> Result<Vector> {
    solve_svd_with(a, b, &SolverConfig::default().with_rank_policy(policy))
}

pub fn solve_svd_with(a: &Matrix, b: &Vector, config: &SolverConfig) -> Result<Vector> {
    check_system(a, b)?;
    factorize_svd_with(a, config)?.solve(b)
}

fn null_direction_columns(svd: &Svd, small: &[usize]) -> Vec<usize> {
    let v_t = svd.v_t();
    let mut columns = Vec::new();
    for &k in small {
        let row = v_t.row(k);
        let peak = row.amax();
        for (c, w) in row.iter().enumerate() {
            if w.abs() >= 0.5 * peak && !columns.contains(&c) {
                columns.push(c);
            }
        }
    }
    columns.sort_unstable();
    columns
}
