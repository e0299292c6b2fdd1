//! Seeded synthetic least-squares problems.
//!
//! The design matrix is standard normal, so it is well conditioned unless a
//! collinearity is requested. With `b = A x_true + σ·noise` and `σ = 0`,
//! `x_true` is the exact least-squares solution.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolveError};
use crate::math::{Matrix, Vector};

/// Range `x_true` entries are drawn from.
const COEFFICIENT_RANGE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSpec {
    pub rows: usize,
    pub cols: usize,
    /// Standard deviation of the additive noise on `b`.
    pub noise_sigma: f64,
    pub seed: u64,
    /// `Some(δ)` replaces the last column with `a_0 + δ·z`, `z ~ N(0, 1)`.
    /// Smaller δ means larger κ(A), roughly `1/δ`.
    pub collinearity: Option<f64>,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            rows: 100,
            cols: 5,
            noise_sigma: 0.01,
            seed: 42,
            collinearity: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticProblem {
    pub a: Matrix,
    pub b: Vector,
    pub x_true: Vector,
    /// `b − A x_true`.
    pub noise: Vector,
    pub spec: SyntheticSpec,
}

pub fn generate_problem(spec: &SyntheticSpec) -> Result<SyntheticProblem> {
    validate(spec)?;

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| SolveError::InvalidConfig(format!("noise distribution error: {e}")))?;

    let (n, p) = (spec.rows, spec.cols);
    let mut a = Matrix::from_fn(n, p, |_, _| normal.sample(&mut rng));

    if let Some(delta) = spec.collinearity {
        for i in 0..n {
            let z = normal.sample(&mut rng);
            a[(i, p - 1)] = a[(i, 0)] + delta * z;
        }
    }

    let x_true = Vector::from_fn(p, |_, _| {
        rng.gen_range(-COEFFICIENT_RANGE..=COEFFICIENT_RANGE)
    });
    let noise = Vector::from_fn(n, |_, _| spec.noise_sigma * normal.sample(&mut rng));
    let b = &a * &x_true + &noise;

    log::debug!(
        "synthetic: {n}x{p} problem, seed {}, sigma {:e}, collinearity {:?}",
        spec.seed,
        spec.noise_sigma,
        spec.collinearity
    );

    Ok(SyntheticProblem {
        a,
        b,
        x_true,
        noise,
        spec: *spec,
    })
}

fn validate(spec: &SyntheticSpec) -> Result<()> {
    if spec.cols == 0 {
        return Err(SolveError::InvalidConfig("synthetic problem needs at least one column".into()));
    }
    if spec.rows < spec.cols {
        return Err(SolveError::InvalidConfig(format!(
            "synthetic problem must be tall: {} rows < {} columns",
            spec.rows, spec.cols
        )));
    }
    if !(spec.noise_sigma.is_finite() && spec.noise_sigma >= 0.0) {
        return Err(SolveError::InvalidConfig(format!(
            "noise sigma must be finite and >= 0, got {}",
            spec.noise_sigma
        )));
    }
    if let Some(delta) = spec.collinearity {
        if !(delta.is_finite() && delta >= 0.0) {
            return Err(SolveError::InvalidConfig(format!(
                "collinearity must be finite and >= 0, got {delta}"
            )));
        }
        if spec.cols < 2 {
            return Err(SolveError::InvalidConfig(
                "collinearity needs at least two columns".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn same_seed_same_problem() {
        let spec = SyntheticSpec::default();
        let first = generate_problem(&spec).unwrap();
        let second = generate_problem(&spec).unwrap();
        assert_eq!(first.a, second.a);
        assert_eq!(first.b, second.b);

        let other = generate_problem(&SyntheticSpec { seed: 43, ..spec }).unwrap();
        assert_ne!(first.a, other.a);
    }

    #[test]
    fn b_is_design_times_truth_plus_noise() {
        let problem = generate_problem(&SyntheticSpec::default()).unwrap();
        let rebuilt = &problem.a * &problem.x_true + &problem.noise;
        for (lhs, rhs) in rebuilt.iter().zip(problem.b.iter()) {
            assert_relative_eq!(*lhs, *rhs, epsilon = 1e-12);
        }
        assert!(problem.x_true.amax() <= COEFFICIENT_RANGE);
    }

    #[test]
    fn zero_noise_is_exact() {
        let problem = generate_problem(&SyntheticSpec {
            noise_sigma: 0.0,
            ..SyntheticSpec::default()
        })
        .unwrap();
        assert_eq!(problem.noise.amax(), 0.0);
    }

    #[test]
    fn collinearity_ties_last_column_to_first() {
        let problem = generate_problem(&SyntheticSpec {
            rows: 50,
            cols: 4,
            collinearity: Some(1e-6),
            ..SyntheticSpec::default()
        })
        .unwrap();
        let gap = (&problem.a.column(3) - &problem.a.column(0)).amax();
        assert!(gap > 0.0 && gap < 1e-4, "gap {gap:e}");
    }

    #[test]
    fn invalid_specs_are_rejected() {
        let base = SyntheticSpec::default();
        let bad = [
            SyntheticSpec { cols: 0, ..base },
            SyntheticSpec { rows: 3, cols: 4, ..base },
            SyntheticSpec { noise_sigma: -1.0, ..base },
            SyntheticSpec { noise_sigma: f64::NAN, ..base },
            SyntheticSpec { collinearity: Some(-1e-3), ..base },
            SyntheticSpec { cols: 1, collinearity: Some(1e-3), ..base },
        ];
        for spec in bad {
            assert!(
                matches!(generate_problem(&spec), Err(SolveError::InvalidConfig(_))),
                "{spec:?}"
            );
        }
    }
}
