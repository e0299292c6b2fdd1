//! Post-solve checks: residuals, conditioning and residual orthogonality.
//!
//! A least-squares solution `x` satisfies `Aᵀ(Ax − b) = 0`, so the size of
//! `Aᵀr` (scaled by `‖A‖` and `‖r‖`) is a strategy-independent quality
//! measure. Conditioning is reported both for `A` and for the matrix the
//! strategy actually factors, since squaring strategies see `κ(A)²`.

use serde::Serialize;

use crate::domain::{SolverConfig, Strategy, DEFAULT_MAX_SWEEPS};
use crate::error::{Result, SolveError, Stage};
use crate::factor::Svd;
use crate::math::{check_system, frobenius_norm, project, residual, Matrix, Vector};

pub mod compare;

pub use compare::{compare_strategies, StrategyComparison, StrategyOutcome};

/// `‖Aᵀ(Ax − b)‖₂`.
pub fn normal_residual_norm(a: &Matrix, x: &Vector, b: &Vector) -> f64 {
    project(a, &residual(a, x, b)).norm()
}

/// Check that the residual is orthogonal to the columns of `A`.
///
/// Passes when `‖Aᵀr‖ <= tol · ‖A‖_F · max(‖r‖, ‖b‖·ε)` and returns `‖Aᵀr‖`.
pub fn check_orthogonality(a: &Matrix, x: &Vector, b: &Vector, tol: f64) -> Result<f64> {
    check_system(a, b)?;
    check_solution(a, x)?;

    let r = residual(a, x, b);
    let norm = project(a, &r).norm();
    let floor = b.norm() * f64::EPSILON;
    let bound = tol * frobenius_norm(a) * r.norm().max(floor);

    if norm <= bound {
        Ok(norm)
    } else {
        Err(SolveError::OrthogonalityViolation {
            stage: Stage::Diagnostics,
            norm,
            bound,
        })
    }
}

/// `κ₂(A) = σ_max / σ_min`; infinite for rank-deficient `A`.
pub fn condition_number(a: &Matrix) -> Result<f64> {
    Ok(Svd::decompose(a, DEFAULT_MAX_SWEEPS)?.condition_number())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditioningWarning {
    /// `κ(A)` itself exceeds the configured threshold.
    IllConditioned { condition: f64, threshold: f64 },
    /// The strategy squares `κ(A)` past the threshold.
    PrecisionLoss {
        strategy: Strategy,
        effective_condition: f64,
        /// Roughly `log10(effective κ)` decimal digits.
        digits_lost: f64,
    },
}

/// Quality report for one solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub strategy: Strategy,
    /// `‖Ax − b‖₂`.
    pub residual_norm: f64,
    /// `‖Aᵀ(Ax − b)‖₂`.
    pub normal_residual_norm: f64,
    pub condition_number: f64,
    /// Condition number of the matrix the strategy factors.
    pub effective_condition: f64,
    pub warnings: Vec<ConditioningWarning>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Diagnose a solution `x` produced by `strategy`.
pub fn diagnose(
    strategy: Strategy,
    a: &Matrix,
    b: &Vector,
    x: &Vector,
    config: &SolverConfig,
) -> Result<Diagnostics> {
    check_system(a, b)?;
    check_solution(a, x)?;
    config.validate()?;

    let r = residual(a, x, b);
    let condition = Svd::decompose(a, config.max_sweeps)?.condition_number();
    let effective_condition = if strategy.squares_condition() {
        condition * condition
    } else {
        condition
    };

    let mut warnings = Vec::new();
    if condition > config.warn_condition {
        warnings.push(ConditioningWarning::IllConditioned {
            condition,
            threshold: config.warn_condition,
        });
    }
    if strategy.squares_condition() && effective_condition > config.warn_condition {
        warnings.push(ConditioningWarning::PrecisionLoss {
            strategy,
            effective_condition,
            digits_lost: effective_condition.log10(),
        });
    }
    for warning in &warnings {
        match warning {
            ConditioningWarning::IllConditioned { condition, threshold } => {
                log::warn!("{strategy}: κ(A) = {condition:e} exceeds {threshold:e}");
            }
            ConditioningWarning::PrecisionLoss {
                effective_condition,
                digits_lost,
                ..
            } => {
                log::warn!(
                    "{strategy}: effective κ = {effective_condition:e}, about {digits_lost:.1} digits lost"
                );
            }
        }
    }

    Ok(Diagnostics {
        strategy,
        residual_norm: r.norm(),
        normal_residual_norm: project(a, &r).norm(),
        condition_number: condition,
        effective_condition,
        warnings,
    })
}

fn check_solution(a: &Matrix, x: &Vector) -> Result<()> {
    if x.len() != a.ncols() {
        return Err(SolveError::dimension(
            Stage::Diagnostics,
            format!("x has {} entries, A has {} columns", x.len(), a.ncols()),
        ));
    }
    Ok(())
}
