//! Shared domain types.
//!
//! These are small, `Copy` and serializable so they can be stored in configs
//! and diagnostics reports alongside the numbers they describe.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SolveError;

/// A least-squares solve pipeline.
///
/// Each variant composes the dense primitives with one factorization:
///
/// - `NormalEquations`: explicit `(AᵀA)⁻¹ Aᵀb`
/// - `Cholesky`: `AᵀA = L Lᵀ`, two triangular solves
/// - `Lu`: `AᵀA = P L U`, permutation gather + two triangular solves
/// - `Qr`: `A = Q R`, one triangular solve (the default)
/// - `Svd`: `A = U Σ Vᵀ`, diagonal scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    NormalEquations,
    Cholesky,
    Lu,
    #[default]
    Qr,
    Svd,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::NormalEquations,
        Strategy::Cholesky,
        Strategy::Lu,
        Strategy::Qr,
        Strategy::Svd,
    ];

    /// Human-readable label for reports and logs.
    pub fn display_name(self) -> &'static str {
        match self {
            Strategy::NormalEquations => "normal equations",
            Strategy::Cholesky => "Cholesky",
            Strategy::Lu => "LU",
            Strategy::Qr => "QR",
            Strategy::Svd => "SVD",
        }
    }

    /// Whether the pipeline works on `AᵀA` and therefore sees `κ(A)²`.
    pub fn squares_condition(self) -> bool {
        matches!(
            self,
            Strategy::NormalEquations | Strategy::Cholesky | Strategy::Lu
        )
    }

    /// Whether a factor of `A` can be built once and reused for many `b`.
    pub fn is_reusable(self) -> bool {
        !matches!(self, Strategy::NormalEquations)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What the SVD pipeline does with singular values below tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankPolicy {
    /// Fail with `RankDeficient`.
    #[default]
    Strict,
    /// Zero every component with `σ_i <= eps * σ_max` (minimum-norm solution).
    Truncate(f64),
}

impl FromStr for RankPolicy {
    type Err = SolveError;

    /// Parses `strict` or `truncate:<eps>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("strict") {
            return Ok(RankPolicy::Strict);
        }
        let Some(eps) = s
            .strip_prefix("truncate:")
            .or_else(|| s.strip_prefix("TRUNCATE:"))
        else {
            return Err(SolveError::InvalidConfig(format!(
                "unknown rank policy '{s}' (expected 'strict' or 'truncate:<eps>')"
            )));
        };
        let eps: f64 = eps.trim().parse().map_err(|e| {
            SolveError::InvalidConfig(format!("invalid truncation tolerance '{eps}': {e}"))
        })?;
        if !(eps.is_finite() && eps >= 0.0) {
            return Err(SolveError::InvalidConfig(format!(
                "truncation tolerance must be finite and >= 0, got {eps}"
            )));
        }
        Ok(RankPolicy::Truncate(eps))
    }
}
