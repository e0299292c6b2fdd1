//! Error types for the least-squares pipelines.
//!
//! Every failure is deterministic (a property of the input, not of the
//! environment), so nothing here is retried. Each variant carries the
//! [`Stage`] it came from and, where it makes sense, the row/column at fault.

use std::fmt;

use thiserror::Error;

/// The pipeline step that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Input,
    CholeskyFactorization,
    LuFactorization,
    QrFactorization,
    SvdFactorization,
    ForwardSubstitution,
    BackSubstitution,
    Inversion,
    SingularValueScaling,
    Diagnostics,
}

impl Stage {
    pub fn display_name(self) -> &'static str {
        match self {
            Stage::Input => "input validation",
            Stage::CholeskyFactorization => "Cholesky factorization",
            Stage::LuFactorization => "LU factorization",
            Stage::QrFactorization => "QR factorization",
            Stage::SvdFactorization => "SVD factorization",
            Stage::ForwardSubstitution => "forward substitution",
            Stage::BackSubstitution => "back substitution",
            Stage::Inversion => "gram inversion",
            Stage::SingularValueScaling => "singular value scaling",
            Stage::Diagnostics => "diagnostics",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Errors surfaced by factorizations and solves.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// Input shapes violate the `n >= p`, `len(b) == n` contract.
    #[error("dimension mismatch during {stage}: {detail}")]
    DimensionMismatch { stage: Stage, detail: String },

    /// `AᵀA` lost positive definiteness while being factored.
    #[error("{stage}: matrix is not positive definite (running diagonal {pivot:e} at column {column})")]
    NotPositiveDefinite {
        stage: Stage,
        column: usize,
        pivot: f64,
    },

    /// A zero (or below-tolerance) pivot or divisor.
    #[error("{stage}: singular system (pivot {pivot:e} at index {index})")]
    SingularSystem {
        stage: Stage,
        index: usize,
        pivot: f64,
    },

    /// `A` itself lacks full column rank.
    #[error("{stage}: rank deficient (numerical rank {rank}, dependent columns {columns:?})")]
    RankDeficient {
        stage: Stage,
        columns: Vec<usize>,
        rank: usize,
    },

    #[error("{stage}: no convergence after {sweeps} sweeps")]
    NoConvergence { stage: Stage, sweeps: usize },

    /// The residual of a claimed solution is not orthogonal to `col(A)`.
    #[error("{stage}: ‖Aᵀ(Ax − b)‖ = {norm:e} exceeds bound {bound:e}")]
    OrthogonalityViolation { stage: Stage, norm: f64, bound: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A specialized `Result` for solver operations.
pub type Result<T> = std::result::Result<T, SolveError>;

impl SolveError {
    pub fn dimension(stage: Stage, detail: impl Into<String>) -> Self {
        SolveError::DimensionMismatch {
            stage,
            detail: detail.into(),
        }
    }

    /// The stage the error originated from, if it has one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SolveError::DimensionMismatch { stage, .. }
            | SolveError::NotPositiveDefinite { stage, .. }
            | SolveError::SingularSystem { stage, .. }
            | SolveError::RankDeficient { stage, .. }
            | SolveError::NoConvergence { stage, .. }
            | SolveError::OrthogonalityViolation { stage, .. } => Some(*stage),
            SolveError::InvalidConfig(_) => None,
        }
    }

    /// Returns `true` for errors caused by (near) linear dependence in `A`.
    ///
    /// This includes `NotPositiveDefinite`, `SingularSystem` and
    /// `RankDeficient`: each is how a particular strategy sees a
    /// rank-deficient design.
    pub fn is_rank_related(&self) -> bool {
        matches!(
            self,
            SolveError::NotPositiveDefinite { .. }
                | SolveError::SingularSystem { .. }
                | SolveError::RankDeficient { .. }
        )
    }

    pub fn is_dimension_error(&self) -> bool {
        matches!(self, SolveError::DimensionMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_stage_and_location() {
        let err = SolveError::SingularSystem {
            stage: Stage::BackSubstitution,
            index: 2,
            pivot: 0.0,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("back substitution"), "{msg}");
        assert!(msg.contains("index 2"), "{msg}");
    }

    #[test]
    fn rank_deficient_lists_columns() {
        let err = SolveError::RankDeficient {
            stage: Stage::QrFactorization,
            columns: vec![3, 5],
            rank: 4,
        };
        assert!(err.to_string().contains("[3, 5]"));
        assert_eq!(err.stage(), Some(Stage::QrFactorization));
    }

    #[test]
    fn categories() {
        let dim = SolveError::dimension(Stage::Input, "b has 3 rows, A has 4");
        let npd = SolveError::NotPositiveDefinite {
            stage: Stage::CholeskyFactorization,
            column: 1,
            pivot: -1e-17,
        };
        let cfg = SolveError::InvalidConfig("bad".into());

        assert!(dim.is_dimension_error());
        assert!(!dim.is_rank_related());
        assert!(npd.is_rank_related());
        assert!(!cfg.is_rank_related());
        assert_eq!(cfg.stage(), None);
    }
}
