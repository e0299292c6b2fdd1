//! Solver configuration.
//!
//! All thresholds are *relative*: they are scaled by the magnitude of the
//! matrix being factored (largest diagonal entry, largest `|R_kk|`, or
//! `σ_max`), so the same config works for `A` and `1e6 · A`.

use serde::{Deserialize, Serialize};

use crate::domain::RankPolicy;
use crate::error::{Result, SolveError};

/// Pivot threshold for Cholesky, LU, inversion and triangular solves.
pub const DEFAULT_PIVOT_TOL: f64 = 1e-12;

/// Rank threshold for QR diagonals and singular values.
pub const DEFAULT_RANK_TOL: f64 = 1e-10;

/// Upper bound on one-sided Jacobi sweeps.
pub const DEFAULT_MAX_SWEEPS: usize = 64;

/// Condition number above which diagnostics warn.
pub const DEFAULT_WARN_CONDITION: f64 = 1e8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// `|pivot| <= pivot_tolerance * scale` counts as a zero pivot.
    pub pivot_tolerance: f64,
    /// `|R_kk|` or `σ_k` `<= rank_tolerance * max` marks a dependent column.
    pub rank_tolerance: f64,
    /// Behaviour of the SVD pipeline on small singular values.
    pub rank_policy: RankPolicy,
    pub max_sweeps: usize,
    /// Effective condition number above which diagnostics emit warnings.
    pub warn_condition: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pivot_tolerance: DEFAULT_PIVOT_TOL,
            rank_tolerance: DEFAULT_RANK_TOL,
            rank_policy: RankPolicy::Strict,
            max_sweeps: DEFAULT_MAX_SWEEPS,
            warn_condition: DEFAULT_WARN_CONDITION,
        }
    }
}

impl SolverConfig {
    pub fn with_rank_policy(self, rank_policy: RankPolicy) -> Self {
        Self {
            rank_policy,
            ..self
        }
    }

    /// Build a config from the environment (and `.env`, if present).
    ///
    /// Recognized variables, all optional:
    /// - `LSTSQ_PIVOT_TOL`
    /// - `LSTSQ_RANK_TOL`
    /// - `LSTSQ_RANK_POLICY` (`strict` or `truncate:<eps>`)
    /// - `LSTSQ_MAX_SWEEPS`
    /// - `LSTSQ_WARN_CONDITION`
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`SolverConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("LSTSQ_PIVOT_TOL") {
            config.pivot_tolerance = parse_var("LSTSQ_PIVOT_TOL", &v)?;
        }
        if let Some(v) = lookup("LSTSQ_RANK_TOL") {
            config.rank_tolerance = parse_var("LSTSQ_RANK_TOL", &v)?;
        }
        if let Some(v) = lookup("LSTSQ_RANK_POLICY") {
            config.rank_policy = v.parse()?;
        }
        if let Some(v) = lookup("LSTSQ_MAX_SWEEPS") {
            config.max_sweeps = parse_var("LSTSQ_MAX_SWEEPS", &v)?;
        }
        if let Some(v) = lookup("LSTSQ_WARN_CONDITION") {
            config.warn_condition = parse_var("LSTSQ_WARN_CONDITION", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, tol) in [
            ("pivot_tolerance", self.pivot_tolerance),
            ("rank_tolerance", self.rank_tolerance),
        ] {
            if !(tol.is_finite() && (0.0..1.0).contains(&tol)) {
                return Err(SolveError::InvalidConfig(format!(
                    "{name} must be finite and in [0, 1), got {tol}"
                )));
            }
        }
        if let RankPolicy::Truncate(eps) = self.rank_policy {
            if !(eps.is_finite() && eps >= 0.0) {
                return Err(SolveError::InvalidConfig(format!(
                    "truncation tolerance must be finite and >= 0, got {eps}"
                )));
            }
        }
        if self.max_sweeps == 0 {
            return Err(SolveError::InvalidConfig("max_sweeps must be > 0".into()));
        }
        if !(self.warn_condition.is_finite() && self.warn_condition >= 1.0) {
            return Err(SolveError::InvalidConfig(format!(
                "warn_condition must be finite and >= 1, got {}",
                self.warn_condition
            )));
        }
        Ok(())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| SolveError::InvalidConfig(format!("{key}='{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        SolverConfig::default().validate().unwrap();
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = SolverConfig::from_lookup(lookup_from(&[
            ("LSTSQ_RANK_TOL", "1e-8"),
            ("LSTSQ_RANK_POLICY", "truncate:1e-9"),
            ("LSTSQ_MAX_SWEEPS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.rank_tolerance, 1e-8);
        assert_eq!(config.rank_policy, RankPolicy::Truncate(1e-9));
        assert_eq!(config.max_sweeps, 10);
        assert_eq!(config.pivot_tolerance, DEFAULT_PIVOT_TOL);
    }

    #[test]
    fn unparseable_values_are_rejected() {
        let res = SolverConfig::from_lookup(lookup_from(&[("LSTSQ_PIVOT_TOL", "tiny")]));
        assert!(matches!(res, Err(SolveError::InvalidConfig(_))));

        let res = SolverConfig::from_lookup(lookup_from(&[("LSTSQ_MAX_SWEEPS", "0")]));
        assert!(matches!(res, Err(SolveError::InvalidConfig(_))));
    }
}
