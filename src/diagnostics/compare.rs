//! Run every strategy on one problem and measure how far they disagree.

use rayon::prelude::*;

use crate::domain::{SolverConfig, Strategy};
use crate::error::Result;
use crate::math::{relative_difference, Matrix, Vector};

#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub strategy: Strategy,
    pub result: Result<Vector>,
}

/// Per-strategy results for one `(A, b)`, in `Strategy::ALL` order.
#[derive(Debug, Clone)]
pub struct StrategyComparison {
    pub outcomes: Vec<StrategyOutcome>,
    /// Largest pairwise relative difference among successful solutions;
    /// `None` with fewer than two successes.
    pub max_deviation: Option<f64>,
}

impl StrategyComparison {
    pub fn solution(&self, strategy: Strategy) -> Option<&Vector> {
        self.outcomes
            .iter()
            .find(|o| o.strategy == strategy)
            .and_then(|o| o.result.as_ref().ok())
    }

    pub fn successes(&self) -> impl Iterator<Item = (Strategy, &Vector)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|x| (o.strategy, x)))
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// True when at least two strategies succeeded and all successful
    /// solutions are within `tol` of each other (relative).
    pub fn agrees_within(&self, tol: f64) -> bool {
        self.max_deviation.is_some_and(|d| d <= tol)
    }
}

/// Solve `(A, b)` with all five strategies in parallel.
///
/// Failures are kept, not propagated: a rank-deficient `A` typically fails
/// every strategy except SVD under a truncating policy.
pub fn compare_strategies(a: &Matrix, b: &Vector, config: &SolverConfig) -> StrategyComparison {
    let outcomes: Vec<StrategyOutcome> = Strategy::ALL
        .par_iter()
        .map(|&strategy| StrategyOutcome {
            strategy,
            result: strategy.solve(a, b, config),
        })
        .collect();

    let solutions: Vec<&Vector> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .collect();
    let max_deviation = if solutions.len() < 2 {
        None
    } else {
        let mut max = 0.0_f64;
        for (i, x) in solutions.iter().enumerate() {
            for y in &solutions[i + 1..] {
                max = max.max(relative_difference(x, y));
            }
        }
        Some(max)
    };

    for o in &outcomes {
        if let Err(e) = &o.result {
            log::debug!("compare: {} failed: {e}", o.strategy);
        }
    }

    StrategyComparison {
        outcomes,
        max_deviation,
    }
}
