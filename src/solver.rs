//! Monotonic bisection root-finder
//!
//! Every "length for volume" question in the engine (string fill from surface,
//! annulus rise from the bit, equal-volume matching) goes through
//! `bisect_monotonic`. Iterations are hard-capped so the loop always ends.

use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// Iteration cap and relative tolerance for a solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    pub max_iterations: usize,
    pub relative_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: defaults::MAX_SOLVER_ITERATIONS,
            relative_tolerance: defaults::SOLVER_RELATIVE_TOLERANCE,
        }
    }
}

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Converged,
    /// Ran out of iterations; `value` is the best midpoint.
    IterationCap,
    /// Target is above `f(hi)`; `value` is `hi`.
    TargetAboveRange,
    /// Target is below `f(lo)`; `value` is `lo`.
    TargetBelowRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootSolve {
    pub value: f64,
    pub iterations: usize,
    pub status: SolveStatus,
}

impl RootSolve {
    /// True only when the tolerance was met.
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

/// Find `x` in `[lo, hi]` with `f(x) == target` for a non-decreasing `f`.
///
/// Out-of-range targets return the nearer bound with a non-converged status;
/// the caller picks the fallback.
pub fn bisect_monotonic<F>(
    f: F,
    target: f64,
    lo: f64,
    hi: f64,
    settings: SolverSettings,
) -> RootSolve
where
    F: Fn(f64) -> f64,
{
    let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let tol_f = settings.relative_tolerance * target.abs().max(1.0);
    let tol_x = settings.relative_tolerance * hi.abs().max(1.0);

    let f_lo = f(lo);
    if target <= f_lo + tol_f {
        let status = if target < f_lo - tol_f {
            SolveStatus::TargetBelowRange
        } else {
            SolveStatus::Converged
        };
        return RootSolve { value: lo, iterations: 0, status };
    }
    let f_hi = f(hi);
    if target >= f_hi - tol_f {
        let status = if target > f_hi + tol_f {
            SolveStatus::TargetAboveRange
        } else {
            SolveStatus::Converged
        };
        return RootSolve { value: hi, iterations: 0, status };
    }

    let cap = settings.max_iterations.clamp(1, defaults::MAX_SOLVER_ITERATIONS);
    let mut mid = 0.5 * (lo + hi);
    for i in 1..=cap {
        mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if (f_mid - target).abs() <= tol_f || (hi - lo) <= tol_x {
            return RootSolve { value: mid, iterations: i, status: SolveStatus::Converged };
        }
        if f_mid < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    RootSolve { value: mid, iterations: cap, status: SolveStatus::IterationCap }
}
