//! Newton-Raphson iteration with an analytic derivative

use serde::{Deserialize, Serialize};

use super::irr::IrrMethod;

/// Derivatives smaller than this stall the iteration
const DERIVATIVE_FLOOR: f64 = 1e-20;

/// Iteration limits and bounds shared by the rate and IRR solvers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Hard cap on Newton (and bisection) iterations
    pub max_iterations: u32,

    /// Convergence threshold on the change between successive estimates
    pub tolerance: f64,

    /// Newton estimates are kept inside [lower_bound, upper_bound]
    pub lower_bound: f64,
    pub upper_bound: f64,

    /// IRR strategy
    pub irr_method: IrrMethod,

    /// Starting periodic rate for IRR
    pub irr_guess: f64,

    /// Bracket searched by bisection
    pub bisection_low: f64,
    pub bisection_high: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            lower_bound: -0.99,
            upper_bound: 10.0,
            irr_method: IrrMethod::Hybrid,
            irr_guess: 0.1,
            bisection_low: -0.99,
            bisection_high: 1.0,
        }
    }
}

/// Outcome of an iterative solve.
///
/// `estimate` is always the last point reached, converged or not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub estimate: f64,
    pub iterations: u32,
    pub converged: bool,
}

/// Run Newton-Raphson on `objective`, which returns `(f(x), f'(x))`.
///
/// Stops when successive estimates differ by less than `config.tolerance`, when
/// the derivative vanishes, or after `config.max_iterations` steps. A step that
/// had to be clipped to the bounds never counts as converged.
pub fn newton_raphson<F>(objective: F, initial_guess: f64, config: &SolverConfig) -> Solution
where
    F: Fn(f64) -> (f64, f64),
{
    let mut x = initial_guess.max(config.lower_bound).min(config.upper_bound);

    for iteration in 1..=config.max_iterations {
        let (value, derivative) = objective(x);

        if !value.is_finite() || !derivative.is_finite() || derivative.abs() < DERIVATIVE_FLOOR {
            return Solution {
                estimate: x,
                iterations: iteration,
                converged: false,
            };
        }

        let raw = x - value / derivative;
        let next = raw.max(config.lower_bound).min(config.upper_bound);
        let clipped = next != raw;

        if (next - x).abs() < config.tolerance && !clipped {
            return Solution {
                estimate: next,
                iterations: iteration,
                converged: true,
            };
        }

        x = next;
    }

    Solution {
        estimate: x,
        iterations: config.max_iterations,
        converged: false,
    }
}
