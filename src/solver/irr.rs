//! Internal Rate of Return (IRR) calculation
//!
//! Finds the periodic rate at which `Σ cf_t / (1+r)^t = 0`, period 0 undiscounted.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::newton::{newton_raphson, Solution, SolverConfig};

/// Cash flows smaller than this count as zero
const ZERO_FLOW: f64 = 1e-10;

/// Root-finding strategy for IRR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrMethod {
    /// Newton-Raphson from the initial guess only
    Newton,
    /// Bisection over the configured bracket only
    Bisection,
    /// Newton first, bisection when Newton fails to converge
    #[default]
    Hybrid,
}

impl std::str::FromStr for IrrMethod {
    type Err = crate::error::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newton" => Ok(IrrMethod::Newton),
            "bisection" => Ok(IrrMethod::Bisection),
            "hybrid" => Ok(IrrMethod::Hybrid),
            other => Err(crate::error::EngineError::UnknownVariant {
                kind: "irr method".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// How a periodic IRR is expressed per year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrAnnualization {
    /// `(1 + r)^k − 1`
    #[default]
    Effective,
    /// `r · k`
    Nominal,
}

/// Annual rate from a periodic rate with `periods_per_year` periods
pub fn annualize(periodic_rate: f64, periods_per_year: u32, mode: IrrAnnualization) -> f64 {
    match mode {
        IrrAnnualization::Effective => (1.0 + periodic_rate).powi(periods_per_year as i32) - 1.0,
        IrrAnnualization::Nominal => periodic_rate * periods_per_year as f64,
    }
}

/// Net present value at a periodic rate; the first flow is at t = 0
pub fn npv(rate: f64, cash_flows: &[f64]) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// `(npv, d npv / d rate)` in one pass over the flows
fn npv_with_slope(cash_flows: &[f64], rate: f64) -> (f64, f64) {
    let growth = 1.0 + rate;
    cash_flows
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(value, slope), (t, &cf)| {
            let pv = cf / growth.powi(t as i32);
            (value + pv, slope - t as f64 * pv / growth)
        })
}

/// Bisection over the configured bracket.
///
/// `None` when NPV has the same sign at both ends of the bracket.
fn bisect(cash_flows: &[f64], config: &SolverConfig) -> Option<Solution> {
    let mut low = config.bisection_low;
    let mut high = config.bisection_high;
    let mut npv_low = npv(low, cash_flows);
    let npv_high = npv(high, cash_flows);

    if npv_low == 0.0 {
        return Some(Solution { estimate: low, iterations: 0, converged: true });
    }
    if npv_high == 0.0 {
        return Some(Solution { estimate: high, iterations: 0, converged: true });
    }
    if !(npv_low * npv_high < 0.0) {
        return None;
    }

    let mut mid = (low + high) / 2.0;
    for iteration in 1..=config.max_iterations {
        mid = (low + high) / 2.0;
        let npv_mid = npv(mid, cash_flows);

        if npv_mid.abs() < config.tolerance || (high - low) / 2.0 < config.tolerance {
            return Some(Solution { estimate: mid, iterations: iteration, converged: true });
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    Some(Solution { estimate: mid, iterations: config.max_iterations, converged: false })
}

/// Bracket end with the smaller absolute NPV; used when nothing else applies
fn closest_bound(cash_flows: &[f64], config: &SolverConfig) -> f64 {
    let low = npv(config.bisection_low, cash_flows).abs();
    let high = npv(config.bisection_high, cash_flows).abs();
    if high.is_nan() || low <= high {
        config.bisection_low
    } else {
        config.bisection_high
    }
}

fn in_bracket(rate: f64, config: &SolverConfig) -> bool {
    rate >= config.bisection_low && rate <= config.bisection_high
}

/// Full IRR solve.
///
/// Empty input gives a NaN estimate. All-zero flows give 0. Otherwise the
/// estimate is always finite: the best point reached when no root is found,
/// which for the hybrid and bisection methods lies inside the bisection bracket.
pub fn solve_irr_with(cash_flows: &[f64], initial_guess: f64, config: &SolverConfig) -> Solution {
    if cash_flows.is_empty() {
        return Solution { estimate: f64::NAN, iterations: 0, converged: false };
    }
    if cash_flows.iter().all(|&cf| cf.abs() < ZERO_FLOW) {
        return Solution { estimate: 0.0, iterations: 0, converged: true };
    }

    let newton = || {
        newton_raphson(|r| npv_with_slope(cash_flows, r), initial_guess, config)
    };

    let solution = match config.irr_method {
        IrrMethod::Newton => newton(),
        IrrMethod::Bisection => bisect(cash_flows, config).unwrap_or(Solution {
            estimate: closest_bound(cash_flows, config),
            iterations: 0,
            converged: false,
        }),
        IrrMethod::Hybrid => {
            let first = newton();
            if first.converged {
                first
            } else {
                debug!("IRR Newton stalled at {} after {} iterations, trying bisection", first.estimate, first.iterations);
                match bisect(cash_flows, config) {
                    Some(found) => Solution {
                        iterations: first.iterations + found.iterations,
                        ..found
                    },
                    // Newton's estimate only stands if it stayed inside the bracket;
                    // a point pinned at the Newton bounds is not a rate
                    None if in_bracket(first.estimate, config) => first,
                    None => Solution {
                        estimate: closest_bound(cash_flows, config),
                        ..first
                    },
                }
            }
        }
    };

    if !solution.converged {
        warn!(
            "IRR did not converge over {} flows ({} iterations); returning best estimate {}",
            cash_flows.len(),
            solution.iterations,
            solution.estimate
        );
    }

    solution
}

/// Periodic IRR of `cash_flows` using the default solver settings.
///
/// Never panics and never loops unbounded. Returns the best estimate when no
/// root is found, so a result should be sanity-checked against the flows.
pub fn solve_irr(cash_flows: &[f64], initial_guess: f64) -> f64 {
    solve_irr_with(cash_flows, initial_guess, &SolverConfig::default()).estimate
}
